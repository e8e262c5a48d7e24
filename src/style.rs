//! How bars look.

/// Glyphs and toggles shared by every bar of a [`Container`](crate::Container).
///
/// The default renders like:
///
/// ```text
/// Downloading  42% [=========>------------] 3s
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub(crate) left_end: char,
    pub(crate) right_end: char,
    pub(crate) fill: char,
    pub(crate) head: char,
    pub(crate) empty: char,
    pub(crate) show_percent: bool,
    pub(crate) show_elapsed: bool,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            left_end: '[',
            right_end: ']',
            fill: '=',
            head: '>',
            empty: '-',
            show_percent: true,
            show_elapsed: true,
        }
    }
}

impl Style {
    /// The characters that close off either end of the track.
    #[must_use]
    pub fn ends(mut self, left: char, right: char) -> Self {
        self.left_end = left;
        self.right_end = right;
        self
    }

    /// The character for completed cells.
    #[must_use]
    pub fn fill(mut self, fill: char) -> Self {
        self.fill = fill;
        self
    }

    /// The leading-edge marker, drawn in the first incomplete cell.
    #[must_use]
    pub fn head(mut self, head: char) -> Self {
        self.head = head;
        self
    }

    /// The character for cells past the head.
    #[must_use]
    pub fn empty(mut self, empty: char) -> Self {
        self.empty = empty;
        self
    }

    /// Show the integer percentage before the track.
    #[must_use]
    pub fn show_percent(mut self, show: bool) -> Self {
        self.show_percent = show;
        self
    }

    /// Show time elapsed since the bar was created, after the track.
    #[must_use]
    pub fn show_elapsed(mut self, show: bool) -> Self {
        self.show_elapsed = show;
        self
    }
}
