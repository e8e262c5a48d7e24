//! Individual bars and the handles producers use to drive them.

use std::io;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use regex::Regex;
use tracing::{debug, trace};

use crate::container::Shared;
use crate::style::Style;
use crate::terminal::Terminal;

/// Columns taken by everything on a bar's row that isn't the label or the track.
pub(crate) const DECORATION_WIDTH: usize = 20;

/// Matches the integer part and unit of a `Duration`'s debug form, e.g. `12.5ms`.
static ELAPSED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:\.\d+)?([a-zµ]+)$").ok());

/// The drawable state of one bar. Lives inside the container's lock.
#[derive(Debug)]
pub(crate) struct Bar {
    pub(crate) width: usize,
    pub(crate) total: u64,
    pub(crate) style: Style,
    pub(crate) start: Instant,
    /// The absolute row this bar owns. Rows above 1 have scrolled off-screen.
    pub(crate) line: i32,
    pub(crate) label: String,
    /// The last value drawn, for redraws after a scroll.
    pub(crate) progress: i64,
}

impl Bar {
    pub(crate) fn new(
        total: u64,
        label: String,
        screen_width: u16,
        line: i32,
        style: Style,
    ) -> Bar {
        let width = usize::from(screen_width)
            .saturating_sub(label.chars().count())
            .saturating_sub(DECORATION_WIDTH)
            .max(1);

        Bar {
            width,
            total: total.max(1),
            style,
            start: Instant::now(),
            line,
            label,
            progress: 0,
        }
    }

    /// The full text of this bar's row at the given progress.
    pub(crate) fn line_text(&mut self, progress: i64) -> String {
        self.width = self.width.max(1);
        self.total = self.total.max(1);

        let ratio = progress as f64 / self.total as f64;
        let mut track = String::with_capacity(self.width);
        let mut head_drawn = false;
        for i in 0..self.width {
            if ratio > i as f64 / self.width as f64 {
                track.push(self.style.fill);
            } else if !head_drawn {
                track.push(self.style.head);
                head_drawn = true;
            } else {
                track.push(self.style.empty);
            }
        }

        let percent = if self.style.show_percent {
            let pct = (100.0 * progress as f64 / self.total as f64) as i64;
            let padding = if pct < 10 {
                "  "
            } else if pct < 99 {
                " "
            } else {
                ""
            };
            format!("{padding}{pct}% ")
        } else {
            String::new()
        };

        let elapsed = if self.style.show_elapsed {
            format!(" {}", pretty_time(self.start.elapsed()))
        } else {
            String::new()
        };

        format!(
            "{} {}{}{}{}{}",
            self.label, percent, self.style.left_end, track, self.style.right_end, elapsed
        )
    }

    /// Redraw this bar on its own row, leaving the cursor where it was found.
    pub(crate) fn render(&mut self, term: &mut dyn Terminal, progress: i64) -> io::Result<()> {
        self.progress = progress;

        let Ok(row) = u16::try_from(self.line) else {
            return Ok(());
        };
        if row == 0 {
            trace!(label = %self.label, line = self.line, "bar is off-screen");
            return Ok(());
        }

        let text = self.line_text(progress);
        trace!(label = %self.label, row, progress, "render");

        term.save_cursor()?;
        term.move_to(1, row)?;
        term.erase_line()?;
        term.write_str(&text)?;
        term.restore_cursor()?;
        term.flush()
    }
}

/// A duration cut down to its integer part and unit, like `3s` or `250ms`.
///
/// The `Debug` form of a `Duration` never uses minutes, so a long run reads
/// `150s` rather than `2m`.
pub(crate) fn pretty_time(elapsed: Duration) -> String {
    let text = format!("{elapsed:?}");
    ELAPSED
        .as_ref()
        .and_then(|re| re.captures(&text))
        .map(|caps| format!("{}{}", &caps[1], &caps[2]))
        .unwrap_or_else(|| "---".to_string())
}

/// The producer's end of a bar, returned by [`Container::bar`](crate::Container::bar).
///
/// Each call to [`Updater::update`] is handed to the container's listener,
/// which redraws the bar. Dropping the handle (or calling
/// [`Updater::finish`]) tells the listener this bar is done.
///
/// ```no_run
/// use multibar::Container;
///
/// let container = Container::new();
/// let bar = container.bar(100, "Downloading").unwrap();
///
/// let listener = container.clone();
/// let handle = std::thread::spawn(move || listener.listen());
///
/// for n in 0..=100 {
///     bar.update(n);
/// }
/// bar.finish();
/// handle.join().unwrap().unwrap();
/// ```
pub struct Updater {
    index: usize,
    tx: Sender<i64>,
    shared: Arc<Shared>,
}

impl Updater {
    pub(crate) fn new(index: usize, tx: Sender<i64>, shared: Arc<Shared>) -> Updater {
        Updater { index, tx, shared }
    }

    /// Send a new progress value to the bar.
    ///
    /// Blocks until the listener has taken the previous value, so a fast
    /// producer is held to the pace of the redraws. Values outside
    /// `0..=total` are drawn as an empty or full bar.
    pub fn update(&self, progress: i64) {
        if self.tx.send(progress).is_err() {
            debug!(bar = self.index, progress, "listener is gone; update dropped");
        }
    }

    /// Replace the text drawn before the bar. Shown on the next update.
    pub fn set_label<S: Into<String>>(&self, label: S) {
        let mut state = self.shared.state.lock();
        if let Some(bar) = state.bars.get_mut(self.index) {
            bar.label = label.into();
        }
    }

    /// Mark the bar as done. Equivalent to dropping the handle.
    pub fn finish(self) {}

    /// The bar's position in creation order.
    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::fake::FakeTerminal;

    fn plain(width: u16, total: u64) -> Bar {
        let style = Style::default().show_elapsed(false);
        // 20 columns of decoration plus a one-char label.
        Bar::new(total, "x".to_string(), width + 21, 1, style)
    }

    fn track(text: &str) -> &str {
        let start = text.find('[').unwrap();
        let end = text.rfind(']').unwrap();
        &text[start + 1..end]
    }

    #[test]
    fn width_from_screen() {
        let bar = Bar::new(10, "Downloading".to_string(), 80, 1, Style::default());
        assert_eq!(bar.width, 80 - 11 - DECORATION_WIDTH);

        let tiny = Bar::new(10, "Downloading".to_string(), 5, 1, Style::default());
        assert_eq!(tiny.width, 1);
    }

    #[test]
    fn zero_total_is_clamped() {
        let mut bar = plain(10, 0);
        assert_eq!(bar.total, 1);
        assert_eq!(track(&bar.line_text(1)), "==========");
    }

    #[test]
    fn partial_track() {
        let mut bar = plain(10, 100);
        let text = bar.line_text(42);
        assert_eq!(text, "x  42% [=====>----]");
    }

    #[test]
    fn full_track_has_no_head() {
        let mut bar = plain(8, 50);
        for progress in [50, 51, 1000] {
            assert_eq!(track(&bar.line_text(progress)), "========");
        }
    }

    #[test]
    fn empty_track_starts_with_head() {
        let mut bar = plain(8, 50);
        for progress in [0, -1, -500] {
            assert_eq!(track(&bar.line_text(progress)), ">-------");
        }
    }

    #[test]
    fn exactly_one_head() {
        let mut bar = plain(30, 77);
        for progress in 0..70 {
            let text = bar.line_text(progress);
            assert_eq!(track(&text).matches('>').count(), 1, "progress {progress}");
        }
    }

    #[test]
    fn percent_padding() {
        let mut bar = plain(10, 100);
        assert!(bar.line_text(5).starts_with("x   5% ["));
        assert!(bar.line_text(55).starts_with("x  55% ["));
        assert!(bar.line_text(99).starts_with("x 99% ["));
        assert!(bar.line_text(100).starts_with("x 100% ["));
        assert!(bar.line_text(-5).starts_with("x   -5% ["));

        bar.style.show_percent = false;
        assert!(bar.line_text(55).starts_with("x ["));
    }

    #[test]
    fn pretty_durations() {
        assert_eq!(pretty_time(Duration::from_secs(5)), "5s");
        assert_eq!(pretty_time(Duration::from_millis(1500)), "1s");
        assert_eq!(pretty_time(Duration::from_micros(12_500)), "12ms");
        assert_eq!(pretty_time(Duration::ZERO), "0ns");
    }

    #[test]
    fn elapsed_is_appended() {
        let mut bar = Bar::new(10, "x".to_string(), 40, 1, Style::default());
        let text = bar.line_text(5);
        let elapsed = text.rsplit("] ").next().unwrap();
        assert!(ELAPSED.as_ref().unwrap().is_match(elapsed) || elapsed == "---");
    }

    #[test]
    fn render_restores_cursor() {
        let term = FakeTerminal::new(40, 10, 7);
        let mut bar = Bar::new(10, "job".to_string(), 40, 3, Style::default().show_elapsed(false));

        bar.render(&mut term.clone(), 5).unwrap();

        let screen = term.screen.lock();
        assert_eq!(screen.cursor, (1, 7));
        assert!(screen.row(3).starts_with("job  50% ["));
        assert_eq!(bar.progress, 5);
    }

    #[test]
    fn render_is_idempotent() {
        let term = FakeTerminal::new(40, 10, 7);
        let mut bar = Bar::new(10, "job".to_string(), 40, 3, Style::default().show_elapsed(false));

        bar.render(&mut term.clone(), 4).unwrap();
        let first = term.screen.lock().row(3);
        let width = bar.width;
        bar.render(&mut term.clone(), 4).unwrap();

        assert_eq!(term.screen.lock().row(3), first);
        assert_eq!(bar.width, width);
        assert_eq!(bar.total, 10);
    }

    #[test]
    fn offscreen_bars_are_skipped() {
        let term = FakeTerminal::new(40, 10, 7);
        let mut bar = Bar::new(10, "job".to_string(), 40, -2, Style::default());

        bar.render(&mut term.clone(), 4).unwrap();

        assert!(term.screen.lock().writes.is_empty());
        assert_eq!(bar.progress, 4);
    }
}
