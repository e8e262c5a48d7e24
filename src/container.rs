//! The bar coordinator: row bookkeeping, scroll compensation, and the print
//! wrappers that keep both honest.
//!
//! Bars are drawn by jumping the cursor to an absolute row. If ordinary output
//! ever ran off the bottom of the screen, the terminal would scroll on its own
//! and every recorded row would silently point one line too low. So the
//! container never lets that happen: when a write would pass the bottom row,
//! it shifts its own rows up first, redraws everything it remembers at the
//! new positions, and only then performs the write into the freed space.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::bar::{Bar, Updater};
use crate::error::{Error, Result};
use crate::style::Style;
use crate::terminal::{AnsiTerminal, Terminal};

/// Screen size assumed when the terminal can't tell us.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// State shared between a [`Container`], its clones, and every [`Updater`].
pub(crate) struct Shared {
    pub(crate) state: Mutex<State>,
    /// Signalled whenever a bar is added.
    pub(crate) ready: Condvar,
}

pub(crate) struct State {
    pub(crate) term: Box<dyn Terminal + Send>,
    pub(crate) style: Style,
    pub(crate) bars: Vec<Bar>,
    /// Receiving ends of each bar's channel, in bar order. Emptied by `listen`.
    pub(crate) receivers: Vec<Receiver<i64>>,
    pub(crate) listening: bool,
    pub(crate) screen_width: u16,
    pub(crate) screen_height: i32,
    /// The cursor row when the container was made.
    pub(crate) starting_line: i32,
    /// Rows consumed below `starting_line`.
    pub(crate) total_newlines: i32,
    /// Every newline ever written. Never decremented.
    pub(crate) historic_newlines: usize,
    /// The text last printed on each row, for replay after a scroll.
    pub(crate) history: BTreeMap<i32, String>,
}

/// A 1-based row on screen, if `line` is one.
fn on_screen(line: i32) -> Option<u16> {
    u16::try_from(line).ok().filter(|row| *row >= 1)
}

impl State {
    /// The row the next piece of output starts on.
    pub(crate) fn current_line(&self) -> i32 {
        self.starting_line + self.total_newlines
    }

    /// Account for `n` newlines about to be written. Returns whether the
    /// screen had to be scrolled to make room for them.
    pub(crate) fn advance(&mut self, n: i32) -> bool {
        self.total_newlines += n;
        self.historic_newlines += n as usize;

        if self.current_line() <= self.screen_height {
            return false;
        }

        debug!(n, "scrolling bars and history up");
        self.total_newlines -= n;
        for bar in &mut self.bars {
            bar.line -= n;
        }
        self.replay(n);
        true
    }

    /// Redraw every remembered row `n` rows higher, then put the cursor back
    /// on the row it was on, also `n` rows higher.
    pub(crate) fn replay(&mut self, n: i32) {
        let fallback = on_screen(self.current_line()).unwrap_or(1);
        let (col, row) = self.term.cursor_position().unwrap_or_else(|e| {
            warn!(error = %e, "cursor position unavailable; assuming column 1");
            (1, fallback)
        });

        let history = std::mem::take(&mut self.history);
        for (line, text) in history {
            let target = line - n;
            if let Err(e) = self.replay_line(line, target, &text) {
                warn!(error = %e, line, "failed to replay row");
            }
            if target >= 1 {
                self.history.insert(target, text);
            }
        }

        for index in 0..self.bars.len() {
            let progress = self.bars[index].progress;
            self.draw(index, progress);
        }

        let row = on_screen(i32::from(row) - n).unwrap_or(1);
        if let Err(e) = self.term.move_to(col, row) {
            warn!(error = %e, "failed to restore cursor after replay");
        }
    }

    fn replay_line(&mut self, from: i32, to: i32, text: &str) -> io::Result<()> {
        if let Some(row) = on_screen(from) {
            self.term.move_to(1, row)?;
            self.term.erase_line()?;
        }
        if let Some(row) = on_screen(to) {
            self.term.move_to(1, row)?;
            self.term.erase_line()?;
            self.term.write_str(text)?;
        }
        Ok(())
    }

    /// Remember `text` as written starting on row `line`. The first segment
    /// continues whatever is already on that row.
    pub(crate) fn record(&mut self, line: i32, text: &str) {
        for (offset, segment) in text.split('\n').enumerate() {
            let row = line + offset as i32;
            if row < 1 {
                continue;
            }
            if offset == 0 {
                self.history.entry(row).or_default().push_str(segment);
            } else {
                self.history.insert(row, segment.to_string());
            }
        }
    }

    /// Write plain text below the bars, keeping rows and history in step.
    pub(crate) fn write(&mut self, text: &str) -> io::Result<()> {
        let n = text.matches('\n').count() as i32;
        let start = self.current_line();
        if !self.advance(n) {
            self.record(start, text);
            return self.emit(text);
        }
        if start - n >= 1 {
            self.record(start - n, text);
            return self.emit(text);
        }

        // Taller than the rows above the cursor: everything remembered has
        // scrolled off, so the text starts over at the top-left.
        self.term.move_to(1, 1)?;
        let end = 1 + n;
        let overflow = (end - self.screen_height).max(0);
        self.total_newlines = end - overflow - self.starting_line;
        self.record(1, text);
        if overflow > 0 {
            // The terminal scrolls on its own for whatever doesn't fit.
            debug!(overflow, "write is taller than the screen");
            for bar in &mut self.bars {
                bar.line -= overflow;
            }
            self.history = std::mem::take(&mut self.history)
                .into_iter()
                .filter(|(row, _)| row - overflow >= 1)
                .map(|(row, text)| (row - overflow, text))
                .collect();
        }
        self.emit(text)
    }

    fn emit(&mut self, text: &str) -> io::Result<()> {
        self.term.write_str(text)?;
        self.term.flush()
    }

    /// Render a bar, logging rather than failing if the terminal won't cooperate.
    pub(crate) fn draw(&mut self, index: usize, progress: i64) {
        if let Some(bar) = self.bars.get_mut(index) {
            if let Err(e) = bar.render(&mut *self.term, progress) {
                warn!(error = %e, bar = index, "failed to draw bar");
            }
        }
    }
}

/// Owns a set of bars and the terminal rows they live on.
///
/// Cloning is cheap and every clone refers to the same bars, so a `Container`
/// can be handed to the listener thread and to anything that prints.
///
/// All output that should appear alongside the bars must go through
/// [`Container::print`], [`Container::printf`] or [`Container::println`];
/// anything written to stdout behind the container's back will throw its row
/// accounting off.
#[derive(Clone)]
pub struct Container {
    pub(crate) shared: Arc<Shared>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Container")
            .field("bars", &state.bars.len())
            .field("starting_line", &state.starting_line)
            .field("total_newlines", &state.total_newlines)
            .finish()
    }
}

impl Container {
    /// A container drawing to stdout with the default [`Style`].
    ///
    /// The screen size and cursor row are read once, here. If either can't be
    /// read, an 80x24 screen with the cursor on the first row is assumed.
    pub fn new() -> Container {
        Container::builder().build()
    }

    /// Start configuring a container with its own terminal or style.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    /// Add a bar on the next free row and get the handle that drives it.
    ///
    /// The bar is drawn empty straight away and the cursor moves to the row
    /// below it. A `total` of `0` is treated as `1`.
    ///
    /// # Errors
    ///
    /// [`Error::Listening`] once [`Container::listen`] has started, since the
    /// listener only watches the bars that existed when it began.
    pub fn bar<S: Into<String>>(&self, total: u64, label: S) -> Result<Updater> {
        let mut state = self.shared.state.lock();
        if state.listening {
            return Err(Error::Listening);
        }

        let line = state.current_line();
        let style = state.style.clone();
        let mut bar = Bar::new(total, label.into(), state.screen_width, line, style);
        debug!(label = %bar.label, line, total = bar.total, "new bar");

        state.history.insert(line, String::new());
        if let Err(e) = bar.render(&mut *state.term, 0) {
            warn!(error = %e, "failed to draw new bar");
        }

        let (tx, rx) = bounded(0);
        let index = state.bars.len();
        state.bars.push(bar);
        state.receivers.push(rx);

        if let Err(e) = state.write("\n") {
            warn!(error = %e, "failed to move below new bar");
        }
        drop(state);
        self.shared.ready.notify_all();

        Ok(Updater::new(index, tx, Arc::clone(&self.shared)))
    }

    /// Write text as [`print!`] would.
    pub fn print<S: AsRef<str>>(&self, text: S) -> io::Result<()> {
        self.shared.state.lock().write(text.as_ref())
    }

    /// Write formatted text.
    ///
    /// ```no_run
    /// use multibar::Container;
    ///
    /// let container = Container::new();
    /// container.printf(format_args!("{} of {} done\n", 3, 10)).unwrap();
    /// ```
    pub fn printf(&self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.shared.state.lock().write(&fmt::format(args))
    }

    /// Write text followed by a newline, as [`println!`] would.
    pub fn println<S: AsRef<str>>(&self, text: S) -> io::Result<()> {
        let mut line = String::with_capacity(text.as_ref().len() + 1);
        line.push_str(text.as_ref());
        line.push('\n');
        self.shared.state.lock().write(&line)
    }

    /// How many newlines have been written through this container, including
    /// those used to make room for bars.
    pub fn newlines_emitted(&self) -> usize {
        self.shared.state.lock().historic_newlines
    }

    /// How many bars have been added.
    pub fn bar_count(&self) -> usize {
        self.shared.state.lock().bars.len()
    }
}

/// Configures a [`Container`] before any bars exist.
#[derive(Default)]
pub struct ContainerBuilder {
    terminal: Option<Box<dyn Terminal + Send>>,
    style: Style,
}

impl ContainerBuilder {
    /// Draw through something other than stdout.
    #[must_use]
    pub fn terminal<T: Terminal + Send + 'static>(mut self, terminal: T) -> Self {
        self.terminal = Some(Box::new(terminal));
        self
    }

    /// The look of every bar this container makes.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Query the terminal once and make the container.
    pub fn build(self) -> Container {
        let mut term = self
            .terminal
            .unwrap_or_else(|| Box::new(AnsiTerminal::new()));

        let (width, height) = term.screen_size().unwrap_or_else(|e| {
            warn!(error = %e, "screen size unavailable; assuming 80x24");
            FALLBACK_SIZE
        });
        let height = i32::from(height.max(1));
        let (_, row) = term.cursor_position().unwrap_or_else(|e| {
            warn!(error = %e, "cursor position unavailable; starting at row 1");
            (1, 1)
        });
        let starting_line = i32::from(row).clamp(1, height);
        debug!(width, height, starting_line, "container ready");

        let state = State {
            term,
            style: self.style,
            bars: Vec::new(),
            receivers: Vec::new(),
            listening: false,
            screen_width: width,
            screen_height: height,
            starting_line,
            total_newlines: 0,
            historic_newlines: 0,
            history: BTreeMap::new(),
        };

        Container {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                ready: Condvar::new(),
            }),
        }
    }
}
