//! The terminal capabilities a [`Container`](crate::Container) draws through.
//!
//! Columns and rows are 1-based throughout, matching ANSI cursor addressing.

use std::io::{self, Stdout, Write};

use crossterm::cursor::{MoveTo, RestorePosition, SavePosition};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use terminal_size::{terminal_size, Height, Width};

/// A drawable terminal.
///
/// The container never assumes anything about cursor state it hasn't asked
/// for through this trait. Implement it to redirect bars somewhere other than
/// standard output.
pub trait Terminal {
    /// The `(width, height)` of the screen.
    fn screen_size(&mut self) -> io::Result<(u16, u16)>;

    /// The current `(column, row)` of the cursor.
    fn cursor_position(&mut self) -> io::Result<(u16, u16)>;

    /// Move the cursor to an absolute position.
    fn move_to(&mut self, col: u16, row: u16) -> io::Result<()>;

    /// Erase the whole row the cursor is on.
    fn erase_line(&mut self) -> io::Result<()>;

    /// Remember the cursor position for a later [`Terminal::restore_cursor`].
    fn save_cursor(&mut self) -> io::Result<()>;

    /// Return the cursor to where [`Terminal::save_cursor`] left it.
    fn restore_cursor(&mut self) -> io::Result<()>;

    /// Write text at the cursor.
    fn write_str(&mut self, s: &str) -> io::Result<()>;

    /// Push anything buffered out to the screen.
    fn flush(&mut self) -> io::Result<()>;
}

/// ANSI escape driven [`Terminal`] on standard output.
pub struct AnsiTerminal {
    out: Stdout,
}

impl AnsiTerminal {
    /// A driver over this process's stdout.
    pub fn new() -> AnsiTerminal {
        AnsiTerminal {
            out: io::stdout(),
        }
    }
}

impl Default for AnsiTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for AnsiTerminal {
    fn screen_size(&mut self) -> io::Result<(u16, u16)> {
        terminal_size()
            .map(|(Width(w), Height(h))| (w, h))
            .ok_or_else(|| io::Error::other("not a terminal"))
    }

    fn cursor_position(&mut self) -> io::Result<(u16, u16)> {
        // Anything still buffered would land after the query is answered.
        self.out.flush()?;
        let (col, row) = crossterm::cursor::position()?;
        Ok((col + 1, row + 1))
    }

    fn move_to(&mut self, col: u16, row: u16) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(col.saturating_sub(1), row.saturating_sub(1))
        )
    }

    fn erase_line(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::CurrentLine))
    }

    fn save_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, SavePosition)
    }

    fn restore_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, RestorePosition)
    }

    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Very important, or the output won't appear fluid.
        self.out.flush()
    }
}

/// An in-memory screen for tests.
#[cfg(test)]
pub(crate) mod fake {
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::Terminal;

    pub(crate) struct Screen {
        pub(crate) width: u16,
        pub(crate) height: u16,
        rows: Vec<Vec<char>>,
        pub(crate) cursor: (u16, u16),
        saved: (u16, u16),
        /// Times the screen scrolled because text ran off the bottom.
        pub(crate) native_scrolls: usize,
        /// Every string passed to `write_str`, in order.
        pub(crate) writes: Vec<String>,
        pub(crate) broken: bool,
    }

    impl Screen {
        /// The visible text of a row, without trailing blanks.
        pub(crate) fn row(&self, row: u16) -> String {
            let s: String = self.rows[usize::from(row) - 1].iter().collect();
            s.trim_end().to_string()
        }

        fn put(&mut self, c: char) {
            match c {
                '\n' => {
                    self.cursor.0 = 1;
                    if self.cursor.1 == self.height {
                        self.rows.remove(0);
                        self.rows.push(Vec::new());
                        self.native_scrolls += 1;
                    } else {
                        self.cursor.1 += 1;
                    }
                }
                '\r' => self.cursor.0 = 1,
                c => {
                    let (col, row) = self.cursor;
                    let line = &mut self.rows[usize::from(row) - 1];
                    let at = usize::from(col) - 1;
                    if line.len() <= at {
                        line.resize(at + 1, ' ');
                    }
                    line[at] = c;
                    self.cursor.0 += 1;
                }
            }
        }
    }

    /// A [`Terminal`] whose screen stays inspectable after the terminal
    /// itself has been handed to a container.
    #[derive(Clone)]
    pub(crate) struct FakeTerminal {
        pub(crate) screen: Arc<Mutex<Screen>>,
    }

    impl FakeTerminal {
        /// A `width` x `height` screen with the cursor at the start of `row`.
        pub(crate) fn new(width: u16, height: u16, row: u16) -> FakeTerminal {
            let screen = Screen {
                width,
                height,
                rows: vec![Vec::new(); usize::from(height)],
                cursor: (1, row),
                saved: (1, row),
                native_scrolls: 0,
                writes: Vec::new(),
                broken: false,
            };
            FakeTerminal {
                screen: Arc::new(Mutex::new(screen)),
            }
        }

        /// A terminal whose size and cursor queries always fail.
        pub(crate) fn broken() -> FakeTerminal {
            let term = FakeTerminal::new(80, 24, 1);
            term.screen.lock().broken = true;
            term
        }
    }

    fn unavailable() -> io::Error {
        io::Error::other("query unavailable")
    }

    impl Terminal for FakeTerminal {
        fn screen_size(&mut self) -> io::Result<(u16, u16)> {
            let s = self.screen.lock();
            if s.broken {
                return Err(unavailable());
            }
            Ok((s.width, s.height))
        }

        fn cursor_position(&mut self) -> io::Result<(u16, u16)> {
            let s = self.screen.lock();
            if s.broken {
                return Err(unavailable());
            }
            Ok(s.cursor)
        }

        fn move_to(&mut self, col: u16, row: u16) -> io::Result<()> {
            let mut s = self.screen.lock();
            let height = s.height;
            s.cursor = (col.max(1), row.clamp(1, height));
            Ok(())
        }

        fn erase_line(&mut self) -> io::Result<()> {
            let mut s = self.screen.lock();
            let row = usize::from(s.cursor.1) - 1;
            s.rows[row].clear();
            Ok(())
        }

        fn save_cursor(&mut self) -> io::Result<()> {
            let mut s = self.screen.lock();
            s.saved = s.cursor;
            Ok(())
        }

        fn restore_cursor(&mut self) -> io::Result<()> {
            let mut s = self.screen.lock();
            s.cursor = s.saved;
            Ok(())
        }

        fn write_str(&mut self, text: &str) -> io::Result<()> {
            let mut s = self.screen.lock();
            s.writes.push(text.to_string());
            text.chars().for_each(|c| s.put(c));
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    mod tests {
        use super::*;

        #[test]
        fn newline_at_bottom_scrolls() {
            let mut term = FakeTerminal::new(10, 2, 2);
            term.write_str("a\nb").unwrap();
            let s = term.screen.lock();
            assert_eq!(s.native_scrolls, 1);
            assert_eq!(s.row(1), "a");
            assert_eq!(s.row(2), "b");
        }
    }
}
