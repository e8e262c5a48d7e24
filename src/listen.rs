//! The listener: one loop fanning in every bar's channel.

use crossbeam_channel::Select;
use tracing::debug;

use crate::container::Container;
use crate::error::{Error, Result};

impl Container {
    /// Redraw bars as their updates arrive, until every bar is finished.
    ///
    /// Blocks until at least one bar exists, then watches the channels of all
    /// bars made so far. Whichever bar has a value ready is redrawn with it;
    /// a bar whose [`Updater`](crate::Updater) has been dropped stops being
    /// watched. Once none are left, one newline is printed so that later
    /// output starts below the last bar, and this returns.
    ///
    /// Run it on its own thread, after all bars have been added:
    ///
    /// ```no_run
    /// use multibar::Container;
    ///
    /// let container = Container::new();
    /// let bars: Vec<_> = (0..3)
    ///     .map(|n| container.bar(50, format!("Job #{n}")).unwrap())
    ///     .collect();
    ///
    /// let listener = container.clone();
    /// let handle = std::thread::spawn(move || listener.listen());
    ///
    /// std::thread::scope(|s| {
    ///     for bar in bars {
    ///         s.spawn(move || (0..=50).for_each(|n| bar.update(n)));
    ///     }
    /// });
    ///
    /// handle.join().unwrap().unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyListening`] if another call got here first, and
    /// [`Error::Io`] if the final newline couldn't be written.
    pub fn listen(&self) -> Result<()> {
        let receivers = {
            let mut state = self.shared.state.lock();
            while state.bars.is_empty() {
                self.shared.ready.wait(&mut state);
            }
            if state.listening {
                return Err(Error::AlreadyListening);
            }
            state.listening = true;
            std::mem::take(&mut state.receivers)
        };
        debug!(bars = receivers.len(), "listening");

        // Select indices line up with bar indices.
        let mut select = Select::new();
        for rx in &receivers {
            select.recv(rx);
        }

        let mut remaining = receivers.len();
        while remaining > 0 {
            let oper = select.select();
            let index = oper.index();
            match oper.recv(&receivers[index]) {
                Ok(progress) => self.shared.state.lock().draw(index, progress),
                Err(_) => {
                    debug!(bar = index, "bar finished");
                    select.remove(index);
                    remaining -= 1;
                }
            }
        }

        debug!("all bars finished");
        self.println("")?;
        Ok(())
    }
}
