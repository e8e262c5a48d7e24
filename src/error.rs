//! Errors surfaced by a [`Container`](crate::Container).
//!
//! Almost nothing here is fatal. Bad bar parameters are clamped and failed
//! terminal queries fall back to defaults, so the only errors a caller sees
//! are misuse of the listener and I/O failures from the print wrappers.

use thiserror::Error;

/// Errors from container operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A bar was requested after [`Container::listen`](crate::Container::listen)
    /// had already collected the set of bars to watch.
    #[error("cannot add a bar once the container is listening")]
    Listening,

    /// [`Container::listen`](crate::Container::listen) was called a second time.
    #[error("the container is already listening")]
    AlreadyListening,

    /// Writing to the terminal failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A `Result` specialized to this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
