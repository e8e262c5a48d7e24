//! Concurrent progress bars on fixed terminal rows.
//!
//! # Features
//!
//! - Each bar owns one terminal row and is redrawn in place.
//! - Producers on any thread push values through their own channel.
//! - A single listener fans in every channel and does all the drawing.
//! - Ordinary output can be printed around the bars, even past the bottom of
//!   the screen, without the bars losing their rows.
//!
//! # Usage
//!
//! A [`Container`] hands out one [`Updater`] per bar. Give each `Updater` to
//! whatever is doing the work, then run [`Container::listen`] on a thread of
//! its own:
//!
//! ```no_run
//! use multibar::Container;
//!
//! let container = Container::new();
//!
//! let download = container.bar(200, "Downloading").unwrap();
//! let unpack = container.bar(80, "Unpacking").unwrap();
//!
//! let listener = container.clone();
//! let handle = std::thread::spawn(move || listener.listen());
//!
//! std::thread::scope(|s| {
//!     s.spawn(move || (0..=200).for_each(|n| download.update(n)));
//!     s.spawn(move || (0..=80).for_each(|n| unpack.update(n)));
//! });
//!
//! handle.join().unwrap().unwrap();
//! container.println("Complete!").unwrap();
//! ```
//!
//! `listen` returns once every `Updater` has been dropped. All bars must be
//! added before it starts; [`Container::bar`] fails afterwards.
//!
//! ## Printing
//!
//! Text written straight to stdout moves the cursor without the container's
//! knowledge. Write through [`Container::print`], [`Container::printf`] and
//! [`Container::println`] instead, so that every newline is counted and
//! remembered. When output reaches the bottom of the screen, the container
//! moves every bar and every remembered line up itself, instead of letting the
//! terminal scroll.
//!
//! ## Styling
//!
//! ```
//! use multibar::{Container, Style};
//!
//! let style = Style::default().fill('#').head('#').empty(' ').show_elapsed(false);
//! let builder = Container::builder().style(style);
//! ```
//!
//! # Caveats
//!
//! - Your terminal must support ANSI codes.
//! - No bars can be added once listening has begun.
//! - No dynamic resizing of bars if window size changes.

#![forbid(unsafe_code)]

mod bar;
mod container;
pub mod error;
mod listen;
mod style;
pub mod terminal;

pub use bar::Updater;
pub use container::{Container, ContainerBuilder};
pub use error::{Error, Result};
pub use style::Style;
pub use terminal::{AnsiTerminal, Terminal};
