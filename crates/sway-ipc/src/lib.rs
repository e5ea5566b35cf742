#![warn(missing_docs)]
//! Blocking client for the i3/sway IPC socket.
//!
//! Two requests are enough for panehop: fetch the layout tree to learn which
//! process owns the focused window, and run a `focus <direction>` command.
//! [`SwayClient`] implements [`panehop_engine::WindowFocus`].

mod client;
mod error;
pub mod tree;
pub mod wire;

pub use client::{SwayClient, socket_from, socket_from_env};
pub use error::{Error, Result};
