#![warn(missing_docs)]
//! Minimal Neovim msgpack-RPC client.
//!
//! Only what split navigation needs: evaluate a numeric expression, run an Ex
//! command, and the [`NvimHook`] built on those two calls.

mod client;
pub mod codec;
mod error;
mod hook;
mod path;

pub use client::NvimClient;
pub use error::{Error, Result};
pub use hook::NvimHook;
pub use path::SocketEnv;
