//! Panehop Engine
//!
//! Treats an editor's splits, a multiplexer's panes and the window manager's
//! windows as one chain of focus layers:
//! - [`Hook`]: capability set implemented per application kind
//! - [`Scanner`]: walks a window's process tree and detects layers
//! - [`navigate`]: bubbles a directional move from the innermost layer outwards
//!
//! Everything is synchronous; a single invocation makes a strictly ordered
//! series of blocking calls.
#![warn(missing_docs)]

mod chain;
mod direction;
mod hook;
mod walk;

pub use chain::{LayerSource, Outcome, WindowFocus, navigate};
pub use direction::{Direction, ParseDirectionError};
pub use hook::{DetectedHook, DetectedList, Hook, MAX_DETECTED, MoveResult};
pub use proc_tree::ProcInfo;
pub use walk::{MAX_DEPTH, Scanner};
