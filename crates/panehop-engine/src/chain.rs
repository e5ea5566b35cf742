//! The focus orchestrator.
//!
//! A request starts at the innermost layer of the focused window and bubbles
//! outwards until some layer can move. When none can, the window manager moves
//! focus, and the innermost layer of the newly focused window is pushed to the
//! edge facing the window we came from.

use std::{fmt::Display, time::Duration};

use tracing::{debug, warn};

use crate::{DetectedList, Direction, Scanner};

/// Window-level focus, backed by the window manager.
pub trait WindowFocus {
    /// Error raised by [`WindowFocus::move_focus`].
    type Error: Display;

    /// Pid owning the focused window, if the window manager reports one.
    fn focused_pid(&mut self) -> Option<u32>;

    /// Move window focus in `dir`. The window manager decides what that means
    /// at the outermost edge.
    fn move_focus(&mut self, dir: Direction) -> Result<(), Self::Error>;
}

/// Something that can list the layers of a window's process tree.
pub trait LayerSource<'h> {
    /// Layers under `root`, shallowest first.
    fn detect_all(&self, root: u32) -> DetectedList<'h>;
}

impl<'h> LayerSource<'h> for Scanner<'h> {
    fn detect_all(&self, root: u32) -> DetectedList<'h> {
        Scanner::detect_all(self, root)
    }
}

/// How a navigation request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A layer inside the focused window moved focus.
    Layer {
        /// Name of the hook that moved.
        hook: &'static str,
        /// Instance pid.
        pid: u32,
    },
    /// The window manager moved focus.
    Window {
        /// Hook aligned to the arrival edge in the new window, if any.
        landed: Option<&'static str>,
    },
    /// The window manager refused the move.
    Stuck,
}

/// Orchestrator states.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Ask the window manager which process owns focus.
    ResolveFocus,
    /// Offer the move to each layer, innermost first.
    TryLayers(u32),
    /// Fall back to a window-level move.
    WindowMove,
    /// Align the innermost layer of the new window with the arrival edge.
    LandOnEdge(u32),
    /// Finished.
    Done(Outcome),
}

/// Move focus one step in `dir` across every layer.
///
/// Failures inside a layer count as "at edge" and the request moves outwards;
/// only the window manager has the final word.
pub fn navigate<'h, W, L>(wm: &mut W, layers: &L, dir: Direction, timeout: Duration) -> Outcome
where
    W: WindowFocus,
    L: LayerSource<'h>,
{
    let mut state = State::ResolveFocus;
    loop {
        state = match state {
            State::ResolveFocus => match wm.focused_pid() {
                Some(pid) => State::TryLayers(pid),
                None => {
                    debug!("no focused pid, moving window focus");
                    State::WindowMove
                }
            },
            State::TryLayers(pid) => try_layers(&layers.detect_all(pid), dir, timeout)
                .map_or(State::WindowMove, State::Done),
            State::WindowMove => match wm.move_focus(dir) {
                Ok(()) => match wm.focused_pid() {
                    Some(pid) => State::LandOnEdge(pid),
                    None => State::Done(Outcome::Window { landed: None }),
                },
                Err(e) => {
                    warn!(%dir, error = %e, "window focus move failed");
                    State::Done(Outcome::Stuck)
                }
            },
            State::LandOnEdge(pid) => {
                let landed = land_on_edge(&layers.detect_all(pid), dir, timeout);
                State::Done(Outcome::Window { landed })
            }
            State::Done(outcome) => return outcome,
        };
    }
}

/// Offer the move to each layer, deepest first. Returns the outcome of the
/// first layer that moves.
fn try_layers(list: &DetectedList<'_>, dir: Direction, timeout: Duration) -> Option<Outcome> {
    for layer in list.iter().rev() {
        let name = layer.hook.name();
        let res = layer.hook.can_move(layer.pid, dir, timeout);
        debug!(hook = name, pid = layer.pid, depth = layer.depth, ?res, "can_move");
        if res.can_move() {
            let moved = layer.hook.move_focus(layer.pid, dir, timeout);
            debug!(hook = name, pid = layer.pid, ?moved, "move_focus");
            return Some(Outcome::Layer {
                hook: name,
                pid: layer.pid,
            });
        }
    }
    None
}

/// Push the innermost layer towards the side we arrived from.
fn land_on_edge(list: &DetectedList<'_>, dir: Direction, timeout: Duration) -> Option<&'static str> {
    let layer = list.innermost()?;
    let res = layer
        .hook
        .move_to_edge(layer.pid, dir.opposite(), timeout);
    debug!(hook = layer.hook.name(), pid = layer.pid, edge = %dir.opposite(), ?res, "move_to_edge");
    Some(layer.hook.name())
}
