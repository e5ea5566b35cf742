use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    slice::Iter,
    time::Duration,
};

use proc_tree::ProcInfo;
use tracing::debug;

use crate::{Direction, Scanner};

/// Most layers a single detection pass will keep.
pub const MAX_DETECTED: usize = 8;

/// Answer from a layer asked to move focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The layer has somewhere to go in the requested direction.
    CanMove,
    /// The layer is at its boundary.
    AtEdge,
    /// The layer could not be asked. Bubbles up exactly like [`MoveResult::AtEdge`].
    Error,
}

impl MoveResult {
    /// True only for [`MoveResult::CanMove`].
    pub fn can_move(self) -> bool {
        self == Self::CanMove
    }
}

/// A kind of focus-aware application.
///
/// Implementations are stateless descriptors: every call receives the pid
/// identifying the running instance, and failures are folded into
/// [`MoveResult::Error`] so the orchestrator can move on to the next layer.
pub trait Hook: Sync {
    /// Stable name used to enable the hook from the command line.
    fn name(&self) -> &'static str;

    /// Classify one process. Returns the pid that identifies the application
    /// instance, or `None` when the process is not ours.
    fn detect(&self, proc: &ProcInfo) -> Option<u32>;

    /// Can focus move one step in `dir` inside the instance?
    fn can_move(&self, pid: u32, dir: Direction, timeout: Duration) -> MoveResult;

    /// Move focus one step in `dir`.
    fn move_focus(&self, pid: u32, dir: Direction, timeout: Duration) -> MoveResult;

    /// Move focus as far as possible in `dir`.
    fn move_to_edge(&self, pid: u32, dir: Direction, timeout: Duration) -> MoveResult;

    /// Scan an extra process tree that is not a descendant of the window,
    /// appending matches to `list` at `depth`. Most hooks have none.
    fn discover_inner<'h>(
        &self,
        _pid: u32,
        _scanner: &Scanner<'h>,
        _list: &mut DetectedList<'h>,
        _depth: u32,
    ) {
    }
}

/// A hook matched against a live process.
#[derive(Clone, Copy)]
pub struct DetectedHook<'h> {
    /// The matching hook.
    pub hook: &'h dyn Hook,
    /// Pid returned by [`Hook::detect`].
    pub pid: u32,
    /// Depth below the scan root.
    pub depth: u32,
}

impl Debug for DetectedHook<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DetectedHook")
            .field("hook", &self.hook.name())
            .field("pid", &self.pid)
            .field("depth", &self.depth)
            .finish()
    }
}

/// Bounded, depth-ordered list of detected layers, shallowest first.
#[derive(Debug, Default, Clone)]
pub struct DetectedList<'h> {
    /// Entries sorted by ascending depth, insertion order within a depth.
    items: Vec<DetectedHook<'h>>,
    /// Set once a push has been dropped for lack of room.
    truncated: bool,
}

impl<'h> DetectedList<'h> {
    /// An empty list.
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(MAX_DETECTED),
            truncated: false,
        }
    }

    /// Insert an entry after every entry of equal or lesser depth.
    ///
    /// Returns `false` and leaves the list untouched when it is already full.
    pub fn push(&mut self, entry: DetectedHook<'h>) -> bool {
        if self.is_full() {
            self.truncated = true;
            debug!(hook = entry.hook.name(), pid = entry.pid, "detected list full, dropping");
            return false;
        }
        let at = self.items.partition_point(|e| e.depth <= entry.depth);
        self.items.insert(at, entry);
        true
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing was detected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when no more entries fit.
    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_DETECTED
    }

    /// True when at least one entry was dropped.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// The deepest entry.
    pub fn innermost(&self) -> Option<&DetectedHook<'h>> {
        self.items.last()
    }

    /// Entries shallowest first.
    pub fn iter(&self) -> Iter<'_, DetectedHook<'h>> {
        self.items.iter()
    }

    /// Entries as a slice, shallowest first.
    pub fn as_slice(&self) -> &[DetectedHook<'h>] {
        &self.items
    }
}

impl<'a, 'h> IntoIterator for &'a DetectedList<'h> {
    type Item = &'a DetectedHook<'h>;
    type IntoIter = Iter<'a, DetectedHook<'h>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
