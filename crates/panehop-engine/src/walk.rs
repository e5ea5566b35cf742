//! Process-tree walking and layer detection.

use std::collections::HashSet;

use proc_tree::{ProcInfo, Procfs};
use tracing::{debug, trace};

use crate::{DetectedHook, DetectedList, Hook};

/// Deepest level below a scan root that is still inspected.
pub const MAX_DEPTH: u32 = 5;

/// Classifies processes under a root against a set of enabled hooks.
pub struct Scanner<'h> {
    /// Where process information comes from.
    procfs: Procfs,
    /// Enabled hooks, in registration order.
    hooks: Vec<&'h dyn Hook>,
}

impl<'h> Scanner<'h> {
    /// Scanner over `procfs` using `hooks` in the given order.
    pub fn new(procfs: Procfs, hooks: Vec<&'h dyn Hook>) -> Self {
        Self { procfs, hooks }
    }

    /// The procfs this scanner reads.
    pub fn procfs(&self) -> &Procfs {
        &self.procfs
    }

    /// Detect every layer in the tree below `focused_pid`.
    ///
    /// After the walk, each layer found directly in the tree gets one chance
    /// to contribute a disjoint tree through [`Hook::discover_inner`]. Layers
    /// contributed that way are never asked in turn.
    pub fn detect_all(&self, focused_pid: u32) -> DetectedList<'h> {
        let mut list = DetectedList::new();
        self.walk(focused_pid, &mut list, 0);
        let direct: Vec<DetectedHook<'h>> = list.iter().copied().collect();
        for d in direct {
            d.hook.discover_inner(d.pid, self, &mut list, d.depth + 1);
        }
        debug!(
            root = focused_pid,
            layers = ?list.as_slice(),
            truncated = list.truncated(),
            "detection complete"
        );
        list
    }

    /// Record matches among the descendants of `root`, children at `depth`.
    pub fn walk(&self, root: u32, list: &mut DetectedList<'h>, depth: u32) {
        let mut seen = HashSet::from([root]);
        self.walk_children(root, list, depth, &mut seen);
    }

    /// Like [`Scanner::walk`], but `root` itself is classified first at `depth`.
    pub fn walk_from(&self, root: u32, list: &mut DetectedList<'h>, depth: u32) {
        if depth > MAX_DEPTH || list.is_full() {
            return;
        }
        if let Ok(info) = self.procfs.process(root) {
            self.classify(&info, list, depth);
        }
        let mut seen = HashSet::from([root]);
        self.walk_children(root, list, depth + 1, &mut seen);
    }

    /// Recursive step: classify each child, then descend into it regardless of
    /// whether it matched, so nested instances are found too.
    fn walk_children(
        &self,
        pid: u32,
        list: &mut DetectedList<'h>,
        depth: u32,
        seen: &mut HashSet<u32>,
    ) {
        if depth > MAX_DEPTH || list.is_full() {
            return;
        }
        let Ok(children) = self.procfs.children(pid) else {
            trace!(pid, "children unreadable");
            return;
        };
        for child in children {
            if list.is_full() {
                return;
            }
            if !seen.insert(child) {
                continue;
            }
            match self.procfs.process(child) {
                Ok(info) => self.classify(&info, list, depth),
                Err(e) => {
                    trace!(pid = child, error = %e, "skipping process");
                    continue;
                }
            }
            self.walk_children(child, list, depth + 1, seen);
        }
    }

    /// Run the hooks in order; the first match claims the process.
    fn classify(&self, info: &ProcInfo, list: &mut DetectedList<'h>, depth: u32) {
        for hook in &self.hooks {
            if let Some(pid) = hook.detect(info) {
                trace!(hook = hook.name(), pid, depth, argv0 = %info.argv0, "matched");
                list.push(DetectedHook {
                    hook: *hook,
                    pid,
                    depth,
                });
                return;
            }
        }
    }
}
