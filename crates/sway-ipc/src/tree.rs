//! The subset of the layout tree needed to find the focused window.

use serde::Deserialize;

use crate::Result;

/// One container in the layout tree. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct Node {
    /// Whether this container holds input focus.
    #[serde(default)]
    pub focused: bool,
    /// Owning process, present on application windows.
    #[serde(default)]
    pub pid: Option<u32>,
    /// Tiled children.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Floating children.
    #[serde(default)]
    pub floating_nodes: Vec<Node>,
}

impl Node {
    /// Depth-first search for a focused node that carries a pid.
    pub fn focused_pid(&self) -> Option<u32> {
        if self.focused
            && let Some(pid) = self.pid
        {
            return Some(pid);
        }
        self.nodes
            .iter()
            .chain(&self.floating_nodes)
            .find_map(Self::focused_pid)
    }
}

/// Parse a tree document and return the focused window's pid.
pub fn focused_pid(json: &[u8]) -> Result<Option<u32>> {
    let root: Node = serde_json::from_slice(json)?;
    Ok(root.focused_pid())
}
