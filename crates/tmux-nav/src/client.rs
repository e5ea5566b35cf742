use panehop_engine::Direction;
use tracing::debug;

use crate::{Error, Result, Tmux};

/// Where a client's focus currently is. Resolved fresh for every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTarget {
    /// Active pane id, e.g. `%3`.
    pub pane: String,
    /// Unique id of the active window, e.g. `@3`.
    pub window: String,
}

/// Format for `list-clients`: pid, pane id, window id.
const CLIENT_FORMAT: &str = "#{client_pid} #{pane_id} #{window_id}";

/// Boundary flags for a pane, in [`edge_index`] order.
const EDGE_FORMAT: &str = "#{pane_at_left}#{pane_at_right}#{pane_at_top}#{pane_at_bottom}";

/// Position of `dir`'s flag within [`EDGE_FORMAT`].
fn edge_index(dir: Direction) -> usize {
    match dir {
        Direction::Left => 0,
        Direction::Right => 1,
        Direction::Up => 2,
        Direction::Down => 3,
    }
}

/// tmux's name for the boundary in `dir`.
fn edge_name(dir: Direction) -> &'static str {
    match dir {
        Direction::Left => "left",
        Direction::Right => "right",
        Direction::Up => "top",
        Direction::Down => "bottom",
    }
}

/// `select-pane` flag for `dir`.
fn select_flag(dir: Direction) -> &'static str {
    match dir {
        Direction::Left => "-L",
        Direction::Right => "-R",
        Direction::Up => "-U",
        Direction::Down => "-D",
    }
}

/// Find the line for `pid` in `list-clients` output.
pub fn parse_client(output: &str, pid: u32) -> Option<ClientTarget> {
    output.lines().find_map(|line| {
        let mut parts = line.split(' ');
        let client: u32 = parts.next()?.parse().ok()?;
        let pane = parts.next()?;
        let window = parts.next()?;
        let complete = parts.next().is_none() && !pane.is_empty() && !window.is_empty();
        (client == pid && complete).then(|| ClientTarget {
            pane: pane.to_string(),
            window: window.to_string(),
        })
    })
}

/// Decode the four boundary flags; `true` means "at that edge".
pub fn parse_edges(output: &str) -> Result<[bool; 4]> {
    let bytes = output.as_bytes();
    if bytes.len() != 4 {
        return Err(Error::Malformed(output.to_string()));
    }
    let mut edges = [false; 4];
    for (slot, b) in edges.iter_mut().zip(bytes) {
        *slot = match b {
            b'1' => true,
            b'0' => false,
            _ => return Err(Error::Malformed(output.to_string())),
        };
    }
    Ok(edges)
}

/// One tmux client, addressed by its pid, on one server.
#[derive(Debug, Clone)]
pub struct TmuxClient {
    /// Server access.
    tmux: Tmux,
    /// Pid of the attached client process.
    client_pid: u32,
}

impl TmuxClient {
    /// Client `client_pid` on the server behind `tmux`.
    pub fn new(tmux: Tmux, client_pid: u32) -> Self {
        Self { tmux, client_pid }
    }

    /// Active pane and window of this client.
    pub fn target(&self) -> Result<ClientTarget> {
        let out = self.tmux.run(&["list-clients", "-F", CLIENT_FORMAT])?;
        parse_client(&out, self.client_pid).ok_or(Error::NoClient(self.client_pid))
    }

    /// Is the active pane on the boundary in `dir`?
    pub fn at_edge(&self, dir: Direction) -> Result<bool> {
        let target = self.target()?;
        let out = self
            .tmux
            .run(&["display-message", "-p", "-t", &target.pane, EDGE_FORMAT])?;
        let edges = parse_edges(&out)?;
        debug!(pane = %target.pane, ?edges, %dir, "tmux pane edges");
        Ok(edges[edge_index(dir)])
    }

    /// Select the neighbouring pane in `dir`.
    pub fn select(&self, dir: Direction) -> Result<()> {
        let target = self.target()?;
        self.tmux
            .run_quiet(&["select-pane", "-t", &target.pane, select_flag(dir)])
    }

    /// Select the first pane on the window's boundary in `dir`.
    pub fn select_edge(&self, dir: Direction) -> Result<()> {
        let target = self.target()?;
        let filter = format!("#{{pane_at_{}}}", edge_name(dir));
        let out = self.tmux.run(&[
            "list-panes",
            "-t",
            &target.window,
            "-f",
            &filter,
            "-F",
            "#{pane_id}",
        ])?;
        let pane = out
            .lines()
            .next()
            .ok_or_else(|| Error::Malformed(out.clone()))?;
        self.tmux.run_quiet(&["select-pane", "-t", pane])
    }

    /// Pid of the process running in the active pane.
    pub fn pane_pid(&self) -> Result<u32> {
        let target = self.target()?;
        let out = self
            .tmux
            .run(&["display-message", "-p", "-t", &target.pane, "#{pane_pid}"])?;
        out.parse().map_err(|_| Error::Malformed(out))
    }
}
