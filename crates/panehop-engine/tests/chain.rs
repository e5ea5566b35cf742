use std::{collections::VecDeque, sync::Arc, time::Duration};

use panehop_engine::{
    DetectedHook, DetectedList, Direction, Hook, LayerSource, MoveResult, Outcome, ProcInfo,
    WindowFocus, navigate,
};
use parking_lot::Mutex;
use thiserror::Error;

const TIMEOUT: Duration = Duration::from_millis(50);

/// Shared, ordered call log.
#[derive(Clone, Default)]
struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    fn push(&self, call: String) {
        self.0.lock().push(call);
    }

    fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.0.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

/// Hook that answers `can_move` from a script and records everything.
struct ScriptedHook {
    name: &'static str,
    answer: MoveResult,
    calls: Calls,
}

impl Hook for ScriptedHook {
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect(&self, _proc: &ProcInfo) -> Option<u32> {
        None
    }

    fn can_move(&self, pid: u32, dir: Direction, _timeout: Duration) -> MoveResult {
        self.calls.push(format!("{}:can_move:{pid}:{dir}", self.name));
        self.answer
    }

    fn move_focus(&self, pid: u32, dir: Direction, _timeout: Duration) -> MoveResult {
        self.calls.push(format!("{}:move_focus:{pid}:{dir}", self.name));
        MoveResult::CanMove
    }

    fn move_to_edge(&self, pid: u32, dir: Direction, _timeout: Duration) -> MoveResult {
        self.calls.push(format!("{}:move_to_edge:{pid}:{dir}", self.name));
        MoveResult::CanMove
    }
}

/// Layer source that hands out one prepared list per detection pass.
struct FakeLayers<'h> {
    passes: Mutex<VecDeque<Vec<DetectedHook<'h>>>>,
    calls: Calls,
}

impl<'h> FakeLayers<'h> {
    fn new(calls: &Calls, passes: Vec<Vec<DetectedHook<'h>>>) -> Self {
        Self {
            passes: Mutex::new(passes.into()),
            calls: calls.clone(),
        }
    }
}

impl<'h> LayerSource<'h> for FakeLayers<'h> {
    fn detect_all(&self, root: u32) -> DetectedList<'h> {
        self.calls.push(format!("detect:{root}"));
        let mut list = DetectedList::new();
        for d in self.passes.lock().pop_front().unwrap_or_default() {
            list.push(d);
        }
        list
    }
}

#[derive(Debug, Error)]
#[error("window manager unavailable")]
struct WmDown;

/// Window manager that reports a scripted sequence of focused pids.
struct MockWm {
    focused: VecDeque<Option<u32>>,
    fail_move: bool,
    calls: Calls,
}

impl MockWm {
    fn new(calls: &Calls, focused: Vec<Option<u32>>) -> Self {
        Self {
            focused: focused.into(),
            fail_move: false,
            calls: calls.clone(),
        }
    }
}

impl WindowFocus for MockWm {
    type Error = WmDown;

    fn focused_pid(&mut self) -> Option<u32> {
        self.focused.pop_front().flatten()
    }

    fn move_focus(&mut self, dir: Direction) -> Result<(), WmDown> {
        self.calls.push(format!("wm:move_focus:{dir}"));
        if self.fail_move { Err(WmDown) } else { Ok(()) }
    }
}

fn layer(hook: &dyn Hook, pid: u32, depth: u32) -> DetectedHook<'_> {
    DetectedHook { hook, pid, depth }
}

#[test]
fn no_layers_moves_window_once() {
    let calls = Calls::default();
    let mut wm = MockWm::new(&calls, vec![Some(10), Some(20)]);
    let layers = FakeLayers::new(&calls, vec![vec![], vec![]]);

    let out = navigate(&mut wm, &layers, Direction::Left, TIMEOUT);

    assert_eq!(out, Outcome::Window { landed: None });
    assert_eq!(calls.count("wm:move_focus"), 1);
    assert_eq!(
        calls.all(),
        vec!["detect:10", "wm:move_focus:left", "detect:20"]
    );
}

#[test]
fn innermost_layer_that_can_move_wins() {
    let calls = Calls::default();
    let mux = ScriptedHook {
        name: "mux",
        answer: MoveResult::CanMove,
        calls: calls.clone(),
    };
    let editor = ScriptedHook {
        name: "editor",
        answer: MoveResult::CanMove,
        calls: calls.clone(),
    };
    let mut wm = MockWm::new(&calls, vec![Some(10)]);
    let layers = FakeLayers::new(
        &calls,
        vec![vec![layer(&mux, 11, 0), layer(&editor, 12, 2)]],
    );

    let out = navigate(&mut wm, &layers, Direction::Right, TIMEOUT);

    assert_eq!(
        out,
        Outcome::Layer {
            hook: "editor",
            pid: 12
        }
    );
    assert_eq!(
        calls.all(),
        vec![
            "detect:10",
            "editor:can_move:12:right",
            "editor:move_focus:12:right"
        ]
    );
    assert_eq!(calls.count("wm:"), 0);
    assert_eq!(calls.count("mux:"), 0);
}

#[test]
fn bubbles_to_outer_layer() {
    let calls = Calls::default();
    let mux = ScriptedHook {
        name: "mux",
        answer: MoveResult::CanMove,
        calls: calls.clone(),
    };
    let editor = ScriptedHook {
        name: "editor",
        answer: MoveResult::AtEdge,
        calls: calls.clone(),
    };
    let mut wm = MockWm::new(&calls, vec![Some(10)]);
    let layers = FakeLayers::new(
        &calls,
        vec![vec![layer(&mux, 11, 0), layer(&editor, 12, 2)]],
    );

    let out = navigate(&mut wm, &layers, Direction::Up, TIMEOUT);

    assert_eq!(out, Outcome::Layer { hook: "mux", pid: 11 });
    assert_eq!(calls.count("mux:move_focus:11:up"), 1);
    assert_eq!(calls.count("editor:move_focus"), 0);
    assert_eq!(calls.count("wm:"), 0);
}

#[test]
fn layer_errors_bubble_like_edges() {
    let calls = Calls::default();
    let mux = ScriptedHook {
        name: "mux",
        answer: MoveResult::CanMove,
        calls: calls.clone(),
    };
    let broken = ScriptedHook {
        name: "editor",
        answer: MoveResult::Error,
        calls: calls.clone(),
    };
    let mut wm = MockWm::new(&calls, vec![Some(10)]);
    let layers = FakeLayers::new(
        &calls,
        vec![vec![layer(&mux, 11, 0), layer(&broken, 12, 1)]],
    );

    let out = navigate(&mut wm, &layers, Direction::Down, TIMEOUT);

    assert_eq!(out, Outcome::Layer { hook: "mux", pid: 11 });
}

#[test]
fn all_edges_move_window_then_land_on_opposite_edge() {
    let calls = Calls::default();
    let mux = ScriptedHook {
        name: "mux",
        answer: MoveResult::AtEdge,
        calls: calls.clone(),
    };
    let editor = ScriptedHook {
        name: "editor",
        answer: MoveResult::AtEdge,
        calls: calls.clone(),
    };
    let mut wm = MockWm::new(&calls, vec![Some(10), Some(30)]);
    let layers = FakeLayers::new(
        &calls,
        vec![
            vec![layer(&mux, 11, 0), layer(&editor, 12, 2)],
            vec![layer(&mux, 31, 0), layer(&editor, 32, 3)],
        ],
    );

    let out = navigate(&mut wm, &layers, Direction::Left, TIMEOUT);

    assert_eq!(
        out,
        Outcome::Window {
            landed: Some("editor")
        }
    );
    assert_eq!(
        calls.all(),
        vec![
            "detect:10",
            "editor:can_move:12:left",
            "mux:can_move:11:left",
            "wm:move_focus:left",
            "detect:30",
            "editor:move_to_edge:32:right",
        ]
    );
}

#[test]
fn missing_focus_goes_straight_to_window_move() {
    let calls = Calls::default();
    let editor = ScriptedHook {
        name: "editor",
        answer: MoveResult::CanMove,
        calls: calls.clone(),
    };
    let mut wm = MockWm::new(&calls, vec![None, Some(40)]);
    let layers = FakeLayers::new(&calls, vec![vec![layer(&editor, 41, 1)]]);

    let out = navigate(&mut wm, &layers, Direction::Down, TIMEOUT);

    assert_eq!(
        out,
        Outcome::Window {
            landed: Some("editor")
        }
    );
    assert_eq!(
        calls.all(),
        vec![
            "wm:move_focus:down",
            "detect:40",
            "editor:move_to_edge:41:up"
        ]
    );
}

#[test]
fn window_move_failure_stops_without_landing() {
    let calls = Calls::default();
    let mut wm = MockWm::new(&calls, vec![Some(10), Some(20)]);
    wm.fail_move = true;
    let layers = FakeLayers::new(&calls, vec![vec![], vec![]]);

    let out = navigate(&mut wm, &layers, Direction::Right, TIMEOUT);

    assert_eq!(out, Outcome::Stuck);
    assert_eq!(calls.all(), vec!["detect:10", "wm:move_focus:right"]);
}

#[test]
fn no_pid_after_window_move_is_done() {
    let calls = Calls::default();
    let mut wm = MockWm::new(&calls, vec![Some(10), None]);
    let layers = FakeLayers::new(&calls, vec![vec![]]);

    let out = navigate(&mut wm, &layers, Direction::Up, TIMEOUT);

    assert_eq!(out, Outcome::Window { landed: None });
    assert_eq!(calls.all(), vec!["detect:10", "wm:move_focus:up"]);
}
