//! Running the tmux binary against one server socket.

use std::{
    ffi::OsString,
    io::{self, Read},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use tracing::trace;

use crate::{Error, Result};

/// Most output accepted from a single tmux call.
pub const MAX_OUTPUT: usize = 4096;

/// Interval between exit checks while waiting on tmux.
const POLL: Duration = Duration::from_millis(2);

/// A tmux binary bound to a server socket and a per-call deadline.
#[derive(Debug, Clone)]
pub struct Tmux {
    /// Program to run, normally `tmux` from `PATH`.
    program: OsString,
    /// Server socket passed with `-S`.
    socket: PathBuf,
    /// Limit on each call.
    timeout: Duration,
}

impl Tmux {
    /// tmux from `PATH`.
    pub fn new(socket: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::with_program("tmux", socket, timeout)
    }

    /// A specific tmux binary.
    pub fn with_program(
        program: impl Into<OsString>,
        socket: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            socket: socket.into(),
            timeout,
        }
    }

    /// The server socket.
    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Run `tmux -S <socket> <args>` and return its trimmed stdout.
    ///
    /// Fails on spawn errors, a non-zero exit, empty output, output larger
    /// than [`MAX_OUTPUT`], or when the call outlives the timeout.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        trace!(socket = %self.socket.display(), ?args, "tmux");
        let mut child = Command::new(&self.program)
            .arg("-S")
            .arg(&self.socket)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        // Drain stdout while waiting so tmux never blocks on a full pipe.
        // Past the cap the pipe is closed and the child gets SIGPIPE.
        let stdout = child.stdout.take();
        let reader = thread::spawn(move || -> io::Result<Vec<u8>> {
            let mut out = Vec::new();
            if let Some(stdout) = stdout {
                stdout.take(MAX_OUTPUT as u64 + 1).read_to_end(&mut out)?;
            }
            Ok(out)
        });

        let status = self.wait(&mut child)?;
        let out = reader
            .join()
            .map_err(|_| io::Error::other("tmux stdout reader panicked"))??;
        if out.len() > MAX_OUTPUT {
            return Err(Error::OutputTooLarge(MAX_OUTPUT));
        }
        if !status.success() {
            return Err(Error::Exit {
                args: args.join(" "),
                status,
            });
        }
        let text = String::from_utf8_lossy(&out).trim().to_string();
        if text.is_empty() {
            return Err(Error::EmptyOutput);
        }
        trace!(output = %text, "tmux output");
        Ok(text)
    }

    /// Run a command whose output is irrelevant.
    pub fn run_quiet(&self, args: &[&str]) -> Result<()> {
        match self.run(args) {
            Ok(_) | Err(Error::EmptyOutput) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Wait for exit, killing the child once the deadline passes. A zero
    /// timeout waits indefinitely.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus> {
        if self.timeout.is_zero() {
            return Ok(child.wait()?);
        }
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                child.kill().ok();
                child.wait().ok();
                return Err(Error::Timeout(self.timeout));
            }
            thread::sleep(POLL);
        }
    }
}
