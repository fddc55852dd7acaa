//! Child process wrapper
//!
//! Owns the gnuplot child and its three pipes. Writes go straight to the
//! child's stdin with no buffering, reads drain a pipe to end of file.

use std::io::{self, Read, Write};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Child process has no {0} pipe")]
    MissingPipe(&'static str),

    #[error("Input to the child process is already closed")]
    InputClosed,

    #[error("Failed to write to child process: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to read from child process: {0}")]
    Read(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, ProcessError>;

/// A spawned plotting program with all standard streams piped
#[derive(Debug)]
pub struct PlotProcess {
    child: Child,
    /// `None` once input has been closed
    stdin: Option<ChildStdin>,
    stdout: ChildStdout,
    stderr: ChildStderr,
}

impl PlotProcess {
    /// Spawn `program` with no arguments
    pub fn spawn(program: &str) -> Result<Self> {
        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Launch {
                program: program.to_string(),
                source,
            })?;

        let pipes = match (child.stdin.take(), child.stdout.take(), child.stderr.take()) {
            (Some(stdin), Some(stdout), Some(stderr)) => Ok((stdin, stdout, stderr)),
            (None, _, _) => Err(ProcessError::MissingPipe("stdin")),
            (_, None, _) => Err(ProcessError::MissingPipe("stdout")),
            (_, _, None) => Err(ProcessError::MissingPipe("stderr")),
        };
        let (stdin, stdout, stderr) = match pipes {
            Ok(pipes) => pipes,
            Err(e) => {
                // Never leave a half-wired child behind
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        debug!(program, pid = child.id(), "Spawned plotting process");
        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout,
            stderr,
        })
    }

    /// OS process id
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Write bytes to the child's stdin
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or(ProcessError::InputClosed)?;
        stdin.write_all(data).map_err(ProcessError::Write)
    }

    /// Close the child's stdin so it sees end of input
    ///
    /// Returns false when it was already closed.
    pub fn close_input(&mut self) -> bool {
        self.stdin.take().is_some()
    }

    /// Read stdout until the child closes it
    pub fn read_stdout(&mut self) -> Result<Vec<u8>> {
        read_to_end(&mut self.stdout)
    }

    /// Read stderr until the child closes it
    pub fn read_stderr(&mut self) -> Result<Vec<u8>> {
        read_to_end(&mut self.stderr)
    }

    /// Kill and reap the child; errors mean it was already gone
    pub fn kill(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!(pid = self.id(), error = %e, "Kill failed, process likely exited");
        }
        if let Err(e) = self.child.wait() {
            debug!(pid = self.id(), error = %e, "Wait after kill failed");
        }
    }

    /// Leave the child running past our own handles
    ///
    /// Every pipe still open is duplicated and the duplicate leaked, so the
    /// child never sees end of input or a broken output pipe while this
    /// process lives. The child is not reaped.
    pub fn detach(&mut self) {
        debug!(pid = self.id(), "Leaving plotting process running");
        if let Some(stdin) = &self.stdin {
            leak_handle("stdin", stdin);
        }
        leak_handle("stdout", &self.stdout);
        leak_handle("stderr", &self.stderr);
    }
}

#[cfg(unix)]
fn leak_handle(name: &str, pipe: &impl std::os::fd::AsFd) {
    use std::os::fd::IntoRawFd;

    match pipe.as_fd().try_clone_to_owned() {
        Ok(fd) => {
            let _ = fd.into_raw_fd();
        }
        Err(e) => debug!(pipe = name, error = %e, "Failed to keep pipe open"),
    }
}

#[cfg(windows)]
fn leak_handle(name: &str, pipe: &impl std::os::windows::io::AsHandle) {
    use std::os::windows::io::IntoRawHandle;

    match pipe.as_handle().try_clone_to_owned() {
        Ok(handle) => {
            let _ = handle.into_raw_handle();
        }
        Err(e) => debug!(pipe = name, error = %e, "Failed to keep pipe open"),
    }
}

fn read_to_end(reader: &mut impl Read) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .map_err(ProcessError::Read)?;
    Ok(buffer)
}
