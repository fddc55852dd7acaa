//! Plot session management
//!
//! A [`PlotSession`] holds a validated configuration and nothing else. Opening
//! it launches gnuplot and hands back an [`OpenSession`], which owns the child
//! process for as long as it lives. Dropping or closing the `OpenSession` tears
//! the child down (or leaves it running when `persist` is set), so every exit
//! path releases the process exactly once.
//!
//! ```no_run
//! use gnuplot3d::{PlotOptions, PlotSession};
//!
//! fn main() -> anyhow::Result<()> {
//!     let session = PlotSession::with_options(PlotOptions::new().persist(false))?;
//!     session.scope(|gp| -> anyhow::Result<()> {
//!         gp.initialize_unit_cube()?;
//!         gp.send_points([(0.0, 0.0, 0.0), (0.5, 0.5, 0.5)])?;
//!         Ok(())
//!     })
//! }
//! ```

use tracing::{debug, info};

use super::process::{PlotProcess, ProcessError, Result};
use super::protocol::{Command, Point3};
use crate::config::{ConfigError, PlotConfig, PlotOptions};

/// Lifecycle stage of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Configured, no process yet
    Unopened,
    /// Process running and reachable
    Open,
    /// Process released; nothing more can be sent
    Closed,
}

/// What teardown did with the child process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// The child was killed and reaped
    Terminated { pid: u32 },
    /// The child was left running on purpose
    Detached { pid: u32 },
}

/// A configured, not yet launched, gnuplot session
#[derive(Debug, Clone)]
pub struct PlotSession {
    config: PlotConfig,
}

impl PlotSession {
    /// Create a session from an already validated configuration
    pub fn new(config: PlotConfig) -> Self {
        Self { config }
    }

    /// Validate `options` against the platform defaults and create a session
    pub fn with_options(options: PlotOptions) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(PlotConfig::new(options)?))
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        SessionState::Unopened
    }

    /// Launch gnuplot with all standard streams piped
    pub fn open(self) -> Result<OpenSession> {
        let process = PlotProcess::spawn(self.config.executable())?;
        info!(
            executable = self.config.executable(),
            pid = process.id(),
            persist = self.config.persist(),
            "Opened plot session"
        );
        Ok(OpenSession {
            config: self.config,
            process,
            closed: false,
        })
    }

    /// Open the session, run `body` against it, then tear it down
    ///
    /// Teardown happens before the body's result is returned, whether that
    /// result is `Ok` or `Err`. A panic in `body` tears down through `Drop`.
    pub fn scope<T, E, F>(self, body: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut OpenSession) -> std::result::Result<T, E>,
        E: From<ProcessError>,
    {
        let mut session = self.open()?;
        let result = body(&mut session);
        session.close();
        result
    }
}

/// A running gnuplot session
///
/// Owns the child process exclusively. Not reusable once closed.
#[derive(Debug)]
pub struct OpenSession {
    config: PlotConfig,
    process: PlotProcess,
    /// Set once teardown has run
    closed: bool,
}

impl OpenSession {
    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        if self.closed {
            SessionState::Closed
        } else {
            SessionState::Open
        }
    }

    /// OS process id of the gnuplot child
    pub fn id(&self) -> u32 {
        self.process.id()
    }

    /// Write `text` followed by a newline, verbatim
    pub fn send_line(&mut self, text: &str) -> Result<()> {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        self.process.write(line.as_bytes())
    }

    pub fn send(&mut self, command: &Command) -> Result<()> {
        self.send_line(&command.to_string())
    }

    /// Set the x, y and z ranges, then the terminal kind and window size
    pub fn initialize_unit_cube(&mut self) -> Result<()> {
        for command in Command::unit_cube(&self.config) {
            self.send(&command)?;
        }
        Ok(())
    }

    /// Send one inline scatter plot of `points`
    ///
    /// An empty sequence is valid and draws nothing. Points outside the axis
    /// ranges are left for gnuplot to clip.
    pub fn send_points<I, P>(&mut self, points: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point3>,
    {
        for command in Command::scatter_block(points) {
            self.send(&command)?;
        }
        Ok(())
    }

    /// Everything gnuplot writes to stdout, read until it closes the stream
    ///
    /// Blocks until gnuplot exits or closes stdout. There is no framing, so this
    /// is only useful for diagnostics after [`close_input`](Self::close_input).
    pub fn receive_all(&mut self) -> Result<Vec<u8>> {
        self.process.read_stdout()
    }

    /// Everything gnuplot writes to stderr, read until it closes the stream
    pub fn receive_errors(&mut self) -> Result<Vec<u8>> {
        self.process.read_stderr()
    }

    /// Close gnuplot's stdin; it exits once it has drained its input
    ///
    /// Closing twice is a no-op.
    pub fn close_input(&mut self) {
        if self.process.close_input() {
            debug!(pid = self.id(), "Closed plot session input");
        }
    }

    /// End the session now instead of at drop
    pub fn close(mut self) -> Teardown {
        self.teardown()
    }

    fn teardown(&mut self) -> Teardown {
        self.closed = true;
        let pid = self.process.id();

        let outcome = if self.config.persist() {
            self.process.detach();
            Teardown::Detached { pid }
        } else {
            self.process.kill();
            Teardown::Terminated { pid }
        };
        info!(?outcome, "Closed plot session");
        outcome
    }
}

impl Drop for OpenSession {
    fn drop(&mut self) {
        if !self.closed {
            self.teardown();
        }
    }
}
