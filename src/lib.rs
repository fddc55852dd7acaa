//! gnuplot3d - drive gnuplot from Rust and stream 3D scatter data to it
//!
//! gnuplot runs as a child process with its standard streams piped. Commands
//! are plain text lines written to its stdin; point data is sent as inline
//! `splot '-'` blocks.
//!
//! # Quick Start
//!
//! ```no_run
//! use gnuplot3d::{PlotConfig, PlotSession};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut gp = PlotSession::new(PlotConfig::load()?).open()?;
//!     gp.initialize_unit_cube()?;
//!     gp.send_points([(0.0, 0.0, 0.0), (0.5, -0.5, 0.25)])?;
//!     Ok(())
//! }
//! ```
//!
//! With the default `persist = true` the gnuplot window outlives the session.

pub mod config;
pub mod plot;

pub use config::{Axis, AxisRange, ConfigError, PlotConfig, PlotOptions};
pub use plot::process::ProcessError;
pub use plot::protocol::{Command, Point3};
pub use plot::session::{OpenSession, PlotSession, SessionState, Teardown};
