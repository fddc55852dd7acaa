//! gnuplot process and session handling.
//!
//! - **process**: child process wrapper owning gnuplot's standard streams
//! - **protocol**: the line-oriented commands gnuplot reads on stdin
//! - **session**: scoped session combining a configuration with a process
//!
//! # Architecture
//!
//! ```text
//! PlotSession (Unopened)
//! └── open() -> OpenSession (Open)
//!     ├── PlotConfig
//!     └── PlotProcess (stdin / stdout / stderr pipes)
//!         ... drop or close() -> Closed
//! ```

pub mod process;
pub mod protocol;
pub mod session;
