//! Tracing setup for the shell.
//!
//! The shell logs through `tracing`: one `transition` span per navigation
//! (with route and generation fields) and `debug` events for each phase,
//! `warn` on failures. Embedders that already install a subscriber can skip
//! this module entirely.
//!
//! # Configuration
//!
//! Trace level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` option in [`ShellConfig`](crate::ShellConfig)
//! 3. Default: `"info"`
//!
//! # Usage
//!
//! ```rust
//! use pageshell::observability::init_tracing;
//! use pageshell::ShellConfig;
//!
//! let config = ShellConfig::default();
//! init_tracing(&config);
//!
//! tracing::debug!("shell initialized");
//! ```

mod init;

pub use init::{filter_directive, init_tracing};
