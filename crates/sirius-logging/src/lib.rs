//! Logging setup shared by the sirius crates.
//!
//! `init` installs a `tracing` subscriber writing to stdout plus daily
//! rolling files under `<root>/logs`; the level comes from
//! `<root>/config/logging.json` and can be changed at runtime with `apply`.

pub mod config;
pub mod fs;
pub mod init;
pub mod retention;
pub mod targets;
pub mod watch;

pub use config::LoggingConfig;
pub use fs::{read_config, write_config_atomic};
pub use init::{apply, init, LoggingGuards};
pub use retention::run_retention;
pub use watch::spawn_watcher;
