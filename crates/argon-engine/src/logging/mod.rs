//! Logger setup for hosts.
//!
//! Library code only talks to the `log` facade. `env_logger` is wired up here
//! for binaries and tests that want output.

mod init;

pub use init::{LoggingConfig, init_logging};
