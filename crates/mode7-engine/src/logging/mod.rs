//! Logging utilities.
//!
//! Centralizes logger initialization on top of the `log` facade with `env_logger`
//! as the sink. Engine modules only ever call `log::{trace,debug,info,warn,error}`.

mod init;

pub use init::{init_logging, LoggingConfig};
