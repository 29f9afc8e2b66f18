use std::fmt;

use rctelem_monitor::MonitorError;
use rctelem_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(FAILURE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn transport_error(err: TransportError) -> CliError {
    CliError::failure(err.to_string())
}

/// Every monitor failure exits 1; the message is the library's own.
pub fn monitor_error(err: MonitorError) -> CliError {
    match err {
        MonitorError::Transport(err) => transport_error(err),
        other => CliError::failure(other.to_string()),
    }
}
