use rctelem_transport::TransportError;

/// Errors that can occur while starting or running a monitor.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// No connection address is configured.
    #[error("{var} environment variable not set")]
    MissingAddress { var: String },

    /// Address, open, bind, configure, or read failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The output sink rejected a rendered line.
    #[error("failed to write channel values: {0}")]
    Render(#[source] std::io::Error),

    /// `start` was called on a monitor that already ran.
    #[error("monitor already started")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, MonitorError>;
