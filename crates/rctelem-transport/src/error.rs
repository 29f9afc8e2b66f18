use std::net::SocketAddr;
use std::path::PathBuf;

/// Errors that can occur while resolving, opening, or reading a telemetry transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection address matches neither recognized grammar.
    #[error(
        "invalid connection address {address:?} (expected serial:<device>:<baud> or [udpin://]<host>:<port>)"
    )]
    AddressFormat { address: String },

    /// The serial baud rate is not one of the supported rates.
    #[error("unsupported baud rate: {baud} (supported: 9600, 19200, 38400, 57600, 115200)")]
    UnsupportedBaudRate { baud: u64 },

    /// Failed to open the device or create the socket.
    #[error("failed to open {target}: {source}")]
    Open {
        target: String,
        source: std::io::Error,
    },

    /// Failed to bind the datagram socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to apply serial line settings.
    #[error("failed to configure serial device {}: {source}", device.display())]
    Config {
        device: PathBuf,
        source: std::io::Error,
    },

    /// A hard I/O failure while reading from an open transport.
    #[error("transport read error: {0}")]
    Read(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
