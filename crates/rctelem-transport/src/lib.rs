//! Telemetry transport abstraction.
//!
//! Provides one read contract over the two ways a flight controller's
//! telemetry reaches us:
//! - a serial line (raw 8N1, one-second read timeout)
//! - a UDP datagram socket (wildcard bind, one-second receive timeout)
//!
//! This is the lowest layer of rctelem. Everything else builds on top of
//! the [`TelemetryStream`] type provided here, selected from a
//! [`ConnectionSpec`] parsed by [`resolve`].

pub mod address;
pub mod error;
#[cfg(unix)]
pub mod serial;
#[cfg(unix)]
pub mod stream;
#[cfg(unix)]
pub mod udp;

pub use address::{resolve, BaudRate, ConnectionSpec, TransportKind};
pub use error::{Result, TransportError};

#[cfg(unix)]
pub use serial::SerialPort;
#[cfg(unix)]
pub use stream::TelemetryStream;
#[cfg(unix)]
pub use udp::UdpLink;
