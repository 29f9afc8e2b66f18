use std::io::Read;

use tracing::debug;

use crate::address::{ConnectionSpec, TransportKind};
use crate::error::{Result, TransportError};
use crate::serial::SerialPort;
use crate::udp::UdpLink;

/// An open telemetry transport with a uniform read contract.
///
/// This is the handle the monitor owns. Reads return `Ok(0)` on timeout and
/// never block for more than about one second, on either transport.
pub struct TelemetryStream {
    inner: StreamInner,
}

enum StreamInner {
    Serial(SerialPort),
    Datagram(UdpLink),
}

impl TelemetryStream {
    /// Open the transport selected by `spec`.
    pub fn open(spec: &ConnectionSpec) -> Result<Self> {
        let inner = match spec {
            ConnectionSpec::Serial { device, baud } => {
                StreamInner::Serial(SerialPort::open(device, *baud)?)
            }
            ConnectionSpec::Datagram { host, port } => {
                StreamInner::Datagram(UdpLink::open(host, *port)?)
            }
        };
        Ok(Self { inner })
    }

    /// Read the next chunk of bytes. `Ok(0)` means the read timed out.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match &mut self.inner {
            StreamInner::Serial(port) => port.read(buf),
            StreamInner::Datagram(link) => link.read(buf),
        }
    }

    pub fn kind(&self) -> TransportKind {
        match &self.inner {
            StreamInner::Serial(_) => TransportKind::Serial,
            StreamInner::Datagram(_) => TransportKind::Datagram,
        }
    }

    /// Human-readable endpoint description for logs.
    pub fn describe(&self) -> String {
        match &self.inner {
            StreamInner::Serial(port) => {
                format!("{} @ {} baud", port.device().display(), port.baud())
            }
            StreamInner::Datagram(link) => format!("udp {}", link.local_addr()),
        }
    }

    /// Borrow the datagram transport, if that is what was opened.
    pub fn as_datagram(&self) -> Option<&UdpLink> {
        match &self.inner {
            StreamInner::Datagram(link) => Some(link),
            StreamInner::Serial(_) => None,
        }
    }

    /// Release the underlying descriptor now.
    ///
    /// Consuming `self` makes a second close impossible; dropping the stream
    /// has the same effect.
    pub fn close(self) {
        debug!(transport = %self.kind(), endpoint = %self.describe(), "closing transport");
        drop(self);
    }
}

impl Read for TelemetryStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        TelemetryStream::read(self, buf).map_err(|err| match err {
            TransportError::Read(io) => io,
            other => std::io::Error::other(other.to_string()),
        })
    }
}

impl std::fmt::Debug for TelemetryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            StreamInner::Serial(port) => f
                .debug_struct("TelemetryStream")
                .field("type", &"serial")
                .field("port", port)
                .finish(),
            StreamInner::Datagram(link) => f
                .debug_struct("TelemetryStream")
                .field("type", &"udp")
                .field("link", link)
                .finish(),
        }
    }
}
