use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, TransportError};

const SERIAL_PREFIX: &str = "serial:";
const UDPIN_PREFIX: &str = "udpin://";

/// Serial line rates accepted in a `serial:` address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaudRate {
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
}

impl BaudRate {
    /// All supported rates, slowest first.
    pub const ALL: [BaudRate; 5] = [
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
    ];

    /// Bits per second.
    pub fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115_200,
        }
    }

    /// Map a numeric rate onto a supported variant.
    pub fn from_bits_per_second(baud: u64) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|rate| u64::from(rate.bits_per_second()) == baud)
            .ok_or(TransportError::UnsupportedBaudRate { baud })
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits_per_second())
    }
}

/// Which transport a [`ConnectionSpec`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Serial,
    Datagram,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Serial => "serial",
            TransportKind::Datagram => "udp",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed connection address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSpec {
    /// `serial:<device>:<baud>`
    Serial { device: PathBuf, baud: BaudRate },
    /// `[udpin://]<host>:<port>`
    Datagram { host: String, port: u16 },
}

impl ConnectionSpec {
    pub fn kind(&self) -> TransportKind {
        match self {
            ConnectionSpec::Serial { .. } => TransportKind::Serial,
            ConnectionSpec::Datagram { .. } => TransportKind::Datagram,
        }
    }
}

impl fmt::Display for ConnectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionSpec::Serial { device, baud } => {
                write!(f, "{SERIAL_PREFIX}{}:{baud}", device.display())
            }
            ConnectionSpec::Datagram { host, port } => write!(f, "{UDPIN_PREFIX}{host}:{port}"),
        }
    }
}

impl FromStr for ConnectionSpec {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self> {
        resolve(s)
    }
}

/// Parse a connection address into a [`ConnectionSpec`].
///
/// Recognized grammars:
/// - `serial:<device-path>:<baud>`, split on the first `:` after the prefix
/// - `[udpin://]<host>:<port>`, split on the first `:`
pub fn resolve(address: &str) -> Result<ConnectionSpec> {
    let trimmed = address.trim();

    if let Some(rest) = trimmed.strip_prefix(SERIAL_PREFIX) {
        return resolve_serial(address, rest);
    }

    let rest = trimmed.strip_prefix(UDPIN_PREFIX).unwrap_or(trimmed);
    resolve_datagram(address, rest)
}

fn resolve_serial(address: &str, rest: &str) -> Result<ConnectionSpec> {
    let (device, baud) = rest
        .split_once(':')
        .ok_or_else(|| format_error(address))?;
    if device.is_empty() {
        return Err(format_error(address));
    }

    let baud = parse_unsigned(baud).ok_or_else(|| format_error(address))?;
    let baud = BaudRate::from_bits_per_second(baud)?;

    Ok(ConnectionSpec::Serial {
        device: PathBuf::from(device),
        baud,
    })
}

fn resolve_datagram(address: &str, rest: &str) -> Result<ConnectionSpec> {
    let (host, port) = rest
        .split_once(':')
        .ok_or_else(|| format_error(address))?;
    if host.is_empty() || host.contains('/') {
        return Err(format_error(address));
    }

    let port = parse_unsigned(port)
        .and_then(|p| u16::try_from(p).ok())
        .ok_or_else(|| format_error(address))?;

    Ok(ConnectionSpec::Datagram {
        host: host.to_string(),
        port,
    })
}

// `str::parse` accepts a leading `+`; addresses only allow plain digits.
fn parse_unsigned(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn format_error(address: &str) -> TransportError {
    TransportError::AddressFormat {
        address: address.to_string(),
    }
}
