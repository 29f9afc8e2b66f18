use std::time::Duration;

use crate::error::{MonitorError, Result};

/// Environment variable holding the connection address.
pub const ADDRESS_ENV: &str = "DRONE_ADDRESS";

/// Where the monitor gets its connection address from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSource {
    /// Read the named environment variable at start.
    Env(String),
    /// Use this address as given.
    Literal(String),
}

impl Default for AddressSource {
    fn default() -> Self {
        AddressSource::Env(ADDRESS_ENV.to_string())
    }
}

impl AddressSource {
    /// Fetch the address. An unset or blank variable is an error.
    pub fn load(&self) -> Result<String> {
        match self {
            AddressSource::Env(var) => match std::env::var(var) {
                Ok(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(MonitorError::MissingAddress { var: var.clone() }),
            },
            AddressSource::Literal(address) => Ok(address.clone()),
        }
    }
}

/// Monitor behavior.
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    pub address: AddressSource,
    /// Stop after rendering this many channel messages.
    pub max_messages: Option<u64>,
    /// Stop after roughly this long (bounded by the one-second read timeout).
    pub max_duration: Option<Duration>,
}

impl MonitorConfig {
    pub fn new(address: AddressSource) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }
}
