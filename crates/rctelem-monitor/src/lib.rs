//! RC channel monitoring over MAVLink telemetry.
//!
//! Resolves a connection address, opens the serial or UDP transport, and
//! streams every `RC_CHANNELS` message to a [`ChannelSink`] until stopped.
//! All other MAVLink traffic is decoded and dropped.

pub mod config;
pub mod error;
pub mod monitor;
pub mod render;
pub mod snapshot;

pub use config::{AddressSource, MonitorConfig, ADDRESS_ENV};
pub use error::{MonitorError, Result};
pub use monitor::{MonitorState, MonitorStats, StopHandle, TelemetryMonitor, CHUNK_SIZE};
pub use render::{format_line, ChannelRenderer, ChannelSink, RenderStyle};
pub use snapshot::{capture_one, DEFAULT_SNAPSHOT_TIMEOUT};

pub use rctelem_frame::{RcChannels, RENDERED_CHANNELS};
pub use rctelem_transport::{resolve, ConnectionSpec, TransportError, TransportKind};
