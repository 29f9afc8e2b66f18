//! Live RC channel monitoring for MAVLink flight controllers.
//!
//! rctelem reads telemetry from a serial line or a UDP socket, decodes the
//! MAVLink stream, and reports every `RC_CHANNELS` message.
//!
//! # Crate Structure
//!
//! - [`transport`]: address resolution plus serial and UDP transports
//! - [`frame`]: streaming MAVLink v1/v2 frame decoding
//! - [`monitor`]: the monitoring loop, renderers, and one-shot snapshots

/// Re-export transport types.
pub mod transport {
    pub use rctelem_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use rctelem_frame::*;
}

/// Re-export monitor types.
pub mod monitor {
    pub use rctelem_monitor::*;
}
