//! Streaming MAVLink frame decoding for RC channel telemetry.
//!
//! Raw transport bytes go in one at a time; validated messages come out.
//! Each frame carries:
//! - a start marker (`0xFE` v1, `0xFD` v2) for stream synchronization
//! - a header with payload length, routing ids, and message id
//! - a CRC-16/MCRF4XX checksum seeded with a per-message `CRC_EXTRA`
//!
//! No partial-frame bookkeeping in user code: feed bytes, receive messages.

pub mod codec;
pub mod decoder;
pub mod error;
pub mod message;
pub mod registry;

pub use codec::{checksum, encode_v1, encode_v2, FrameHeader, ProtocolVersion, STX_V1, STX_V2};
pub use decoder::{DecoderStats, FrameDecoder};
pub use error::{FrameError, Result};
pub use message::{DecodedMessage, RcChannels, RC_CHANNEL_FIELDS, RENDERED_CHANNELS};
pub use registry::{
    MessageInfo, ATTITUDE, GLOBAL_POSITION_INT, GPS_RAW_INT, HEARTBEAT, RC_CHANNELS,
    RC_CHANNELS_RAW, SYS_STATUS,
};
