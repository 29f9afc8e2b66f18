use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::ProtocolVersion;
use crate::registry::{self, RC_CHANNELS};

/// A checksum-validated frame.
///
/// For v2 frames the payload is zero-extended back to the registered length,
/// so typed decoders never see a truncated payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    pub version: ProtocolVersion,
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
    pub message_id: u32,
    pub payload: Bytes,
    /// The frame carried a v2 signature (not verified).
    pub signed: bool,
}

impl DecodedMessage {
    pub fn name(&self) -> &'static str {
        registry::message_name(self.message_id)
    }
}

/// Number of raw channel fields carried by `RC_CHANNELS`.
pub const RC_CHANNEL_FIELDS: usize = 18;

/// Channels shown by the renderers.
pub const RENDERED_CHANNELS: usize = 8;

/// Decoded `RC_CHANNELS` message.
///
/// Channel values are raw (typically 1000-2000, 1500 centre) and are never
/// reinterpreted here: `0` and `u16::MAX` are passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RcChannels {
    pub time_boot_ms: u32,
    pub channels: [u16; RC_CHANNEL_FIELDS],
    pub chancount: u8,
    pub rssi: u8,
}

impl RcChannels {
    /// Wire payload length.
    pub const PAYLOAD_LEN: usize = 42;

    /// Build a message with the given leading channel values and the rest unused.
    pub fn new(time_boot_ms: u32, values: &[u16]) -> Self {
        let mut channels = [u16::MAX; RC_CHANNEL_FIELDS];
        let n = values.len().min(RC_CHANNEL_FIELDS);
        channels[..n].copy_from_slice(&values[..n]);
        Self {
            time_boot_ms,
            channels,
            chancount: n as u8,
            rssi: u8::MAX,
        }
    }

    /// Decode from a validated message; `None` for any other message id.
    pub fn from_message(message: &DecodedMessage) -> Option<Self> {
        if message.message_id != RC_CHANNELS {
            return None;
        }
        Self::decode(&message.payload)
    }

    /// Decode a full-length payload.
    pub fn decode(payload: &[u8]) -> Option<Self> {
        if payload.len() < Self::PAYLOAD_LEN {
            return None;
        }
        let mut buf = payload;
        let time_boot_ms = buf.get_u32_le();
        let mut channels = [0u16; RC_CHANNEL_FIELDS];
        for ch in &mut channels {
            *ch = buf.get_u16_le();
        }
        let chancount = buf.get_u8();
        let rssi = buf.get_u8();
        Some(Self {
            time_boot_ms,
            channels,
            chancount,
            rssi,
        })
    }

    /// Encode into the 42-byte wire payload.
    pub fn to_payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::PAYLOAD_LEN);
        buf.put_u32_le(self.time_boot_ms);
        for ch in self.channels {
            buf.put_u16_le(ch);
        }
        buf.put_u8(self.chancount);
        buf.put_u8(self.rssi);
        buf.freeze()
    }

    /// Channels 1 through 8, in order.
    pub fn rendered(&self) -> &[u16] {
        &self.channels[..RENDERED_CHANNELS]
    }

    /// One-based channel lookup.
    pub fn channel(&self, number: usize) -> Option<u16> {
        number
            .checked_sub(1)
            .and_then(|idx| self.channels.get(idx).copied())
    }
}
