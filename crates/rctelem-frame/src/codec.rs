use bytes::{BufMut, BytesMut};
use crc_any::CRCu16;

use crate::error::{FrameError, Result};
use crate::registry;

/// Start marker of a MAVLink v1 frame.
pub const STX_V1: u8 = 0xFE;
/// Start marker of a MAVLink v2 frame.
pub const STX_V2: u8 = 0xFD;

/// v1 header after the start marker: len, seq, sysid, compid, msgid.
pub const HEADER_LEN_V1: usize = 5;
/// v2 header after the start marker: len, incompat, compat, seq, sysid, compid, msgid (3).
pub const HEADER_LEN_V2: usize = 9;
pub const CHECKSUM_LEN: usize = 2;
pub const SIGNATURE_LEN: usize = 13;
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Incompatibility flag: frame carries a trailing signature.
pub const IFLAG_SIGNED: u8 = 0x01;

/// Wire protocol revision of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    V1,
    V2,
}

impl ProtocolVersion {
    pub fn start_marker(self) -> u8 {
        match self {
            ProtocolVersion::V1 => STX_V1,
            ProtocolVersion::V2 => STX_V2,
        }
    }

    pub fn from_start_marker(byte: u8) -> Option<Self> {
        match byte {
            STX_V1 => Some(ProtocolVersion::V1),
            STX_V2 => Some(ProtocolVersion::V2),
            _ => None,
        }
    }
}

/// Routing fields written into an encoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            sequence: 0,
            system_id: 1,
            component_id: 1,
        }
    }
}

/// A fresh CRC-16/MCRF4XX accumulator, the MAVLink frame checksum.
pub(crate) fn new_checksum() -> CRCu16 {
    CRCu16::crc16mcrf4cc()
}

/// Checksum over `bytes` (everything after the start marker through the
/// payload) seeded with the message's `crc_extra`.
pub fn checksum(bytes: &[u8], crc_extra: u8) -> u16 {
    let mut crc = new_checksum();
    crc.digest(bytes);
    crc.digest(&[crc_extra]);
    crc.get_crc()
}

/// Encode a MAVLink v2 frame.
///
/// Trailing zero bytes of the payload are trimmed, keeping at least one byte.
///
/// ```text
/// ┌─────┬─────┬────────┬────────┬─────┬───────┬────────┬──────────┬─────────┬──────────┐
/// │ STX │ LEN │ INCOMP │ COMPAT │ SEQ │ SYSID │ COMPID │ MSGID    │ PAYLOAD │ CRC      │
/// │ FD  │ 1B  │ 1B     │ 1B     │ 1B  │ 1B    │ 1B     │ (3B LE)  │ LEN B   │ (2B LE)  │
/// └─────┴─────┴────────┴────────┴─────┴───────┴────────┴──────────┴─────────┴──────────┘
/// ```
pub fn encode_v2(
    header: &FrameHeader,
    message_id: u32,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let info = registry::lookup(message_id).ok_or(FrameError::UnknownMessage(message_id))?;
    check_payload_len(payload, info.payload_len)?;

    let trimmed_len = payload
        .iter()
        .rposition(|&b| b != 0)
        .map_or(1, |last| last + 1)
        .min(payload.len());
    let payload = &payload[..trimmed_len];

    let start = dst.len();
    dst.reserve(1 + HEADER_LEN_V2 + payload.len() + CHECKSUM_LEN);
    dst.put_u8(STX_V2);
    dst.put_u8(payload.len() as u8);
    dst.put_u8(0);
    dst.put_u8(0);
    dst.put_u8(header.sequence);
    dst.put_u8(header.system_id);
    dst.put_u8(header.component_id);
    dst.put_slice(&message_id.to_le_bytes()[..3]);
    dst.put_slice(payload);

    let crc = checksum(&dst[start + 1..], info.crc_extra);
    dst.put_u16_le(crc);
    Ok(())
}

/// Encode a MAVLink v1 frame.
///
/// ```text
/// ┌─────┬─────┬─────┬───────┬────────┬───────┬─────────┬──────────┐
/// │ STX │ LEN │ SEQ │ SYSID │ COMPID │ MSGID │ PAYLOAD │ CRC      │
/// │ FE  │ 1B  │ 1B  │ 1B    │ 1B     │ 1B    │ LEN B   │ (2B LE)  │
/// └─────┴─────┴─────┴───────┴────────┴───────┴─────────┴──────────┘
/// ```
pub fn encode_v1(
    header: &FrameHeader,
    message_id: u32,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let id = u8::try_from(message_id).map_err(|_| FrameError::MessageIdOutOfRange(message_id))?;
    let info = registry::lookup(message_id).ok_or(FrameError::UnknownMessage(message_id))?;
    check_payload_len(payload, info.payload_len)?;

    let start = dst.len();
    dst.reserve(1 + HEADER_LEN_V1 + payload.len() + CHECKSUM_LEN);
    dst.put_u8(STX_V1);
    dst.put_u8(payload.len() as u8);
    dst.put_u8(header.sequence);
    dst.put_u8(header.system_id);
    dst.put_u8(header.component_id);
    dst.put_u8(id);
    dst.put_slice(payload);

    let crc = checksum(&dst[start + 1..], info.crc_extra);
    dst.put_u16_le(crc);
    Ok(())
}

fn check_payload_len(payload: &[u8], max: usize) -> Result<()> {
    if payload.len() > max {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max,
        });
    }
    Ok(())
}
