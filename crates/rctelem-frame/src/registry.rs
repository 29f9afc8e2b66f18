//! Message ids understood by the decoder.
//!
//! A frame can only be validated when its message id is known, because the
//! checksum is seeded with a per-message `CRC_EXTRA` byte.

pub const HEARTBEAT: u32 = 0;
pub const SYS_STATUS: u32 = 1;
pub const GPS_RAW_INT: u32 = 24;
pub const ATTITUDE: u32 = 30;
pub const GLOBAL_POSITION_INT: u32 = 33;
pub const RC_CHANNELS_RAW: u32 = 35;
pub const RC_CHANNELS: u32 = 65;

/// Registry entry for one message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageInfo {
    pub id: u32,
    pub name: &'static str,
    pub crc_extra: u8,
    /// Full (untruncated) payload length in bytes, extension fields included.
    pub payload_len: usize,
}

const MESSAGES: &[MessageInfo] = &[
    MessageInfo {
        id: HEARTBEAT,
        name: "HEARTBEAT",
        crc_extra: 50,
        payload_len: 9,
    },
    MessageInfo {
        id: SYS_STATUS,
        name: "SYS_STATUS",
        crc_extra: 124,
        payload_len: 43,
    },
    MessageInfo {
        id: GPS_RAW_INT,
        name: "GPS_RAW_INT",
        crc_extra: 24,
        payload_len: 52,
    },
    MessageInfo {
        id: ATTITUDE,
        name: "ATTITUDE",
        crc_extra: 39,
        payload_len: 28,
    },
    MessageInfo {
        id: GLOBAL_POSITION_INT,
        name: "GLOBAL_POSITION_INT",
        crc_extra: 104,
        payload_len: 28,
    },
    MessageInfo {
        id: RC_CHANNELS_RAW,
        name: "RC_CHANNELS_RAW",
        crc_extra: 244,
        payload_len: 22,
    },
    MessageInfo {
        id: RC_CHANNELS,
        name: "RC_CHANNELS",
        crc_extra: 118,
        payload_len: 42,
    },
];

/// Look up a message id.
pub fn lookup(id: u32) -> Option<&'static MessageInfo> {
    MESSAGES.iter().find(|info| info.id == id)
}

/// Message name for logs, `"UNKNOWN"` when not registered.
pub fn message_name(id: u32) -> &'static str {
    lookup(id).map(|info| info.name).unwrap_or("UNKNOWN")
}
