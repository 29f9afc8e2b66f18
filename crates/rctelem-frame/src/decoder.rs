use bytes::BytesMut;
use crc_any::CRCu16;
use tracing::trace;

use crate::codec::{new_checksum, ProtocolVersion, IFLAG_SIGNED, MAX_PAYLOAD_LEN, SIGNATURE_LEN};
use crate::message::DecodedMessage;
use crate::registry;

/// Parser position inside the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Hunting for a start marker.
    Idle,
    Length,
    IncompatFlags,
    CompatFlags,
    Sequence,
    SystemId,
    ComponentId,
    MessageId { received: u8 },
    Payload,
    ChecksumLow,
    ChecksumHigh { low: u8 },
    Signature { remaining: u8 },
}

/// Counters describing what the decoder has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames that passed validation and were emitted.
    pub frames: u64,
    pub checksum_errors: u64,
    /// Complete frames whose message id is not in the registry.
    pub unknown_messages: u64,
    /// Frames rejected for unsupported flags or an oversized payload.
    pub malformed: u64,
    /// Bytes skipped while hunting for a start marker.
    pub discarded_bytes: u64,
}

/// Stateful MAVLink v1/v2 frame decoder fed one byte at a time.
///
/// Invalid or incomplete frames never produce an error; they reset the state
/// machine and decoding resumes at the next start marker.
pub struct FrameDecoder {
    state: State,
    version: ProtocolVersion,
    payload_len: usize,
    incompat_flags: u8,
    sequence: u8,
    system_id: u8,
    component_id: u8,
    message_id: u32,
    payload: BytesMut,
    crc: CRCu16,
    pending: Option<DecodedMessage>,
    stats: DecoderStats,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            version: ProtocolVersion::V2,
            payload_len: 0,
            incompat_flags: 0,
            sequence: 0,
            system_id: 0,
            component_id: 0,
            message_id: 0,
            payload: BytesMut::with_capacity(MAX_PAYLOAD_LEN),
            crc: new_checksum(),
            pending: None,
            stats: DecoderStats::default(),
        }
    }

    /// Consume one byte. Returns a message exactly when this byte completes a
    /// valid frame.
    pub fn feed(&mut self, byte: u8) -> Option<DecodedMessage> {
        match self.state {
            State::Idle => {
                match ProtocolVersion::from_start_marker(byte) {
                    Some(version) => self.begin(version),
                    None => self.stats.discarded_bytes += 1,
                }
                None
            }
            State::Length => {
                self.crc.digest(&[byte]);
                self.payload_len = usize::from(byte);
                self.state = match self.version {
                    ProtocolVersion::V1 => State::Sequence,
                    ProtocolVersion::V2 => State::IncompatFlags,
                };
                None
            }
            State::IncompatFlags => {
                if byte & !IFLAG_SIGNED != 0 {
                    trace!(flags = byte, "unsupported incompat flags");
                    self.stats.malformed += 1;
                    self.state = State::Idle;
                    return None;
                }
                self.crc.digest(&[byte]);
                self.incompat_flags = byte;
                self.state = State::CompatFlags;
                None
            }
            State::CompatFlags => {
                self.crc.digest(&[byte]);
                self.state = State::Sequence;
                None
            }
            State::Sequence => {
                self.crc.digest(&[byte]);
                self.sequence = byte;
                self.state = State::SystemId;
                None
            }
            State::SystemId => {
                self.crc.digest(&[byte]);
                self.system_id = byte;
                self.state = State::ComponentId;
                None
            }
            State::ComponentId => {
                self.crc.digest(&[byte]);
                self.component_id = byte;
                self.state = State::MessageId { received: 0 };
                None
            }
            State::MessageId { received } => {
                self.crc.digest(&[byte]);
                self.message_id |= u32::from(byte) << (8 * u32::from(received));
                let received = received + 1;
                let id_len = match self.version {
                    ProtocolVersion::V1 => 1,
                    ProtocolVersion::V2 => 3,
                };
                self.state = if received < id_len {
                    State::MessageId { received }
                } else if self.payload_len == 0 {
                    State::ChecksumLow
                } else {
                    State::Payload
                };
                None
            }
            State::Payload => {
                self.crc.digest(&[byte]);
                self.payload.extend_from_slice(&[byte]);
                if self.payload.len() == self.payload_len {
                    self.state = State::ChecksumLow;
                }
                None
            }
            State::ChecksumLow => {
                self.state = State::ChecksumHigh { low: byte };
                None
            }
            State::ChecksumHigh { low } => {
                let received = u16::from_le_bytes([low, byte]);
                let message = self.finish_frame(received);
                if self.incompat_flags & IFLAG_SIGNED != 0 {
                    self.pending = message;
                    self.state = State::Signature {
                        remaining: SIGNATURE_LEN as u8,
                    };
                    None
                } else {
                    self.state = State::Idle;
                    message
                }
            }
            State::Signature { remaining } => {
                if remaining > 1 {
                    self.state = State::Signature {
                        remaining: remaining - 1,
                    };
                    None
                } else {
                    self.state = State::Idle;
                    self.pending.take()
                }
            }
        }
    }

    /// Feed a slice in order, collecting every completed message.
    pub fn feed_slice(&mut self, bytes: &[u8]) -> Vec<DecodedMessage> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }

    /// Drop any partially assembled frame.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.pending = None;
        self.payload.clear();
    }

    /// True when no frame is partially assembled.
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    fn begin(&mut self, version: ProtocolVersion) {
        self.version = version;
        self.payload_len = 0;
        self.incompat_flags = 0;
        self.message_id = 0;
        self.payload.clear();
        self.pending = None;
        self.crc.reset();
        self.state = State::Length;
    }

    /// Validate the assembled frame against `received` and build the message.
    fn finish_frame(&mut self, received: u16) -> Option<DecodedMessage> {
        let Some(info) = registry::lookup(self.message_id) else {
            trace!(message_id = self.message_id, "skipping unregistered message");
            self.stats.unknown_messages += 1;
            return None;
        };

        self.crc.digest(&[info.crc_extra]);
        let computed = self.crc.get_crc();
        if computed != received {
            trace!(
                message = info.name,
                computed,
                received,
                "checksum mismatch"
            );
            self.stats.checksum_errors += 1;
            return None;
        }

        if self.payload_len > info.payload_len {
            trace!(
                message = info.name,
                len = self.payload_len,
                max = info.payload_len,
                "payload longer than registered"
            );
            self.stats.malformed += 1;
            return None;
        }

        let mut payload = std::mem::take(&mut self.payload);
        payload.resize(info.payload_len, 0);
        self.payload = BytesMut::with_capacity(MAX_PAYLOAD_LEN);

        self.stats.frames += 1;
        Some(DecodedMessage {
            version: self.version,
            sequence: self.sequence,
            system_id: self.system_id,
            component_id: self.component_id,
            message_id: self.message_id,
            payload: payload.freeze(),
            signed: self.incompat_flags & IFLAG_SIGNED != 0,
        })
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish()
    }
}
