/// Errors that can occur while encoding frames.
///
/// Decoding never fails: malformed input simply yields no message.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds what the message (or the protocol) allows.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The message id has no registry entry, so no checksum seed is known.
    #[error("unknown message id {0}")]
    UnknownMessage(u32),

    /// MAVLink v1 carries 8-bit message ids only.
    #[error("message id {0} does not fit a v1 frame")]
    MessageIdOutOfRange(u32),
}

pub type Result<T> = std::result::Result<T, FrameError>;
