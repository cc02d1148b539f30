/// Errors that can occur while encoding or decoding UCI frames and TLVs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes than a UCI header.
    #[error("frame too short ({len} bytes, need at least {min})")]
    FrameTooShort { len: usize, min: usize },

    /// The declared payload length matches neither a CRC-less nor a CRC-carrying frame.
    #[error("malformed frame: declared payload length {declared} does not fit frame of {frame_len} bytes")]
    MalformedFrame { declared: usize, frame_len: usize },

    /// The payload exceeds what the length field can carry.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The trailing CRC does not match the computed one.
    #[error("crc mismatch (calculated 0x{calculated:04X}, received 0x{received:04X})")]
    CrcMismatch { calculated: u16, received: u16 },

    /// A TLV header or value ran past the end of the buffer.
    #[error("truncated TLV at offset {offset} (need {needed} bytes, {available} available)")]
    TlvTruncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A TLV value does not fit the one-byte length field.
    #[error("TLV value for tag 0x{tag:02X} too long ({len} bytes, max 255)")]
    TlvValueTooLong { tag: u16, len: usize },

    /// A payload decoder read past the end of the payload.
    #[error("payload truncated at offset {offset} (need {needed} bytes, {available} available)")]
    PayloadTruncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, FrameError>;
