//! UCI message framing for UWB transceivers.
//!
//! Every UCI packet starts with a 4-byte header:
//! - message type, packet boundary flag and 4-bit group id
//! - extension flag and 6-bit opcode
//! - a big-endian payload length (high byte zero unless extended)
//!
//! An optional CRC-16/XMODEM trailer follows the payload. Configuration
//! parameters travel as TLV lists inside the payload.

pub mod codec;
pub mod crc;
pub mod error;
pub mod gid;
pub mod status;
pub mod tags;
pub mod tlv;

pub use codec::{
    decode_message, encode_message, MessageType, UciMessage, HEADER_SIZE, MAX_PACKET_SIZE,
    MAX_PAYLOAD,
};
pub use crc::{append_crc, check_frame, crc16_xmodem, split_crc, CrcCheck, CRC_SIZE};
pub use error::{FrameError, Result};
pub use gid::GroupId;
pub use status::UciStatus;
pub use tlv::{decode_tlvs, encode_tlvs, UciConfigTlv, EXTENSION_TAG_PREFIX};
