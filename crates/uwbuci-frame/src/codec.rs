use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::crc::{append_crc, CRC_SIZE};
use crate::error::{FrameError, Result};
use crate::gid::GroupId;
use crate::status::UciStatus;

/// UCI header: type/pbf/gid (1) + ext/oid (1) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Maximum payload carried by a non-extended packet.
pub const MAX_PAYLOAD: usize = 255;

/// Largest packet the link accepts (header + maximum payload).
pub const MAX_PACKET_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD;

/// UCI message type, the top three bits of the first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Command,
    Response,
    Notification,
    /// Any other 3-bit value. Decoding continues with this marker.
    Undefined(u8),
}

impl MessageType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            1 => Self::Command,
            2 => Self::Response,
            3 => Self::Notification,
            other => Self::Undefined(other),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Command => 1,
            Self::Response => 2,
            Self::Notification => 3,
            Self::Undefined(bits) => bits & 0x07,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Command => "CMD",
            Self::Response => "RSP",
            Self::Notification => "NTF",
            Self::Undefined(_) => "UNDEF",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single UCI packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UciMessage {
    pub message_type: MessageType,
    /// Packet boundary flag: set when more segments of the same message follow.
    pub packet_boundary: bool,
    pub gid: GroupId,
    /// Payload extension flag: the length field uses both bytes.
    pub extended: bool,
    /// 6-bit opcode.
    pub oid: u8,
    /// Status byte of a non-continuation response.
    pub status: Option<UciStatus>,
    /// Payload, excluding the status byte and any CRC.
    pub payload: Bytes,
}

impl UciMessage {
    /// Create a message with no status byte and no flags set.
    pub fn new(
        message_type: MessageType,
        gid: GroupId,
        oid: u8,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            message_type,
            packet_boundary: false,
            gid,
            extended: false,
            oid: oid & 0x3F,
            status: None,
            payload: payload.into(),
        }
    }

    /// Create a command packet.
    pub fn command(gid: GroupId, oid: u8, payload: impl Into<Bytes>) -> Self {
        Self::new(MessageType::Command, gid, oid, payload)
    }

    /// Create a notification packet.
    pub fn notification(gid: GroupId, oid: u8, payload: impl Into<Bytes>) -> Self {
        Self::new(MessageType::Notification, gid, oid, payload)
    }

    /// Create a response packet with a separate status byte.
    pub fn response(gid: GroupId, oid: u8, status: UciStatus, payload: impl Into<Bytes>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(MessageType::Response, gid, oid, payload)
        }
    }

    /// Value of the header length field: status byte (if any) plus payload.
    pub fn payload_length(&self) -> usize {
        self.payload.len() + usize::from(self.status.is_some())
    }

    /// Encoded size without a CRC trailer.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload_length()
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self, with_crc: bool) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.wire_size() + CRC_SIZE);
        encode_message(self, with_crc, &mut buf)?;
        Ok(buf.freeze())
    }
}

/// Encode a UCI message.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬──────────────────┬──────────┬──────────┬──────────┬──────────┬──────────┐
/// │ MT:3 PBF:1 GID:4 │ EXT:1 RFU:1 OID:6│ LEN_HI   │ LEN_LO   │ STATUS?  │ PAYLOAD  │ CRC16 LE?│
/// └──────────────────┴──────────────────┴──────────┴──────────┴──────────┴──────────┴──────────┘
/// ```
///
/// `LEN_HI` is always zero unless the extension flag is set.
pub fn encode_message(msg: &UciMessage, with_crc: bool, dst: &mut BytesMut) -> Result<()> {
    let len = msg.payload_length();
    let max = if msg.extended {
        u16::MAX as usize
    } else {
        MAX_PAYLOAD
    };
    if len > max {
        return Err(FrameError::PayloadTooLarge { size: len, max });
    }

    let start = dst.len();
    dst.reserve(HEADER_SIZE + len + CRC_SIZE);
    dst.put_u8(
        (msg.message_type.bits() << 5) | (u8::from(msg.packet_boundary) << 4) | msg.gid.as_u8(),
    );
    dst.put_u8((u8::from(msg.extended) << 7) | (msg.oid & 0x3F));
    dst.put_u8(if msg.extended { (len >> 8) as u8 } else { 0 });
    dst.put_u8((len & 0xFF) as u8);
    if let Some(status) = msg.status {
        dst.put_u8(status.as_u8());
    }
    dst.put_slice(&msg.payload);

    if with_crc {
        let mut frame = dst.split_off(start);
        append_crc(&mut frame);
        dst.unsplit(frame);
    }
    Ok(())
}

/// Decode a UCI message from a complete frame.
///
/// With `strip_crc` the last two bytes are treated as a CRC trailer and
/// ignored; use [`crate::crc::check_frame`] to validate it. With
/// `expect_status`, a response's first payload byte is split off into
/// [`UciMessage::status`]; continuation fragments and dispatch paths that
/// let decoders read the status themselves pass `false`.
///
/// Bytes beyond the declared payload length are ignored.
pub fn decode_message(src: &[u8], strip_crc: bool, expect_status: bool) -> Result<UciMessage> {
    let body = if strip_crc {
        &src[..src.len().saturating_sub(CRC_SIZE)]
    } else {
        src
    };

    if body.len() < HEADER_SIZE {
        return Err(FrameError::FrameTooShort {
            len: body.len(),
            min: HEADER_SIZE,
        });
    }

    let message_type = MessageType::from_bits(body[0] >> 5);
    if let MessageType::Undefined(bits) = message_type {
        tracing::debug!(bits, "undefined UCI message type");
    }
    let packet_boundary = (body[0] & 0x10) != 0;
    let gid = GroupId::from_u8(body[0]);
    let extended = (body[1] & 0x80) != 0;
    let oid = body[1] & 0x3F;
    let declared = u16::from_be_bytes([body[2], body[3]]) as usize;

    let available = body.len() - HEADER_SIZE;
    if declared > available {
        return Err(FrameError::MalformedFrame {
            declared,
            frame_len: body.len(),
        });
    }

    let mut region = Bytes::copy_from_slice(&body[HEADER_SIZE..HEADER_SIZE + declared]);
    let status = if expect_status && message_type == MessageType::Response && !region.is_empty()
    {
        let status = UciStatus::from_u8(region[0]);
        region = region.slice(1..);
        Some(status)
    } else {
        None
    };

    Ok(UciMessage {
        message_type,
        packet_boundary,
        gid,
        extended,
        oid,
        status,
        payload: region,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::check_frame;
    use crate::gid::session;

    #[test]
    fn test_encode_command_layout() {
        let msg = UciMessage::command(GroupId::Session, session::INIT, vec![0x78, 0x56, 0x34, 0x12, 0xA0]);
        let bytes = msg.to_bytes(false).unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[0x21, 0x00, 0x00, 0x05, 0x78, 0x56, 0x34, 0x12, 0xA0]
        );
    }

    #[test]
    fn test_roundtrip_with_and_without_status_and_crc() {
        for len in [0usize, 1, 4, 200, 254] {
            let payload: Vec<u8> = (0..len).map(|i| i as u8).collect();
            for with_crc in [false, true] {
                let ntf = UciMessage::notification(GroupId::Range, 0x00, payload.clone());
                let encoded = ntf.to_bytes(with_crc).unwrap();
                assert_eq!(decode_message(&encoded, with_crc, true).unwrap(), ntf);

                let rsp = UciMessage::response(GroupId::Core, 0x02, UciStatus::Ok, payload.clone());
                let encoded = rsp.to_bytes(with_crc).unwrap();
                assert_eq!(decode_message(&encoded, with_crc, true).unwrap(), rsp);
            }
        }
    }

    #[test]
    fn test_full_payload_without_status() {
        let msg = UciMessage::notification(GroupId::Range, 0x20, vec![0xAB; MAX_PAYLOAD]);
        let encoded = msg.to_bytes(false).unwrap();
        assert_eq!(encoded.len(), MAX_PACKET_SIZE);
        assert_eq!(decode_message(&encoded, false, true).unwrap(), msg);
    }

    #[test]
    fn test_payload_too_large() {
        let msg = UciMessage::command(GroupId::Session, 0x03, vec![0u8; MAX_PAYLOAD + 1]);
        assert!(matches!(
            msg.to_bytes(false),
            Err(FrameError::PayloadTooLarge { size: 256, max: 255 })
        ));
    }

    #[test]
    fn test_extended_length_uses_high_byte() {
        let mut msg = UciMessage::notification(GroupId::Data, 0x01, vec![0x11; 300]);
        msg.extended = true;
        let encoded = msg.to_bytes(false).unwrap();
        assert_eq!(&encoded[..4], &[0x69, 0x81, 0x01, 0x2C]);
        assert_eq!(decode_message(&encoded, false, false).unwrap(), msg);
    }

    #[test]
    fn test_crc_trailer_is_classified() {
        let msg = UciMessage::notification(GroupId::Session, 0x02, vec![1, 2, 3, 4, 2, 0]);
        let encoded = msg.to_bytes(true).unwrap();
        assert_eq!(check_frame(&encoded).unwrap().is_valid(), Some(true));
    }

    #[test]
    fn test_response_status_kept_in_payload_when_not_expected() {
        let frame = [0x41, 0x00, 0x00, 0x01, 0x00];
        let msg = decode_message(&frame, false, false).unwrap();
        assert_eq!(msg.status, None);
        assert_eq!(msg.payload.as_ref(), &[0x00]);
    }

    #[test]
    fn test_decode_too_short() {
        assert!(matches!(
            decode_message(&[0x60, 0x01, 0x00], false, true),
            Err(FrameError::FrameTooShort { len: 3, .. })
        ));
        assert!(matches!(
            decode_message(&[0x60, 0x01, 0x00, 0x00, 0x12], true, true),
            Err(FrameError::FrameTooShort { len: 3, .. })
        ));
    }

    #[test]
    fn test_decode_undefined_message_type_continues() {
        let msg = decode_message(&[0xE0, 0x05, 0x00, 0x01, 0x7F], false, true).unwrap();
        assert_eq!(msg.message_type, MessageType::Undefined(7));
        assert_eq!(msg.oid, 0x05);
        assert_eq!(msg.payload.as_ref(), &[0x7F]);
    }

    #[test]
    fn test_decode_declared_length_overruns_frame() {
        assert!(matches!(
            decode_message(&[0x60, 0x01, 0x00, 0x04, 0x01], false, true),
            Err(FrameError::MalformedFrame { declared: 4, frame_len: 5 })
        ));
    }

    #[test]
    fn test_decode_flags() {
        let msg = decode_message(&[0x72, 0x20, 0x00, 0x00], false, true).unwrap();
        assert_eq!(msg.message_type, MessageType::Notification);
        assert!(msg.packet_boundary);
        assert_eq!(msg.gid, GroupId::Range);
        assert_eq!(msg.oid, 0x20);
    }
}
