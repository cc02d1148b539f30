//! Tag-length-value configuration parameters.
//!
//! ```text
//! ┌───────────────────────┬──────────┬──────────────┐
//! │ Tag (1B, or 2B LE)    │ Len (1B) │ Value (Len)  │
//! └───────────────────────┴──────────┴──────────────┘
//! ```
//!
//! Tags above 0xFF are written as two little-endian bytes. When decoding
//! in extension mode, a first tag byte in [`EXTENSION_TAG_PREFIX`] marks a
//! two-byte tag.

use std::fmt;
use std::ops::RangeInclusive;

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// First-byte values that announce a two-byte tag in extension mode.
pub const EXTENSION_TAG_PREFIX: RangeInclusive<u8> = 0xE0..=0xE4;

/// A single configuration TLV. The length is always `value.len()`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UciConfigTlv {
    pub tag: u16,
    pub value: Vec<u8>,
}

impl UciConfigTlv {
    pub fn new(tag: u16, value: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    pub fn from_u8(tag: u16, value: u8) -> Self {
        Self::new(tag, vec![value])
    }

    pub fn from_u16(tag: u16, value: u16) -> Self {
        Self::new(tag, value.to_le_bytes())
    }

    pub fn from_u32(tag: u16, value: u32) -> Self {
        Self::new(tag, value.to_le_bytes())
    }

    /// Value length as written in the length byte.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// True when the tag needs two bytes on the wire.
    pub fn is_extended(&self) -> bool {
        self.tag > 0xFF
    }

    /// Encoded size: tag + length byte + value.
    pub fn wire_size(&self) -> usize {
        let tag_len = if self.is_extended() { 2 } else { 1 };
        tag_len + 1 + self.value.len()
    }

    /// Append the encoded TLV to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        if self.value.len() > u8::MAX as usize {
            return Err(FrameError::TlvValueTooLong {
                tag: self.tag,
                len: self.value.len(),
            });
        }
        dst.reserve(self.wire_size());
        if self.is_extended() {
            dst.put_u16_le(self.tag);
        } else {
            dst.put_u8(self.tag as u8);
        }
        dst.put_u8(self.value.len() as u8);
        dst.put_slice(&self.value);
        Ok(())
    }

    /// Decode one TLV from the start of `src`.
    ///
    /// Returns the TLV and the number of bytes consumed.
    pub fn decode(src: &[u8], extension: bool) -> Result<(Self, usize)> {
        decode_at(src, 0, extension)
    }

    /// Little-endian integer view of the value, for values up to eight bytes.
    pub fn value_as_u64(&self) -> Option<u64> {
        if self.value.is_empty() || self.value.len() > 8 {
            return None;
        }
        let mut raw = [0u8; 8];
        raw[..self.value.len()].copy_from_slice(&self.value);
        Some(u64::from_le_bytes(raw))
    }
}

impl fmt::Debug for UciConfigTlv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tlv(0x{:02X}, {}, [", self.tag, self.value.len())?;
        for (i, byte) in self.value.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        f.write_str("])")
    }
}

fn decode_at(src: &[u8], offset: usize, extension: bool) -> Result<(UciConfigTlv, usize)> {
    let rest = &src[offset..];
    let truncated = |needed: usize| FrameError::TlvTruncated {
        offset,
        needed,
        available: rest.len(),
    };

    let first = *rest.first().ok_or_else(|| truncated(2))?;
    let (tag, tag_len) = if extension && EXTENSION_TAG_PREFIX.contains(&first) {
        let second = *rest.get(1).ok_or_else(|| truncated(3))?;
        (u16::from_le_bytes([first, second]), 2)
    } else {
        (first as u16, 1)
    };

    let len = *rest.get(tag_len).ok_or_else(|| truncated(tag_len + 1))? as usize;
    let end = tag_len + 1 + len;
    if rest.len() < end {
        return Err(truncated(end));
    }

    Ok((UciConfigTlv::new(tag, &rest[tag_len + 1..end]), end))
}

/// Encode a list of TLVs back to back.
pub fn encode_tlvs(tlvs: &[UciConfigTlv], dst: &mut BytesMut) -> Result<()> {
    for tlv in tlvs {
        tlv.encode(dst)?;
    }
    Ok(())
}

/// Decode exactly `count` TLVs from `src`.
pub fn decode_tlvs(src: &[u8], count: usize, extension: bool) -> Result<Vec<UciConfigTlv>> {
    let mut tlvs = Vec::with_capacity(count);
    let mut offset = 0;
    for _ in 0..count {
        let (tlv, used) = decode_at(src, offset, extension)?;
        offset += used;
        tlvs.push(tlv);
    }
    Ok(tlvs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let mut buf = BytesMut::new();
        UciConfigTlv::from_u16(0x08, 2400).encode(&mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0x08, 0x02, 0x60, 0x09]);
    }

    #[test]
    fn test_roundtrip_short_tag() {
        let tlv = UciConfigTlv::from_u32(0x09, 96);
        let mut buf = BytesMut::new();
        tlv.encode(&mut buf).unwrap();
        let (decoded, used) = UciConfigTlv::decode(&buf, false).unwrap();
        assert_eq!(decoded, tlv);
        assert_eq!(used, buf.len());
    }

    #[test]
    fn test_roundtrip_extension_tag() {
        let tlv = UciConfigTlv::new(0x01E3, vec![0x10, 0x20]);
        let mut buf = BytesMut::new();
        tlv.encode(&mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0xE3, 0x01, 0x02, 0x10, 0x20]);
        let (decoded, used) = UciConfigTlv::decode(&buf, true).unwrap();
        assert_eq!(decoded, tlv);
        assert_eq!(used, 5);
    }

    #[test]
    fn test_high_single_byte_tag_without_extension_mode() {
        let buf = [0xE3, 0x01, 0x64];
        let (tlv, used) = UciConfigTlv::decode(&buf, false).unwrap();
        assert_eq!(tlv, UciConfigTlv::from_u8(0xE3, 0x64));
        assert_eq!(used, 3);
    }

    #[test]
    fn test_decode_list() {
        let tlvs = vec![
            UciConfigTlv::from_u8(0x04, 9),
            UciConfigTlv::new(0xA0, vec![0u8; 16]),
            UciConfigTlv::from_u16(0xE4, 100),
        ];
        let mut buf = BytesMut::new();
        encode_tlvs(&tlvs, &mut buf).unwrap();
        assert_eq!(decode_tlvs(&buf, tlvs.len(), false).unwrap(), tlvs);
    }

    #[test]
    fn test_decode_truncated_value() {
        let buf = [0x04, 0x02, 0x09];
        assert!(matches!(
            decode_tlvs(&buf, 1, false),
            Err(FrameError::TlvTruncated { offset: 0, needed: 4, available: 3 })
        ));
    }

    #[test]
    fn test_decode_missing_entries() {
        let buf = [0x04, 0x01, 0x09];
        assert!(matches!(
            decode_tlvs(&buf, 2, false),
            Err(FrameError::TlvTruncated { offset: 3, .. })
        ));
    }

    #[test]
    fn test_value_too_long() {
        let tlv = UciConfigTlv::new(0x07, vec![0u8; 256]);
        let mut buf = BytesMut::new();
        assert!(matches!(
            tlv.encode(&mut buf),
            Err(FrameError::TlvValueTooLong { tag: 0x07, len: 256 })
        ));
    }

    #[test]
    fn test_value_as_u64() {
        assert_eq!(UciConfigTlv::from_u16(0x08, 2400).value_as_u64(), Some(2400));
        assert_eq!(UciConfigTlv::new(0x45, vec![0u8; 16]).value_as_u64(), None);
    }

    #[test]
    fn test_debug_format() {
        let tlv = UciConfigTlv::new(0x06, vec![0x34, 0x12]);
        assert_eq!(format!("{tlv:?}"), "Tlv(0x06, 2, [34 12])");
    }
}
