//! CRC-16/XMODEM as used on the UCI link.
//!
//! Polynomial 0x1021, initial value 0x0000, no reflection, no final XOR.
//! The CRC covers the whole frame (header and payload) and is appended
//! little-endian.

use bytes::{BufMut, BytesMut};

use crate::codec::HEADER_SIZE;
use crate::error::{FrameError, Result};

/// Size of the CRC trailer in bytes.
pub const CRC_SIZE: usize = 2;

const POLY: u16 = 0x1021;

/// Compute CRC-16/XMODEM over `data`.
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0x0000;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if (crc & 0x8000) != 0 {
                crc = (crc << 1) ^ POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Append the CRC of everything already in `dst`.
pub fn append_crc(dst: &mut BytesMut) {
    let crc = crc16_xmodem(dst);
    dst.put_u16_le(crc);
}

/// Result of classifying a frame's CRC trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcCheck {
    /// CRC computed over the frame without its trailer.
    pub calculated: u16,
    /// CRC read from the trailer, if the frame carries one.
    pub provided: Option<u16>,
}

impl CrcCheck {
    /// `Some(true)` if a trailer is present and matches, `None` if there is no trailer.
    pub fn is_valid(&self) -> Option<bool> {
        self.provided.map(|provided| provided == self.calculated)
    }

    /// Turn a mismatching trailer into an error. Frames without a trailer pass.
    pub fn verify(&self) -> Result<()> {
        match self.provided {
            Some(received) if received != self.calculated => Err(FrameError::CrcMismatch {
                calculated: self.calculated,
                received,
            }),
            _ => Ok(()),
        }
    }
}

/// Classify `frame` as carrying a CRC trailer or not, using only the declared
/// payload length in the header.
///
/// A declared length of `frame.len() - 4` means no trailer (the CRC is then
/// computed over the whole frame); `frame.len() - 6` means the last two bytes
/// are the trailer. Anything else is [`FrameError::MalformedFrame`].
pub fn check_frame(frame: &[u8]) -> Result<CrcCheck> {
    if frame.len() < HEADER_SIZE {
        return Err(FrameError::FrameTooShort {
            len: frame.len(),
            min: HEADER_SIZE,
        });
    }

    let declared = u16::from_be_bytes([frame[2], frame[3]]) as usize;
    let body_len = frame.len() - HEADER_SIZE;

    if declared == body_len {
        return Ok(CrcCheck {
            calculated: crc16_xmodem(frame),
            provided: None,
        });
    }

    if body_len >= CRC_SIZE && declared == body_len - CRC_SIZE {
        let split = frame.len() - CRC_SIZE;
        return Ok(CrcCheck {
            calculated: crc16_xmodem(&frame[..split]),
            provided: Some(u16::from_le_bytes([frame[split], frame[split + 1]])),
        });
    }

    Err(FrameError::MalformedFrame {
        declared,
        frame_len: frame.len(),
    })
}

/// Split a trailing little-endian CRC off `frame` and check it.
///
/// Returns the frame body and the check result. Frames shorter than the
/// trailer are [`FrameError::FrameTooShort`].
pub fn split_crc(frame: &[u8]) -> Result<(&[u8], CrcCheck)> {
    if frame.len() < CRC_SIZE {
        return Err(FrameError::FrameTooShort {
            len: frame.len(),
            min: CRC_SIZE,
        });
    }
    let split = frame.len() - CRC_SIZE;
    let (body, trailer) = frame.split_at(split);
    Ok((
        body,
        CrcCheck {
            calculated: crc16_xmodem(body),
            provided: Some(u16::from_le_bytes([trailer[0], trailer[1]])),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(crc16_xmodem(&[]), 0x0000);
        assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_append_crc_little_endian() {
        let mut buf = BytesMut::from(&b"123456789"[..]);
        append_crc(&mut buf);
        assert_eq!(&buf[9..], &[0xC3, 0x31]);
    }

    #[test]
    fn test_check_frame_without_crc() {
        // SESSION_STATUS_NTF with a 6-byte payload.
        let frame = [0x61, 0x02, 0x00, 0x06, 0x78, 0x56, 0x34, 0x12, 0x02, 0x00];
        let check = check_frame(&frame).unwrap();
        assert_eq!(check.provided, None);
        assert_eq!(check.calculated, crc16_xmodem(&frame));
        assert_eq!(check.is_valid(), None);
        assert!(check.verify().is_ok());
    }

    #[test]
    fn test_check_frame_with_crc() {
        let mut buf = BytesMut::from(&[0x40, 0x00, 0x00, 0x01, 0x00][..]);
        append_crc(&mut buf);
        let check = check_frame(&buf).unwrap();
        assert_eq!(check.provided, Some(check.calculated));
        assert_eq!(check.is_valid(), Some(true));
    }

    #[test]
    fn test_check_frame_detects_corruption() {
        let mut buf = BytesMut::from(&[0x40, 0x00, 0x00, 0x01, 0x00][..]);
        append_crc(&mut buf);
        buf[4] = 0x01;
        let check = check_frame(&buf).unwrap();
        assert_eq!(check.is_valid(), Some(false));
        assert!(matches!(
            check.verify(),
            Err(FrameError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_check_frame_header_only() {
        let check = check_frame(&[0x20, 0x02, 0x00, 0x00]).unwrap();
        assert_eq!(check.provided, None);
    }

    #[test]
    fn test_check_frame_rejects_other_lengths() {
        let frame = [0x40, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00];
        assert_eq!(
            check_frame(&frame),
            Err(FrameError::MalformedFrame {
                declared: 5,
                frame_len: 7
            })
        );
    }

    #[test]
    fn test_check_frame_too_short() {
        assert!(matches!(
            check_frame(&[0x40, 0x00]),
            Err(FrameError::FrameTooShort { len: 2, .. })
        ));
    }

    #[test]
    fn test_split_crc() {
        let mut buf = BytesMut::from(&[0x61, 0x01, 0x00, 0x01, 0x01][..]);
        append_crc(&mut buf);
        let (body, check) = split_crc(&buf).unwrap();
        assert_eq!(body, &[0x61, 0x01, 0x00, 0x01, 0x01]);
        assert_eq!(check.is_valid(), Some(true));
    }
}
