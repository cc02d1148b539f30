//! Ranging data notifications.
//!
//! FiRa devices report on (RANGE, 0x00). CCC devices report on
//! (RANGE, 0x20) with a layout that depends on the local role, and
//! controllers of the expanded profile also report per-responder
//! distances on (RANGE, 0x23).

use std::fmt;

use serde::Serialize;
use uwbuci_frame::{FrameError, UciStatus};

use crate::decoders::{Decoded, Decoding};
use crate::reader::PayloadReader;
use crate::types::CccRangeStatus;

/// Offset of the first measurement in a FiRa range notification.
const FIRA_RESULTS_OFFSET: usize = 25;

/// Stride between FiRa measurements, whatever the address mode.
const FIRA_RESULT_STRIDE: usize = 31;

/// Offset of the first responder result in an expanded CCC notification.
const CCC_EXP_RESULTS_OFFSET: usize = 16;

/// One two-way ranging measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FiraTwrResult {
    /// Short (16-bit) or extended (64-bit) address, per the header's address mode.
    pub mac_address: u64,
    pub status: u8,
    pub nlos: u8,
    /// Distance in centimeters.
    pub distance: u16,
    pub aoa_azimuth: u16,
    pub aoa_azimuth_fom: u8,
    pub aoa_elevation: u16,
    pub aoa_elevation_fom: u8,
    pub dst_aoa_azimuth: u16,
    pub dst_aoa_azimuth_fom: u8,
    pub dst_aoa_elevation: u16,
    pub dst_aoa_elevation_fom: u8,
    pub slot_index: u8,
}

impl FiraTwrResult {
    fn decode(r: &mut PayloadReader<'_>, extended_address: bool) -> Result<Self, FrameError> {
        let mac_address = if extended_address {
            r.u64_le()?
        } else {
            u64::from(r.u16_le()?)
        };
        Ok(Self {
            mac_address,
            status: r.u8()?,
            nlos: r.u8()?,
            distance: r.u16_le()?,
            aoa_azimuth: r.u16_le()?,
            aoa_azimuth_fom: r.u8()?,
            aoa_elevation: r.u16_le()?,
            aoa_elevation_fom: r.u8()?,
            dst_aoa_azimuth: r.u16_le()?,
            dst_aoa_azimuth_fom: r.u8()?,
            dst_aoa_elevation: r.u16_le()?,
            dst_aoa_elevation_fom: r.u8()?,
            slot_index: r.u8()?,
        })
    }
}

/// RANGE_DATA_NTF header and measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiraRangeData {
    pub sequence: u32,
    pub session_id: u32,
    pub ranging_interval: u32,
    pub measurement_type: u8,
    pub mac_address_mode: u8,
    pub results: Vec<FiraTwrResult>,
}

impl fmt::Display for FiraRangeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session 0x{:08X} seq {} interval {}ms",
            self.session_id, self.sequence, self.ranging_interval
        )?;
        for result in &self.results {
            write!(
                f,
                " [0x{:04X} slot {} {}cm status 0x{:02X}]",
                result.mac_address, result.slot_index, result.distance, result.status
            )?;
        }
        Ok(())
    }
}

/// CCC range notification as seen by a controlee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CccControleeRange {
    pub session_id: u32,
    pub range_status: CccRangeStatus,
    pub sts_index: u32,
    pub rr_index: u16,
    /// Distance in centimeters.
    pub distance: u16,
    pub anchor_fom: u8,
    pub initiator_fom: u8,
    pub ccm_tag: [u8; 8],
}

impl fmt::Display for CccControleeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session 0x{:08X} {} sts {} rr {} {}cm",
            self.session_id, self.range_status, self.sts_index, self.rr_index, self.distance
        )
    }
}

/// CCC range notification as seen by a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CccControllerRange {
    pub session_id: u32,
    pub range_status: CccRangeStatus,
    pub sts_index: u32,
    pub rr_index: u16,
    /// One status bit per responder.
    pub responder_status: u32,
    pub ccm_tag: [u8; 8],
}

impl fmt::Display for CccControllerRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session 0x{:08X} {} sts {} rr {} responders 0x{:08X}",
            self.session_id, self.range_status, self.sts_index, self.rr_index, self.responder_status
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CccResponderResult {
    pub responder_index: u8,
    pub distance: u16,
}

/// Expanded controller notification with per-responder distances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CccControllerExpRange {
    pub session_id: u32,
    pub range_status: CccRangeStatus,
    pub sts_index: u32,
    pub rr_index: u16,
    pub responder_status: u32,
    pub results: Vec<CccResponderResult>,
}

impl fmt::Display for CccControllerExpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session 0x{:08X} {} sts {} rr {}",
            self.session_id, self.range_status, self.sts_index, self.rr_index
        )?;
        for result in &self.results {
            write!(f, " [#{} {}cm]", result.responder_index, result.distance)?;
        }
        Ok(())
    }
}

pub fn fira_range_ntf(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let sequence = r.u32_le()?;
    let session_id = r.u32_le()?;
    r.skip(1)?;
    let ranging_interval = r.u32_le()?;
    let measurement_type = r.u8()?;
    r.skip(1)?;
    let mac_address_mode = r.u8()?;
    r.skip(8)?;
    let count = r.u8()? as usize;

    let results = (0..count)
        .map(|i| {
            let mut block = PayloadReader::at(payload, FIRA_RESULTS_OFFSET + i * FIRA_RESULT_STRIDE);
            FiraTwrResult::decode(&mut block, mac_address_mode > 0)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((
        UciStatus::Ok,
        Decoded::FiraRange(FiraRangeData {
            sequence,
            session_id,
            ranging_interval,
            measurement_type,
            mac_address_mode,
            results,
        }),
    ))
}

/// Controlee layout: the responder status sits in the high nibble.
pub fn ccc_controlee_range_ntf(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let session_id = r.u32_le()?;
    let range_status = CccRangeStatus::from_u8((r.u8()? >> 4) & 0x0F);
    Ok((
        UciStatus::Ok,
        Decoded::CccControleeRange(CccControleeRange {
            session_id,
            range_status,
            sts_index: r.u32_le()?,
            rr_index: r.u16_le()?,
            distance: r.u16_le()?,
            anchor_fom: r.u8()?,
            initiator_fom: r.u8()?,
            ccm_tag: r.array()?,
        }),
    ))
}

/// Controller layout: the ranging status sits in the low nibble.
pub fn ccc_controller_range_ntf(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let session_id = r.u32_le()?;
    let range_status = CccRangeStatus::from_u8(r.u8()? & 0x0F);
    Ok((
        UciStatus::Ok,
        Decoded::CccControllerRange(CccControllerRange {
            session_id,
            range_status,
            sts_index: r.u32_le()?,
            rr_index: r.u16_le()?,
            responder_status: r.u32_le()?,
            ccm_tag: r.array()?,
        }),
    ))
}

pub fn ccc_controller_exp_range_ntf(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let session_id = r.u32_le()?;
    let sts_index = r.u32_le()?;
    let rr_index = r.u16_le()?;
    let range_status = CccRangeStatus::from_u8(r.u8()? & 0x0F);
    let count = r.u8()? as usize;
    let responder_status = r.u32_le()?;
    debug_assert_eq!(r.position(), CCC_EXP_RESULTS_OFFSET);

    let mut results = Vec::with_capacity(count);
    for _ in 0..count {
        results.push(CccResponderResult {
            responder_index: r.u8()?,
            distance: r.u16_le()?,
        });
    }

    Ok((
        UciStatus::Ok,
        Decoded::CccControllerExpRange(CccControllerExpRange {
            session_id,
            range_status,
            sts_index,
            rr_index,
            responder_status,
            results,
        }),
    ))
}
