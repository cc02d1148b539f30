//! Payload decoders for responses and notifications.
//!
//! Every decoder receives the payload with the status byte still in place
//! (when the message carries one) and returns the status it found plus a
//! typed [`Decoded`] value. Decoders never panic on short input; they
//! report [`FrameError::PayloadTruncated`].

use std::fmt;

use serde::{Serialize, Serializer};
use uwbuci_frame::{decode_tlvs, FrameError, UciConfigTlv, UciStatus};

use crate::ranging::{CccControleeRange, CccControllerExpRange, CccControllerRange, FiraRangeData};
use crate::reader::PayloadReader;
use crate::types::{DeviceState, MulticastStatus, ReasonCode, SessionState, SessionStatus};

/// Result of one decoder: the status byte and the typed payload.
pub type Decoding = Result<(UciStatus, Decoded), FrameError>;

/// Decoded payload of a response or notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Decoded {
    None,
    /// Bytes that follow the status, or an undecodable payload.
    Raw(Vec<u8>),
    DeviceState(DeviceState),
    DeviceInfo(DeviceInfo),
    ConfigTlvs(#[serde(serialize_with = "serialize_tlvs")] Vec<UciConfigTlv>),
    ConfigStatus(Vec<ConfigStatus>),
    SessionStatus(SessionStatus),
    SessionCount(u8),
    SessionState(SessionState),
    Multicast(MulticastUpdate),
    RanMultiplier(u8),
    RangingCount(u32),
    SerialNumber(String),
    License(String),
    CccData(CccData),
    FiraRange(FiraRangeData),
    CccControleeRange(CccControleeRange),
    CccControllerRange(CccControllerRange),
    CccControllerExpRange(CccControllerExpRange),
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("-"),
            Self::Raw(bytes) => write_hex(f, bytes),
            Self::DeviceState(state) => write!(f, "{state}"),
            Self::DeviceInfo(info) => write!(
                f,
                "uci {} mac {} phy {} test {}",
                info.uci_version, info.mac_version, info.phy_version, info.test_version
            ),
            Self::ConfigTlvs(tlvs) => write!(f, "{} params", tlvs.len()),
            Self::ConfigStatus(failed) if failed.is_empty() => f.write_str("all params accepted"),
            Self::ConfigStatus(failed) => write!(f, "{} params rejected", failed.len()),
            Self::SessionStatus(status) => write!(f, "{status}"),
            Self::SessionCount(count) => write!(f, "{count} sessions"),
            Self::SessionState(state) => write!(f, "{state}"),
            Self::Multicast(update) => write!(
                f,
                "session 0x{:08X} multicast {} records, {} free",
                update.session_id,
                update.records.len(),
                update.remaining
            ),
            Self::RanMultiplier(value) => write!(f, "RAN multiplier {value}"),
            Self::RangingCount(count) => write!(f, "{count} rounds"),
            Self::SerialNumber(serial) => f.write_str(serial),
            Self::License(license) => f.write_str(license),
            Self::CccData(data) => write!(
                f,
                "session 0x{:08X} {} data bytes",
                data.session_id,
                data.data.len()
            ),
            Self::FiraRange(data) => write!(f, "{data}"),
            Self::CccControleeRange(data) => write!(f, "{data}"),
            Self::CccControllerRange(data) => write!(f, "{data}"),
            Self::CccControllerExpRange(data) => write!(f, "{data}"),
        }
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    if bytes.is_empty() {
        return f.write_str("-");
    }
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{byte:02X}")?;
    }
    Ok(())
}

/// CORE_DEVICE_INFO_RSP body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub uci_version: String,
    pub mac_version: String,
    pub phy_version: String,
    pub test_version: String,
    pub vendor: Vec<u8>,
}

/// One rejected parameter from a SET_CONFIG or SET_APP_CONFIG response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigStatus {
    pub id: u8,
    #[serde(serialize_with = "serialize_status")]
    pub status: UciStatus,
}

/// One controlee entry of a multicast list update notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MulticastRecord {
    /// Present only in the 7-byte record layout.
    pub short_address: Option<u16>,
    pub sub_session_id: u32,
    pub status: MulticastStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MulticastUpdate {
    pub session_id: u32,
    pub remaining: u8,
    pub records: Vec<MulticastRecord>,
}

/// Vendor CCC broadcast data notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CccData {
    pub session_id: u32,
    pub length: u8,
    pub data: Vec<u8>,
}

pub(crate) fn serialize_status<S: Serializer>(status: &UciStatus, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(status.name())
}

fn serialize_tlvs<S: Serializer>(tlvs: &[UciConfigTlv], s: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Entry<'a> {
        tag: u16,
        name: &'static str,
        value: &'a [u8],
    }
    s.collect_seq(tlvs.iter().map(|tlv| Entry {
        tag: tlv.tag,
        name: uwbuci_frame::tags::app_tag_name(tlv.tag),
        value: &tlv.value,
    }))
}

fn status_at_start(r: &mut PayloadReader<'_>) -> Result<UciStatus, FrameError> {
    r.u8().map(UciStatus::from_u8)
}

/// Status byte followed by opaque bytes.
pub fn common_status(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    let rest = r.rest();
    let decoded = if rest.is_empty() {
        Decoded::None
    } else {
        Decoded::Raw(rest.to_vec())
    };
    Ok((status, decoded))
}

pub fn device_status_ntf(payload: &[u8]) -> Decoding {
    let state = PayloadReader::new(payload).u8()?;
    Ok((UciStatus::Ok, Decoded::DeviceState(DeviceState::from_u8(state))))
}

/// CORE_GENERIC_ERROR_NTF: the error code is the status.
pub fn generic_error_ntf(payload: &[u8]) -> Decoding {
    let status = status_at_start(&mut PayloadReader::new(payload))?;
    Ok((status, Decoded::None))
}

pub fn device_info_rsp(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    if !status.is_ok() {
        return Ok((status, Decoded::None));
    }
    let mut version = || -> Result<String, FrameError> {
        let [major, minor] = r.array::<2>()?;
        Ok(format!("{major}.{minor}"))
    };
    let uci_version = version()?;
    let mac_version = version()?;
    let phy_version = version()?;
    let test_version = version()?;
    let vendor = if payload.len() > 10 {
        payload[10..].to_vec()
    } else {
        Vec::new()
    };
    Ok((
        status,
        Decoded::DeviceInfo(DeviceInfo {
            uci_version,
            mac_version,
            phy_version,
            test_version,
            vendor,
        }),
    ))
}

pub fn caps_info_rsp(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    if !status.is_ok() {
        return Ok((status, Decoded::ConfigTlvs(Vec::new())));
    }
    config_tlvs(status, &mut r)
}

/// Status, count, then `count` TLVs with single-byte tags.
pub fn get_config_rsp(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    config_tlvs(status, &mut r)
}

fn config_tlvs(status: UciStatus, r: &mut PayloadReader<'_>) -> Decoding {
    let count = r.u8()? as usize;
    let tlvs = decode_tlvs(r.rest(), count, false)?;
    Ok((status, Decoded::ConfigTlvs(tlvs)))
}

/// SET_CONFIG and SET_APP_CONFIG responses list the rejected parameters.
pub fn set_config_rsp(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    let mut failed = Vec::new();
    if !status.is_ok() {
        let count = r.u8()?;
        for _ in 0..count {
            let id = r.u8()?;
            let status = UciStatus::from_u8(r.u8()?);
            failed.push(ConfigStatus { id, status });
        }
    }
    Ok((status, Decoded::ConfigStatus(failed)))
}

pub fn session_status_ntf(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let session_id = r.u32_le()?;
    let state = SessionState::from_u8(r.u8()?);
    let reason = ReasonCode::from_u8(r.u8()?);
    Ok((
        UciStatus::Ok,
        Decoded::SessionStatus(SessionStatus {
            session_id,
            state,
            reason,
        }),
    ))
}

pub fn session_count_rsp(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    Ok((status, Decoded::SessionCount(r.u8()?)))
}

pub fn session_state_rsp(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    Ok((status, Decoded::SessionState(SessionState::from_u8(r.u8()?))))
}

/// Record layout follows the payload length: 7-byte records carry the
/// short address, 5-byte records do not. Any other length yields no records.
pub fn multicast_list_ntf(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let session_id = r.u32_le()?;
    let remaining = r.u8()?;
    let count = r.u8()? as usize;

    let with_address = payload.len() == 6 + count * 7;
    let without_address = payload.len() == 6 + count * 5;
    let mut records = Vec::with_capacity(count);
    if with_address || without_address {
        for _ in 0..count {
            let short_address = if with_address { Some(r.u16_le()?) } else { None };
            let sub_session_id = r.u32_le()?;
            let status = MulticastStatus::from_u8(r.u8()?);
            records.push(MulticastRecord {
                short_address,
                sub_session_id,
                status,
            });
        }
    } else {
        tracing::debug!(len = payload.len(), count, "multicast record layout not recognized");
    }

    Ok((
        UciStatus::Ok,
        Decoded::Multicast(MulticastUpdate {
            session_id,
            remaining,
            records,
        }),
    ))
}

pub fn ran_multiplier_rsp(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    Ok((status, Decoded::RanMultiplier(r.u8()?)))
}

pub fn ranging_count_rsp(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    Ok((status, Decoded::RangingCount(r.u32_le()?)))
}

/// The serial number is eight ASCII characters sent in swapped pairs.
pub fn serial_number_rsp(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    let raw = r.array::<8>()?;
    let serial: String = [6, 7, 4, 5, 2, 3, 0, 1]
        .iter()
        .map(|&i| char::from(raw[i]).to_ascii_lowercase())
        .collect();
    Ok((status, Decoded::SerialNumber(serial)))
}

/// On failure the device echoes the rejected license text.
pub fn license_check_rsp(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let status = status_at_start(&mut r)?;
    let license = if status.is_ok() {
        String::new()
    } else {
        String::from_utf8_lossy(r.rest()).into_owned()
    };
    Ok((status, Decoded::License(license)))
}

pub fn ccc_data_set_rsp(payload: &[u8]) -> Decoding {
    let status = status_at_start(&mut PayloadReader::new(payload))?;
    Ok((status, Decoded::None))
}

pub fn ccc_data_ntf(payload: &[u8]) -> Decoding {
    let mut r = PayloadReader::new(payload);
    let session_id = r.u32_le()?;
    let length = r.u8()?;
    let data = r.rest().to_vec();
    Ok((
        UciStatus::Ok,
        Decoded::CccData(CccData {
            session_id,
            length,
            data,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_status_splits_trailing_bytes() {
        assert_eq!(common_status(&[0x00]).unwrap(), (UciStatus::Ok, Decoded::None));
        assert_eq!(
            common_status(&[0x02, 0xAA, 0xBB]).unwrap(),
            (UciStatus::Failed, Decoded::Raw(vec![0xAA, 0xBB]))
        );
        assert!(common_status(&[]).is_err());
    }

    #[test]
    fn device_info_versions_and_vendor_bytes() {
        let payload = [0x00, 1, 1, 1, 3, 1, 2, 1, 0, 2, 0xCA, 0xFE];
        let (status, decoded) = device_info_rsp(&payload).unwrap();
        assert!(status.is_ok());
        assert_eq!(
            decoded,
            Decoded::DeviceInfo(DeviceInfo {
                uci_version: "1.1".into(),
                mac_version: "1.3".into(),
                phy_version: "1.2".into(),
                test_version: "1.0".into(),
                vendor: vec![0xCA, 0xFE],
            })
        );
    }

    #[test]
    fn device_info_error_carries_status_only() {
        let (status, decoded) = device_info_rsp(&[0x01]).unwrap();
        assert_eq!(status, UciStatus::Rejected);
        assert_eq!(decoded, Decoded::None);
    }

    #[test]
    fn caps_info_reads_tlvs() {
        let payload = [0x00, 0x02, 0xA3, 0x01, 0x09, 0xE5, 0x01, 0x05];
        let (_, decoded) = caps_info_rsp(&payload).unwrap();
        assert_eq!(
            decoded,
            Decoded::ConfigTlvs(vec![
                UciConfigTlv::from_u8(0xA3, 0x09),
                UciConfigTlv::from_u8(0xE5, 0x05),
            ])
        );
    }

    #[test]
    fn set_config_lists_rejected_params() {
        let ok = set_config_rsp(&[0x00, 0x00]).unwrap();
        assert_eq!(ok, (UciStatus::Ok, Decoded::ConfigStatus(Vec::new())));

        let (status, decoded) = set_config_rsp(&[0x04, 0x02, 0x04, 0x05, 0x1B, 0x04]).unwrap();
        assert_eq!(status, UciStatus::InvalidParam);
        assert_eq!(
            decoded,
            Decoded::ConfigStatus(vec![
                ConfigStatus { id: 0x04, status: UciStatus::InvalidRange },
                ConfigStatus { id: 0x1B, status: UciStatus::InvalidParam },
            ])
        );
    }

    #[test]
    fn session_status_triple() {
        let (status, decoded) =
            session_status_ntf(&[0x78, 0x56, 0x34, 0x12, 0x02, 0x00]).unwrap();
        assert!(status.is_ok());
        assert_eq!(
            decoded,
            Decoded::SessionStatus(SessionStatus {
                session_id: 0x12345678,
                state: SessionState::Active,
                reason: ReasonCode::StateChangeWithSessionManagementCommand,
            })
        );
    }

    #[test]
    fn session_status_too_short() {
        assert!(matches!(
            session_status_ntf(&[0x01, 0x00, 0x00, 0x00, 0x02]),
            Err(FrameError::PayloadTruncated { offset: 5, .. })
        ));
    }

    #[test]
    fn multicast_records_follow_payload_length() {
        let mut seven = vec![0x01, 0x00, 0x00, 0x00, 0x05, 0x01];
        seven.extend_from_slice(&[0x34, 0x12, 0x02, 0x00, 0x00, 0x00, 0x00]);
        let (_, decoded) = multicast_list_ntf(&seven).unwrap();
        let Decoded::Multicast(update) = decoded else {
            panic!("expected multicast update");
        };
        assert_eq!(update.remaining, 5);
        assert_eq!(
            update.records,
            vec![MulticastRecord {
                short_address: Some(0x1234),
                sub_session_id: 2,
                status: MulticastStatus::Ok,
            }]
        );

        let mut five = vec![0x01, 0x00, 0x00, 0x00, 0x04, 0x01];
        five.extend_from_slice(&[0x09, 0x00, 0x00, 0x00, 0x03]);
        let (_, decoded) = multicast_list_ntf(&five).unwrap();
        let Decoded::Multicast(update) = decoded else {
            panic!("expected multicast update");
        };
        assert_eq!(update.records[0].short_address, None);
        assert_eq!(update.records[0].sub_session_id, 9);
        assert_eq!(update.records[0].status, MulticastStatus::SubSessionIdNotFound);
    }

    #[test]
    fn serial_number_unswaps_pairs() {
        let payload = [0x00, b'G', b'H', b'E', b'F', b'C', b'D', b'A', b'B'];
        let (_, decoded) = serial_number_rsp(&payload).unwrap();
        assert_eq!(decoded, Decoded::SerialNumber("abcdefgh".into()));
    }

    #[test]
    fn license_failure_echoes_text() {
        let (status, decoded) = license_check_rsp(&[0xA2, b'b', b'a', b'd']).unwrap();
        assert_eq!(status, UciStatus::LicenseVerifyFailed);
        assert_eq!(decoded, Decoded::License("bad".into()));
        let (_, decoded) = license_check_rsp(&[0x00]).unwrap();
        assert_eq!(decoded, Decoded::License(String::new()));
    }

    #[test]
    fn ranging_count_is_u32() {
        let (_, decoded) = ranging_count_rsp(&[0x00, 0x10, 0x27, 0x00, 0x00]).unwrap();
        assert_eq!(decoded, Decoded::RangingCount(10_000));
    }

    #[test]
    fn ccc_data_ntf_keeps_broadcast_bytes() {
        let (_, decoded) = ccc_data_ntf(&[0x01, 0x00, 0x00, 0x00, 0x02, 0xAB, 0xCD]).unwrap();
        assert_eq!(
            decoded,
            Decoded::CccData(CccData {
                session_id: 1,
                length: 2,
                data: vec![0xAB, 0xCD],
            })
        );
    }

    #[test]
    fn decoded_serializes_with_kind_tag() {
        let json = serde_json::to_value(Decoded::SessionCount(3)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "session_count", "value": 3}));
        let json =
            serde_json::to_value(Decoded::ConfigTlvs(vec![UciConfigTlv::from_u8(0x04, 9)])).unwrap();
        assert_eq!(json["value"][0]["name"], "CHANNEL_NUMBER");
    }
}
