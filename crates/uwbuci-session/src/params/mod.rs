//! Session configuration for the FiRa and CCC profiles.
//!
//! Each profile declares an ordered field table. A field maps one struct
//! member to one app-config tag and a byte encoding. Building the
//! SET_APP_CONFIG list is a two-pass walk over that table:
//!
//! 1. emit every field whose value differs from the profile's reference
//!    instance, in declaration order
//! 2. append each mandatory field not already emitted
//!
//! The reference instance is always freshly built, so repeated calls
//! produce the same list regardless of what was sent before.

mod ccc;
mod fira;

use serde::{Deserialize, Serialize};
use uwbuci_frame::UciConfigTlv;

pub use ccc::{CccSessionParams, CCC_SLOTS_PER_RR};
pub use fira::FiraSessionParams;

use crate::error::ParamError;
use crate::types::{device_role, device_type, SessionType};

/// One entry of a profile's field table.
pub struct ParamField<P> {
    pub name: &'static str,
    pub tag: u16,
    differs: fn(&P, &P) -> bool,
    encode: fn(&P) -> Vec<u8>,
}

impl<P> ParamField<P> {
    pub fn differs(&self, current: &P, reference: &P) -> bool {
        (self.differs)(current, reference)
    }

    pub fn tlv(&self, params: &P) -> UciConfigTlv {
        UciConfigTlv::new(self.tag, (self.encode)(params))
    }
}

impl<P> std::fmt::Debug for ParamField<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamField")
            .field("name", &self.name)
            .field("tag", &format_args!("0x{:02X}", self.tag))
            .finish()
    }
}

/// A field that is always sent, when `applies` holds.
pub struct MandatoryField<P> {
    pub tag: u16,
    pub applies: fn(&P) -> bool,
}

/// Builds a field table. Each entry is `member => TAG, encoder;`.
macro_rules! field_table {
    ($params:ty { $($member:ident => $tag:expr, $encode:expr;)+ }) => {
        &[$(
            $crate::params::ParamField::<$params> {
                name: stringify!($member),
                tag: $tag,
                differs: |a: &$params, b: &$params| a.$member != b.$member,
                encode: |p: &$params| $encode(&p.$member),
            },
        )+]
    };
}
pub(crate) use field_table;

pub(crate) fn always<P>(_: &P) -> bool {
    true
}

/// Diff pass: fields of `current` that differ from `reference`.
pub fn diff_tlvs<P>(current: &P, reference: &P, fields: &[ParamField<P>]) -> Vec<UciConfigTlv> {
    fields
        .iter()
        .filter(|field| field.differs(current, reference))
        .map(|field| field.tlv(current))
        .collect()
}

/// Append pass: mandatory fields missing from `tlvs`, in the given order.
pub fn append_mandatory<P>(
    tlvs: &mut Vec<UciConfigTlv>,
    params: &P,
    fields: &[ParamField<P>],
    mandatory: &[MandatoryField<P>],
) {
    for entry in mandatory {
        if !(entry.applies)(params) || tlvs.iter().any(|tlv| tlv.tag == entry.tag) {
            continue;
        }
        if let Some(field) = fields.iter().find(|field| field.tag == entry.tag) {
            tlvs.push(field.tlv(params));
        }
    }
}

pub(crate) fn is_responder<P: HasRole>(params: &P) -> bool {
    params.device_role() == device_role::RESPONDER
}

pub(crate) trait HasRole {
    fn device_role(&self) -> u8;
}

/// Map `dbm` in -12..=14 to a TX_POWER_ID.
pub(crate) fn tx_power_id(dbm: i8) -> Result<u8, ParamError> {
    if !(-12..=14).contains(&dbm) {
        return Err(ParamError::OutOfRange {
            name: "tx_power",
            value: i64::from(dbm),
            allowed: "-12..=14 dBm",
        });
    }
    Ok(((14 - i16::from(dbm)) * 4) as u8)
}

// Encoders

pub(crate) fn enc_u8(v: &u8) -> Vec<u8> {
    vec![*v]
}

pub(crate) fn enc_u16(v: &u16) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

pub(crate) fn enc_u32(v: &u32) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

pub(crate) fn enc_bytes<const N: usize>(v: &[u8; N]) -> Vec<u8> {
    v.to_vec()
}

/// Key fields carry a zero key-index byte ahead of the key.
pub(crate) fn enc_key<const N: usize>(v: &[u8; N]) -> Vec<u8> {
    let mut out = Vec::with_capacity(N + 1);
    out.push(0);
    out.extend_from_slice(v);
    out
}

pub(crate) fn enc_u16_list(v: &[u16]) -> Vec<u8> {
    v.iter().flat_map(|addr| addr.to_le_bytes()).collect()
}

/// Parameters of one session, either profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "profile", rename_all = "snake_case")]
pub enum SessionParams {
    Fira(FiraSessionParams),
    Ccc(CccSessionParams),
}

impl SessionParams {
    pub fn session_id(&self) -> u32 {
        match self {
            Self::Fira(p) => p.session_id,
            Self::Ccc(p) => p.session_id,
        }
    }

    pub fn session_type(&self) -> SessionType {
        match self {
            Self::Fira(_) => SessionType::FiraRanging,
            Self::Ccc(_) => SessionType::CccRanging,
        }
    }

    pub fn device_type(&self) -> u8 {
        match self {
            Self::Fira(p) => p.device_type,
            Self::Ccc(p) => p.device_type,
        }
    }

    pub fn is_controller(&self) -> bool {
        self.device_type() == device_type::CONTROLLER
    }

    /// The SET_APP_CONFIG list for this session.
    pub fn app_config_tlvs(&self) -> Result<Vec<UciConfigTlv>, ParamError> {
        match self {
            Self::Fira(p) => p.app_config_tlvs(),
            Self::Ccc(p) => Ok(p.app_config_tlvs()),
        }
    }
}

impl From<FiraSessionParams> for SessionParams {
    fn from(params: FiraSessionParams) -> Self {
        Self::Fira(params)
    }
}

impl From<CccSessionParams> for SessionParams {
    fn from(params: CccSessionParams) -> Self {
        Self::Ccc(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Probe {
        a: u8,
        b: u16,
        key: [u8; 2],
        role: u8,
    }

    impl HasRole for Probe {
        fn device_role(&self) -> u8 {
            self.role
        }
    }

    const FIELDS: &[ParamField<Probe>] = field_table!(Probe {
        a => 0x01, enc_u8;
        b => 0x02, enc_u16;
        key => 0xE8, enc_key;
        role => 0x11, enc_u8;
    });

    const MANDATORY: &[MandatoryField<Probe>] = &[
        MandatoryField { tag: 0x02, applies: always },
        MandatoryField { tag: 0x01, applies: is_responder },
    ];

    fn reference() -> Probe {
        Probe {
            a: 1,
            b: 2,
            key: [0xAA, 0xBB],
            role: device_role::INITIATOR,
        }
    }

    #[test]
    fn diff_emits_only_changed_fields_in_declaration_order() {
        let mut current = reference();
        current.key = [1, 2];
        current.a = 7;
        let tlvs = diff_tlvs(&current, &reference(), FIELDS);
        assert_eq!(
            tlvs,
            vec![
                UciConfigTlv::from_u8(0x01, 7),
                UciConfigTlv::new(0xE8, vec![0x00, 1, 2]),
            ]
        );
    }

    #[test]
    fn mandatory_fields_are_appended_once() {
        let mut current = reference();
        current.b = 0x1234;
        let mut tlvs = diff_tlvs(&current, &reference(), FIELDS);
        append_mandatory(&mut tlvs, &current, FIELDS, MANDATORY);
        assert_eq!(tlvs, vec![UciConfigTlv::from_u16(0x02, 0x1234)]);
    }

    #[test]
    fn conditional_mandatory_field_follows_role() {
        let mut current = reference();
        current.role = device_role::RESPONDER;
        let mut tlvs = diff_tlvs(&current, &reference(), FIELDS);
        append_mandatory(&mut tlvs, &current, FIELDS, MANDATORY);
        let tags: Vec<u16> = tlvs.iter().map(|t| t.tag).collect();
        assert_eq!(tags, vec![0x11, 0x02, 0x01]);
    }

    #[test]
    fn tx_power_mapping() {
        assert_eq!(tx_power_id(14).unwrap(), 0);
        assert_eq!(tx_power_id(-12).unwrap(), 104);
        assert_eq!(tx_power_id(0).unwrap(), 56);
        assert!(matches!(
            tx_power_id(15),
            Err(ParamError::OutOfRange { name: "tx_power", value: 15, .. })
        ));
    }

    #[test]
    fn u16_list_is_concatenated_little_endian() {
        assert_eq!(enc_u16_list(&[0x1234, 0xABCD]), vec![0x34, 0x12, 0xCD, 0xAB]);
        assert!(enc_u16_list(&[]).is_empty());
    }
}
