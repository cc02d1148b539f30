use serde::{Deserialize, Serialize};
use uwbuci_frame::tags::app;
use uwbuci_frame::UciConfigTlv;

use super::{
    always, append_mandatory, diff_tlvs, enc_bytes, enc_key, enc_u16, enc_u32, enc_u8,
    field_table, is_responder, tx_power_id, HasRole, MandatoryField, ParamField,
};
use crate::error::ParamError;
use crate::types::{device_role, device_type};

/// Accepted SLOTS_PER_RR values for CCC sessions.
pub const CCC_SLOTS_PER_RR: [u8; 11] = [6, 8, 9, 12, 16, 18, 32, 36, 48, 72, 96];

const DEFAULT_URSK: [u8; 32] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F,
];

/// CCC (Digital Key) ranging session parameters.
///
/// Deserializing fills absent members from [`CccSessionParams::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CccSessionParams {
    pub session_id: u32,
    pub device_type: u8,
    pub sts_config: u8,
    pub channel_id: u8,
    pub anchor_num: u8,
    pub device_mac_addr: u16,
    pub dst_mac_addr: u16,
    /// Slot duration in RSTU.
    pub ranging_slot_length: u16,
    /// Ranging interval in ms.
    pub ranging_interval: u32,
    pub sts_index0: u32,
    pub mac_fcs_type: u8,
    pub rng_data_ntf: u8,
    pub proximity_near: u16,
    pub proximity_far: u16,
    pub device_role: u8,
    pub preamble_id: u8,
    pub sfd_id: u8,
    pub slots_per_rr: u8,
    pub adaptive_payload_power: u8,
    pub responder_slot_index: u8,
    pub key_rotation: u8,
    pub session_priority: u8,
    pub max_rr_retry: u16,
    pub uwb_initiation_time: u32,
    pub hopping_mode: u8,
    pub max_num_of_measurements: u16,
    pub hop_mode_key: [u8; 16],
    pub ccc_config_quirks: u8,
    pub ranging_protocol_ver: u16,
    pub uwb_config_id: u16,
    pub pulse_shape_combo: u8,
    pub ursk_ttl: u16,
    pub responder_listen_only: u8,
    pub ursk: [u8; 32],
    pub last_sts_index_used: u32,
    pub tx_power_id: u8,
    pub rx_start_margin: u8,
    pub rx_timeout: u16,
    pub adapted_ranging_index: u16,
    pub nbic_conf: u8,
    pub groupdelay_recalc_enable: u8,
    pub rcm_rx_margin_time: u16,
    pub rcm_rx_timeout: u16,
    pub dynamic_priority_in_synch: u8,
    pub tx_power_temp_compensation: u8,
    pub long_src_address: [u8; 8],
    pub rr_retry_threshold: u16,
    pub rx_phy_logging_enable: u8,
    pub tx_phy_logging_enable: u8,
    pub log_params_conf: u32,
    pub cir_tap_offset: u16,
    pub cir_num_taps: u16,
    pub sts_index_restart: u8,
    pub vendor_specific_oui: [u8; 3],
    pub ranging_round_usage: u8,
}

const FIELDS: &[ParamField<CccSessionParams>] = field_table!(CccSessionParams {
    device_type => app::DEVICE_TYPE, enc_u8;
    sts_config => app::STS_CONFIG, enc_u8;
    channel_id => app::CHANNEL_NUMBER, enc_u8;
    anchor_num => app::NO_OF_CONTROLEE, enc_u8;
    device_mac_addr => app::DEVICE_MAC_ADDRESS, enc_u16;
    dst_mac_addr => app::DST_MAC_ADDRESS, enc_u16;
    ranging_slot_length => app::SLOT_DURATION, enc_u16;
    ranging_interval => app::RANGING_INTERVAL, enc_u32;
    sts_index0 => app::STS_INDEX, enc_u32;
    mac_fcs_type => app::MAC_FCS_TYPE, enc_u8;
    rng_data_ntf => app::RNG_DATA_NTF, enc_u8;
    proximity_near => app::RNG_DATA_NTF_PROXIMITY_NEAR, enc_u16;
    proximity_far => app::RNG_DATA_NTF_PROXIMITY_FAR, enc_u16;
    device_role => app::DEVICE_ROLE, enc_u8;
    preamble_id => app::PREAMBLE_CODE_INDEX, enc_u8;
    sfd_id => app::SFD_ID, enc_u8;
    slots_per_rr => app::SLOTS_PER_RR, enc_u8;
    adaptive_payload_power => app::TX_ADAPTIVE_PAYLOAD_POWER, enc_u8;
    responder_slot_index => app::RESPONDER_SLOT_INDEX, enc_u8;
    key_rotation => app::KEY_ROTATION, enc_u8;
    session_priority => app::SESSION_PRIORITY, enc_u8;
    max_rr_retry => app::MAX_RR_RETRY, enc_u16;
    uwb_initiation_time => app::UWB_INITIATION_TIME, enc_u32;
    hopping_mode => app::RANGING_ROUND_HOPPING, enc_u8;
    max_num_of_measurements => app::MAX_NUM_OF_MEASUREMENTS, enc_u16;
    hop_mode_key => app::HOP_MODE_KEY, enc_bytes;
    ccc_config_quirks => app::CCC_CONFIG_QUIRKS, enc_u8;
    ranging_protocol_ver => app::RANGING_PROTOCOL_VER, enc_u16;
    uwb_config_id => app::UWB_CONFIG_ID, enc_u16;
    pulse_shape_combo => app::PULSE_SHAPE_COMBO, enc_u8;
    ursk_ttl => app::URSK_TTL, enc_u16;
    responder_listen_only => app::RESPONDER_LISTEN_ONLY, enc_u8;
    ursk => app::SECURE_SESSION_KEY, enc_key;
    last_sts_index_used => app::LAST_STS_INDEX_USED, enc_u32;
    tx_power_id => app::TX_POWER_ID, enc_u8;
    rx_start_margin => app::RX_START_MARGIN, enc_u8;
    rx_timeout => app::RX_TIMEOUT, enc_u16;
    adapted_ranging_index => app::ADAPTED_RANGING_INDEX, enc_u16;
    nbic_conf => app::NBIC_CONF, enc_u8;
    groupdelay_recalc_enable => app::GROUPDELAY_RECALC_ENABLE, enc_u8;
    rcm_rx_margin_time => app::RCM_RX_MARGIN_TIME, enc_u16;
    rcm_rx_timeout => app::RCM_RX_TIMEOUT, enc_u16;
    dynamic_priority_in_synch => app::DYNAMIC_PRIORITY_IN_SYNCH, enc_u8;
    tx_power_temp_compensation => app::TX_POWER_TEMP_COMPENSATION, enc_u8;
    long_src_address => app::LONG_SRC_ADDRESS, enc_bytes;
    rr_retry_threshold => app::RR_RETRY_THRESHOLD, enc_u16;
    rx_phy_logging_enable => app::RX_PHY_LOGGING_ENABLE, enc_u8;
    tx_phy_logging_enable => app::TX_PHY_LOGGING_ENABLE, enc_u8;
    log_params_conf => app::LOG_PARAMS_CONF, enc_u32;
    cir_tap_offset => app::CIR_TAP_OFFSET, enc_u16;
    cir_num_taps => app::CIR_NUM_TAPS, enc_u16;
    sts_index_restart => app::STS_INDEX_RESTART, enc_u8;
    vendor_specific_oui => app::VENDOR_SPECIFIC_OUI, enc_bytes;
    ranging_round_usage => app::RANGING_ROUND_USAGE, enc_u8;
});

const MANDATORY: &[MandatoryField<CccSessionParams>] = &[
    MandatoryField { tag: app::DEVICE_TYPE, applies: always },
    MandatoryField { tag: app::CHANNEL_NUMBER, applies: always },
    MandatoryField { tag: app::NO_OF_CONTROLEE, applies: always },
    MandatoryField { tag: app::SLOT_DURATION, applies: always },
    MandatoryField { tag: app::RANGING_INTERVAL, applies: always },
    MandatoryField { tag: app::DEVICE_ROLE, applies: always },
    MandatoryField { tag: app::TX_POWER_ID, applies: always },
    MandatoryField { tag: app::PREAMBLE_CODE_INDEX, applies: always },
    MandatoryField { tag: app::SFD_ID, applies: always },
    MandatoryField { tag: app::RESPONDER_SLOT_INDEX, applies: is_responder },
    MandatoryField { tag: app::SLOTS_PER_RR, applies: always },
    MandatoryField { tag: app::SECURE_SESSION_KEY, applies: always },
];

impl Default for CccSessionParams {
    /// Controller/initiator with one anchor, session 0.
    fn default() -> Self {
        Self::new(0, device_type::CONTROLLER, device_role::INITIATOR, 1)
    }
}

impl HasRole for CccSessionParams {
    fn device_role(&self) -> u8 {
        self.device_role
    }
}

impl CccSessionParams {
    pub fn new(session_id: u32, device_type: u8, device_role: u8, anchor_num: u8) -> Self {
        Self {
            session_id,
            device_type,
            sts_config: 1,
            channel_id: 9,
            anchor_num,
            device_mac_addr: 0,
            dst_mac_addr: 0,
            ranging_slot_length: 2400,
            ranging_interval: 96,
            sts_index0: 0,
            mac_fcs_type: 0,
            rng_data_ntf: 1,
            proximity_near: 0,
            proximity_far: 20000,
            device_role,
            preamble_id: 9,
            sfd_id: 2,
            slots_per_rr: 12,
            adaptive_payload_power: 0,
            responder_slot_index: 0,
            key_rotation: 1,
            session_priority: 50,
            max_rr_retry: 0,
            uwb_initiation_time: 0xFFFF_FFFF,
            hopping_mode: 0,
            max_num_of_measurements: 0xFFFF,
            hop_mode_key: [0; 16],
            ccc_config_quirks: 0,
            ranging_protocol_ver: 0x0100,
            uwb_config_id: 1,
            pulse_shape_combo: 0,
            ursk_ttl: 0x02D0,
            responder_listen_only: 0,
            ursk: DEFAULT_URSK,
            last_sts_index_used: 0,
            tx_power_id: 1,
            rx_start_margin: 0x64,
            rx_timeout: 100,
            adapted_ranging_index: 0xFFFF,
            nbic_conf: 1,
            groupdelay_recalc_enable: 0,
            rcm_rx_margin_time: 2000,
            rcm_rx_timeout: 1000,
            dynamic_priority_in_synch: 1,
            tx_power_temp_compensation: 0,
            long_src_address: [0; 8],
            rr_retry_threshold: 10,
            rx_phy_logging_enable: 0,
            tx_phy_logging_enable: 0,
            log_params_conf: 0,
            cir_tap_offset: 0x302,
            cir_num_taps: 0x64,
            sts_index_restart: 0,
            vendor_specific_oui: [0x69, 0xDF, 0x04],
            ranging_round_usage: 2,
        }
    }

    /// The field table, in emission order.
    pub fn fields() -> &'static [ParamField<Self>] {
        FIELDS
    }

    /// Diff against the default instance, then append the mandatory set.
    pub fn app_config_tlvs(&self) -> Vec<UciConfigTlv> {
        let mut tlvs = diff_tlvs(self, &Self::default(), FIELDS);
        append_mandatory(&mut tlvs, self, FIELDS, MANDATORY);
        tlvs
    }

    /// Set TX power in dBm (-12..=14).
    pub fn set_tx_power(&mut self, dbm: i8) -> Result<(), ParamError> {
        self.tx_power_id = tx_power_id(dbm)?;
        Ok(())
    }

    pub fn set_slots_per_rr(&mut self, slots_per_rr: u8) -> Result<(), ParamError> {
        if !CCC_SLOTS_PER_RR.contains(&slots_per_rr) {
            return Err(ParamError::OutOfRange {
                name: "slots_per_rr",
                value: i64::from(slots_per_rr),
                allowed: "6, 8, 9, 12, 16, 18, 32, 36, 48, 72, 96",
            });
        }
        self.slots_per_rr = slots_per_rr;
        Ok(())
    }

    /// Slot index of this responder, 0..N-1 for N responders.
    pub fn set_responder_slot_index(&mut self, index: u8) {
        self.responder_slot_index = index;
    }

    pub fn set_slot_length(&mut self, rstu: u16) {
        self.ranging_slot_length = rstu;
    }

    /// Config id 0 uses SFD 0.
    pub fn set_uwb_config_id(&mut self, id: u16) {
        self.uwb_config_id = id;
        if id == 0 {
            self.sfd_id = 0;
        }
    }

    pub fn set_rx_phy_logging(&mut self, enable: bool) {
        self.rx_phy_logging_enable = u8::from(enable);
    }

    pub fn set_tx_phy_logging(&mut self, enable: bool) {
        self.tx_phy_logging_enable = u8::from(enable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(tlvs: &[UciConfigTlv]) -> Vec<u16> {
        tlvs.iter().map(|tlv| tlv.tag).collect()
    }

    #[test]
    fn default_instance_sends_only_mandatory_set() {
        let tlvs = CccSessionParams::default().app_config_tlvs();
        assert_eq!(
            tags(&tlvs),
            vec![
                app::DEVICE_TYPE,
                app::CHANNEL_NUMBER,
                app::NO_OF_CONTROLEE,
                app::SLOT_DURATION,
                app::RANGING_INTERVAL,
                app::DEVICE_ROLE,
                app::TX_POWER_ID,
                app::PREAMBLE_CODE_INDEX,
                app::SFD_ID,
                app::SLOTS_PER_RR,
                app::SECURE_SESSION_KEY,
            ]
        );
        let key = tlvs.last().expect("key TLV should be present");
        assert_eq!(key.len(), 33);
        assert_eq!(key.value[0], 0);
        assert_eq!(&key.value[1..], &DEFAULT_URSK);
    }

    #[test]
    fn responder_adds_slot_index_before_slots_per_rr() {
        let params = CccSessionParams::new(7, device_type::CONTROLEE, device_role::RESPONDER, 1);
        let tlvs = params.app_config_tlvs();
        let tags = tags(&tlvs);
        // device type and role differ from the reference, so they lead
        assert_eq!(&tags[..2], &[app::DEVICE_TYPE, app::DEVICE_ROLE]);
        let slot = tags
            .iter()
            .position(|&t| t == app::RESPONDER_SLOT_INDEX)
            .expect("responder slot index should be sent");
        assert_eq!(tags[slot + 1], app::SLOTS_PER_RR);
    }

    #[test]
    fn changed_members_use_declared_width() {
        let mut params = CccSessionParams::default();
        params.ranging_interval = 192;
        params.vendor_specific_oui = [1, 2, 3];
        params.rx_timeout = 0x0201;
        let tlvs = params.app_config_tlvs();
        assert_eq!(tlvs[0], UciConfigTlv::from_u32(app::RANGING_INTERVAL, 192));
        assert_eq!(tlvs[1], UciConfigTlv::new(app::RX_TIMEOUT, vec![0x01, 0x02]));
        assert_eq!(tlvs[2], UciConfigTlv::new(app::VENDOR_SPECIFIC_OUI, vec![1, 2, 3]));
    }

    #[test]
    fn slots_per_rr_accepts_listed_values_only() {
        let mut params = CccSessionParams::default();
        params.set_slots_per_rr(6).expect("6 is accepted");
        assert_eq!(params.slots_per_rr, 6);
        let err = params.set_slots_per_rr(7).unwrap_err();
        assert!(matches!(err, ParamError::OutOfRange { value: 7, .. }));
        assert_eq!(params.slots_per_rr, 6);
    }

    #[test]
    fn tx_power_and_logging_setters() {
        let mut params = CccSessionParams::default();
        params.set_tx_power(10).expect("10 dBm is in range");
        assert_eq!(params.tx_power_id, 16);
        assert!(params.set_tx_power(-13).is_err());
        params.set_rx_phy_logging(true);
        params.set_tx_phy_logging(false);
        assert_eq!(params.rx_phy_logging_enable, 1);
        assert_eq!(params.tx_phy_logging_enable, 0);
    }

    #[test]
    fn config_id_zero_clears_sfd() {
        let mut params = CccSessionParams::default();
        params.set_uwb_config_id(0);
        assert_eq!(params.sfd_id, 0);
    }

    #[test]
    fn json_fills_missing_members_from_default() {
        let params: CccSessionParams =
            serde_json::from_str(r#"{"session_id": 305419896, "channel_id": 5}"#)
                .expect("partial JSON should parse");
        assert_eq!(params.session_id, 0x12345678);
        assert_eq!(params.channel_id, 5);
        assert_eq!(params.ursk, DEFAULT_URSK);
        assert_eq!(params.slots_per_rr, 12);
    }
}
