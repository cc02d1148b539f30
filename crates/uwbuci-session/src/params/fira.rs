use serde::{Deserialize, Serialize};
use uwbuci_frame::tags::app;
use uwbuci_frame::UciConfigTlv;

use super::{
    always, append_mandatory, diff_tlvs, enc_bytes, enc_key, enc_u16, enc_u16_list, enc_u32,
    enc_u8, field_table, is_responder, tx_power_id, HasRole, MandatoryField, ParamField,
};
use crate::error::ParamError;
use crate::types::{device_role, device_type};

/// Short address the reference instance carries. Any real session must
/// override it.
const UNSET_MAC_ADDR: u16 = 0xFFFF;

/// FiRa ranging session parameters.
///
/// Deserializing fills absent members from [`FiraSessionParams::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiraSessionParams {
    pub session_id: u32,
    pub device_type: u8,
    pub ranging_round_usage: u8,
    pub sts_config: u8,
    pub channel_id: u8,
    pub anchor_num: u8,
    pub multi_node_mode: u8,
    pub device_mac_addr: u16,
    /// Peer short addresses. Controllers list every controlee.
    pub dst_mac_addr: Vec<u16>,
    pub ranging_slot_length: u16,
    pub ranging_interval: u32,
    pub sts_index0: u32,
    pub mac_fcs_type: u8,
    pub ranging_round_control: u8,
    pub aoa_result_req: u8,
    pub rng_data_ntf: u8,
    pub proximity_near: u16,
    pub proximity_far: u16,
    pub device_role: u8,
    pub rframe_config: u8,
    pub preamble_id: u8,
    pub sfd_id: u8,
    pub psdu_data_rate: u8,
    pub preamble_duration: u8,
    pub ranging_time_struct: u8,
    pub slots_per_rr: u8,
    pub adaptive_payload_power: u8,
    /// 1..=8.
    pub responder_slot_index: u8,
    pub prf_mode: u8,
    pub scheduled_mode: u8,
    pub key_rotation: u8,
    pub key_rotation_rate: u8,
    pub session_priority: u8,
    pub mac_address_mode: u8,
    pub vendor_id: u16,
    pub static_sts_iv: [u8; 6],
    pub number_of_sts_segments: u8,
    pub max_rr_retry: u16,
    pub uwb_initiation_time: u32,
    pub hopping_mode: u8,
    pub block_stride_length: u8,
    pub result_report_config: u8,
    pub in_band_termination_attempt_count: u8,
    pub sub_session_id: u32,
    pub bprf_phr_data_rate: u8,
    pub max_num_of_measurements: u16,
    pub sts_length: u8,
    pub rx_start_margin: u8,
    pub rx_timeout: u16,
    pub adapted_ranging_index: u16,
    pub nbic_conf: u8,
    pub groupdelay_recalc_enable: u8,
    /// Dynamic STS only.
    pub session_key: [u8; 16],
    pub rcm_rx_margin_time: u16,
    pub rcm_rx_timeout: u16,
    pub dynamic_priority_in_synch: u8,
    pub tx_power_temp_compensation: u8,
    pub long_src_address: [u8; 8],
    pub rr_retry_threshold: u16,
    pub tx_power_id: u8,
    pub rx_phy_logging_enable: u8,
    pub tx_phy_logging_enable: u8,
    pub log_params_conf: u32,
    pub cir_tap_offset: u16,
    pub cir_num_taps: u16,
    pub sts_index_restart: u8,
    pub vendor_specific_oui: [u8; 3],
}

const FIELDS: &[ParamField<FiraSessionParams>] = field_table!(FiraSessionParams {
    device_type => app::DEVICE_TYPE, enc_u8;
    ranging_round_usage => app::RANGING_ROUND_USAGE, enc_u8;
    sts_config => app::STS_CONFIG, enc_u8;
    channel_id => app::CHANNEL_NUMBER, enc_u8;
    anchor_num => app::NO_OF_CONTROLEE, enc_u8;
    multi_node_mode => app::MULTI_NODE_MODE, enc_u8;
    device_mac_addr => app::DEVICE_MAC_ADDRESS, enc_u16;
    dst_mac_addr => app::DST_MAC_ADDRESS, enc_u16_list;
    ranging_slot_length => app::SLOT_DURATION, enc_u16;
    ranging_interval => app::RANGING_INTERVAL, enc_u32;
    sts_index0 => app::STS_INDEX, enc_u32;
    mac_fcs_type => app::MAC_FCS_TYPE, enc_u8;
    ranging_round_control => app::RANGING_ROUND_CONTROL, enc_u8;
    aoa_result_req => app::AOA_RESULT_REQ, enc_u8;
    rng_data_ntf => app::RNG_DATA_NTF, enc_u8;
    proximity_near => app::RNG_DATA_NTF_PROXIMITY_NEAR, enc_u16;
    proximity_far => app::RNG_DATA_NTF_PROXIMITY_FAR, enc_u16;
    device_role => app::DEVICE_ROLE, enc_u8;
    rframe_config => app::RFRAME_CONFIG, enc_u8;
    preamble_id => app::PREAMBLE_CODE_INDEX, enc_u8;
    sfd_id => app::SFD_ID, enc_u8;
    psdu_data_rate => app::PSDU_DATA_RATE, enc_u8;
    preamble_duration => app::PREAMBLE_DURATION, enc_u8;
    ranging_time_struct => app::RANGING_TIME_STRUCT, enc_u8;
    slots_per_rr => app::SLOTS_PER_RR, enc_u8;
    adaptive_payload_power => app::TX_ADAPTIVE_PAYLOAD_POWER, enc_u8;
    responder_slot_index => app::RESPONDER_SLOT_INDEX, enc_u8;
    prf_mode => app::PRF_MODE, enc_u8;
    scheduled_mode => app::SCHEDULED_MODE, enc_u8;
    key_rotation => app::KEY_ROTATION, enc_u8;
    key_rotation_rate => app::KEY_ROTATION_RATE, enc_u8;
    session_priority => app::SESSION_PRIORITY, enc_u8;
    mac_address_mode => app::MAC_ADDRESS_MODE, enc_u8;
    vendor_id => app::VENDOR_ID, enc_u16;
    static_sts_iv => app::STATIC_STS_IV, enc_bytes;
    number_of_sts_segments => app::NUMBER_OF_STS_SEGMENTS, enc_u8;
    max_rr_retry => app::MAX_RR_RETRY, enc_u16;
    uwb_initiation_time => app::UWB_INITIATION_TIME, enc_u32;
    hopping_mode => app::RANGING_ROUND_HOPPING, enc_u8;
    block_stride_length => app::BLOCK_STRIDE_LENGTH, enc_u8;
    result_report_config => app::RESULT_REPORT_CONFIG, enc_u8;
    in_band_termination_attempt_count => app::IN_BAND_TERMINATION_ATTEMPT_COUNT, enc_u8;
    sub_session_id => app::SUB_SESSION_ID, enc_u32;
    bprf_phr_data_rate => app::BPRF_PHR_DATA_RATE, enc_u8;
    max_num_of_measurements => app::MAX_NUM_OF_MEASUREMENTS, enc_u16;
    sts_length => app::STS_LENGTH, enc_u8;
    rx_start_margin => app::RX_START_MARGIN, enc_u8;
    rx_timeout => app::RX_TIMEOUT, enc_u16;
    adapted_ranging_index => app::ADAPTED_RANGING_INDEX, enc_u16;
    nbic_conf => app::NBIC_CONF, enc_u8;
    groupdelay_recalc_enable => app::GROUPDELAY_RECALC_ENABLE, enc_u8;
    session_key => app::SECURE_SESSION_KEY, enc_key;
    rcm_rx_margin_time => app::RCM_RX_MARGIN_TIME, enc_u16;
    rcm_rx_timeout => app::RCM_RX_TIMEOUT, enc_u16;
    dynamic_priority_in_synch => app::DYNAMIC_PRIORITY_IN_SYNCH, enc_u8;
    tx_power_temp_compensation => app::TX_POWER_TEMP_COMPENSATION, enc_u8;
    long_src_address => app::LONG_SRC_ADDRESS, enc_bytes;
    rr_retry_threshold => app::RR_RETRY_THRESHOLD, enc_u16;
    tx_power_id => app::TX_POWER_ID, enc_u8;
    rx_phy_logging_enable => app::RX_PHY_LOGGING_ENABLE, enc_u8;
    tx_phy_logging_enable => app::TX_PHY_LOGGING_ENABLE, enc_u8;
    log_params_conf => app::LOG_PARAMS_CONF, enc_u32;
    cir_tap_offset => app::CIR_TAP_OFFSET, enc_u16;
    cir_num_taps => app::CIR_NUM_TAPS, enc_u16;
    sts_index_restart => app::STS_INDEX_RESTART, enc_u8;
    vendor_specific_oui => app::VENDOR_SPECIFIC_OUI, enc_bytes;
});

const MANDATORY: &[MandatoryField<FiraSessionParams>] = &[
    MandatoryField { tag: app::DEVICE_TYPE, applies: always },
    MandatoryField { tag: app::RANGING_ROUND_USAGE, applies: always },
    MandatoryField { tag: app::CHANNEL_NUMBER, applies: always },
    MandatoryField { tag: app::MULTI_NODE_MODE, applies: always },
    MandatoryField { tag: app::NO_OF_CONTROLEE, applies: always },
    MandatoryField { tag: app::SLOT_DURATION, applies: always },
    MandatoryField { tag: app::RANGING_INTERVAL, applies: always },
    MandatoryField { tag: app::DEVICE_ROLE, applies: always },
    MandatoryField { tag: app::TX_POWER_ID, applies: always },
    MandatoryField { tag: app::PREAMBLE_CODE_INDEX, applies: always },
    MandatoryField { tag: app::SFD_ID, applies: always },
    MandatoryField { tag: app::RESPONDER_SLOT_INDEX, applies: is_responder },
    MandatoryField { tag: app::SLOTS_PER_RR, applies: always },
];

/// Members that must differ from the reference before anything is sent.
const REQUIRED: [(&str, u16); 2] = [
    ("device_mac_addr", app::DEVICE_MAC_ADDRESS),
    ("dst_mac_addr", app::DST_MAC_ADDRESS),
];

impl Default for FiraSessionParams {
    fn default() -> Self {
        Self::new(
            0,
            device_type::CONTROLLER,
            device_role::INITIATOR,
            UNSET_MAC_ADDR,
        )
    }
}

impl HasRole for FiraSessionParams {
    fn device_role(&self) -> u8 {
        self.device_role
    }
}

impl FiraSessionParams {
    pub fn new(session_id: u32, device_type: u8, device_role: u8, device_mac_addr: u16) -> Self {
        Self {
            session_id,
            device_type,
            ranging_round_usage: 2,
            sts_config: 0,
            channel_id: 9,
            anchor_num: 1,
            multi_node_mode: 1,
            device_mac_addr,
            dst_mac_addr: Vec::new(),
            ranging_slot_length: 2400,
            ranging_interval: 200,
            sts_index0: 0,
            mac_fcs_type: 0,
            ranging_round_control: 0x03,
            aoa_result_req: 0,
            rng_data_ntf: 1,
            proximity_near: 0,
            proximity_far: 20000,
            device_role,
            rframe_config: 3,
            preamble_id: 10,
            sfd_id: 2,
            psdu_data_rate: 0,
            preamble_duration: 1,
            ranging_time_struct: 1,
            slots_per_rr: 25,
            adaptive_payload_power: 0,
            responder_slot_index: 1,
            prf_mode: 0,
            scheduled_mode: 1,
            key_rotation: 0,
            key_rotation_rate: 0,
            session_priority: 50,
            mac_address_mode: 0,
            vendor_id: 0,
            static_sts_iv: [0; 6],
            number_of_sts_segments: 1,
            max_rr_retry: 0,
            uwb_initiation_time: 0xFFFF_FFFF,
            hopping_mode: 0,
            block_stride_length: 0,
            result_report_config: 0b0000_0001,
            in_band_termination_attempt_count: 1,
            sub_session_id: 0,
            bprf_phr_data_rate: 0,
            max_num_of_measurements: 0,
            sts_length: 1,
            rx_start_margin: 0x64,
            rx_timeout: 100,
            adapted_ranging_index: 0xFFFF,
            nbic_conf: 0,
            groupdelay_recalc_enable: 0,
            session_key: [0; 16],
            rcm_rx_margin_time: 2000,
            rcm_rx_timeout: 1000,
            dynamic_priority_in_synch: 1,
            tx_power_temp_compensation: 0,
            long_src_address: [0; 8],
            rr_retry_threshold: 10,
            tx_power_id: 1,
            rx_phy_logging_enable: 0,
            tx_phy_logging_enable: 0,
            log_params_conf: 0,
            cir_tap_offset: 0x302,
            cir_num_taps: 0x64,
            sts_index_restart: 0,
            vendor_specific_oui: [0xFF, 0x18, 0x5A],
        }
    }

    pub fn fields() -> &'static [ParamField<Self>] {
        FIELDS
    }

    /// Diff against the default instance, then append the mandatory set.
    ///
    /// Fails if the device or destination addresses were never set.
    pub fn app_config_tlvs(&self) -> Result<Vec<UciConfigTlv>, ParamError> {
        let mut tlvs = diff_tlvs(self, &Self::default(), FIELDS);
        for (name, tag) in REQUIRED {
            if !tlvs.iter().any(|tlv| tlv.tag == tag) {
                return Err(ParamError::MissingRequired { name, tag });
            }
        }
        append_mandatory(&mut tlvs, self, FIELDS, MANDATORY);
        Ok(tlvs)
    }

    pub fn set_dst_addresses(&mut self, addresses: impl Into<Vec<u16>>) {
        self.dst_mac_addr = addresses.into();
    }

    pub fn set_device_mac_addr(&mut self, addr: u16) {
        self.device_mac_addr = addr;
    }

    /// Set TX power in dBm (-12..=14).
    pub fn set_tx_power(&mut self, dbm: i8) -> Result<(), ParamError> {
        self.tx_power_id = tx_power_id(dbm)?;
        Ok(())
    }

    pub fn set_responder_slot_index(&mut self, index: u8) -> Result<(), ParamError> {
        if !(1..=8).contains(&index) {
            return Err(ParamError::OutOfRange {
                name: "responder_slot_index",
                value: i64::from(index),
                allowed: "1..=8",
            });
        }
        self.responder_slot_index = index;
        Ok(())
    }

    pub fn set_slots_per_rr(&mut self, slots_per_rr: u8) {
        self.slots_per_rr = slots_per_rr;
    }

    pub fn set_slot_length(&mut self, rstu: u16) {
        self.ranging_slot_length = rstu;
    }

    pub fn set_rx_phy_logging(&mut self, enable: bool) {
        self.rx_phy_logging_enable = u8::from(enable);
    }

    pub fn set_tx_phy_logging(&mut self, enable: bool) {
        self.tx_phy_logging_enable = u8::from(enable);
    }
}
