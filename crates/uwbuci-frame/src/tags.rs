//! TLV tag identifiers.

/// Device configuration ids for CORE_SET_CONFIG / CORE_GET_CONFIG.
pub mod device {
    pub const DEVICE_STATE: u16 = 0x00;
    pub const LOW_POWER_MODE: u16 = 0x01;
}

/// Capability ids reported by CORE_GET_CAPS_INFO.
pub mod caps {
    pub const SLOT_BITMASK: u16 = 0xA0;
    pub const SYNC_CODE_INDEX_BITMASK: u16 = 0xA1;
    pub const HOPPING_CONFIG_BITMASK: u16 = 0xA2;
    pub const CHANNEL_BITMASK: u16 = 0xA3;
    pub const SUPPORTED_PROTOCOL_VERSION: u16 = 0xA4;
    pub const SUPPORTED_UWB_CONFIG_ID: u16 = 0xA5;
    pub const SUPPORTED_PULSE_SHAPE_COMBO: u16 = 0xA6;
    pub const MAX_PAYLOAD_LEN: u16 = 0xE3;
    pub const MIN_SLOT_LEN: u16 = 0xE4;
    pub const MAX_SESSION_NUM: u16 = 0xE5;
    pub const MAX_ANCHOR_NUM: u16 = 0xE6;
    pub const MIN_UWB_FREQ: u16 = 0xE7;
    pub const MAX_UWB_FREQ: u16 = 0xE8;
    pub const SUPPORT_ROLE_PROTOCOL: u16 = 0xE9;
}

/// Session application configuration ids for SESSION_SET_APP_CONFIG.
pub mod app {
    pub const DEVICE_TYPE: u16 = 0x00;
    pub const RANGING_ROUND_USAGE: u16 = 0x01;
    pub const STS_CONFIG: u16 = 0x02;
    pub const MULTI_NODE_MODE: u16 = 0x03;
    pub const CHANNEL_NUMBER: u16 = 0x04;
    pub const NO_OF_CONTROLEE: u16 = 0x05;
    pub const DEVICE_MAC_ADDRESS: u16 = 0x06;
    pub const DST_MAC_ADDRESS: u16 = 0x07;
    pub const SLOT_DURATION: u16 = 0x08;
    pub const RANGING_INTERVAL: u16 = 0x09;
    pub const STS_INDEX: u16 = 0x0A;
    pub const MAC_FCS_TYPE: u16 = 0x0B;
    pub const RANGING_ROUND_CONTROL: u16 = 0x0C;
    pub const AOA_RESULT_REQ: u16 = 0x0D;
    pub const RNG_DATA_NTF: u16 = 0x0E;
    pub const RNG_DATA_NTF_PROXIMITY_NEAR: u16 = 0x0F;
    pub const RNG_DATA_NTF_PROXIMITY_FAR: u16 = 0x10;
    pub const DEVICE_ROLE: u16 = 0x11;
    pub const RFRAME_CONFIG: u16 = 0x12;
    pub const RX_MODE: u16 = 0x13;
    pub const PREAMBLE_CODE_INDEX: u16 = 0x14;
    pub const SFD_ID: u16 = 0x15;
    pub const PSDU_DATA_RATE: u16 = 0x16;
    pub const PREAMBLE_DURATION: u16 = 0x17;
    pub const ANTENNA_PAIR_SELECTION: u16 = 0x18;
    pub const MAC_CFG: u16 = 0x19;
    pub const RANGING_TIME_STRUCT: u16 = 0x1A;
    pub const SLOTS_PER_RR: u16 = 0x1B;
    pub const TX_ADAPTIVE_PAYLOAD_POWER: u16 = 0x1C;
    pub const TX_ANTENNA_SELECTION: u16 = 0x1D;
    pub const RESPONDER_SLOT_INDEX: u16 = 0x1E;
    pub const PRF_MODE: u16 = 0x1F;
    pub const MAX_CONTENTION_PHASE_LEN: u16 = 0x20;
    pub const CONTENTION_PHASE_UPDATE_LEN: u16 = 0x21;
    pub const SCHEDULED_MODE: u16 = 0x22;
    pub const KEY_ROTATION: u16 = 0x23;
    pub const KEY_ROTATION_RATE: u16 = 0x24;
    pub const SESSION_PRIORITY: u16 = 0x25;
    pub const MAC_ADDRESS_MODE: u16 = 0x26;
    pub const VENDOR_ID: u16 = 0x27;
    pub const STATIC_STS_IV: u16 = 0x28;
    pub const NUMBER_OF_STS_SEGMENTS: u16 = 0x29;
    pub const MAX_RR_RETRY: u16 = 0x2A;
    pub const UWB_INITIATION_TIME: u16 = 0x2B;
    pub const RANGING_ROUND_HOPPING: u16 = 0x2C;
    pub const BLOCK_STRIDE_LENGTH: u16 = 0x2D;
    pub const RESULT_REPORT_CONFIG: u16 = 0x2E;
    pub const IN_BAND_TERMINATION_ATTEMPT_COUNT: u16 = 0x2F;
    pub const SUB_SESSION_ID: u16 = 0x30;
    pub const BPRF_PHR_DATA_RATE: u16 = 0x31;
    pub const MAX_NUM_OF_MEASUREMENTS: u16 = 0x32;
    pub const STS_LENGTH: u16 = 0x35;
    pub const SUSPEND_RANGING_ROUNDS: u16 = 0x36;
    pub const SESSION_KEY: u16 = 0x45;
    pub const SUB_SESSION_KEY: u16 = 0x46;

    // CCC
    pub const HOP_MODE_KEY: u16 = 0xA0;
    pub const CCC_CONFIG_QUIRKS: u16 = 0xA1;
    pub const RANGING_PROTOCOL_VER: u16 = 0xA3;
    pub const UWB_CONFIG_ID: u16 = 0xA4;
    pub const PULSE_SHAPE_COMBO: u16 = 0xA5;
    pub const URSK_TTL: u16 = 0xA6;
    pub const RESPONDER_LISTEN_ONLY: u16 = 0xA7;
    pub const LAST_STS_INDEX_USED: u16 = 0xA8;

    // Proprietary
    pub const RX_START_MARGIN: u16 = 0xE3;
    pub const RX_TIMEOUT: u16 = 0xE4;
    pub const ADAPTED_RANGING_INDEX: u16 = 0xE5;
    pub const NBIC_CONF: u16 = 0xE6;
    pub const GROUPDELAY_RECALC_ENABLE: u16 = 0xE7;
    /// URSK for CCC, secSessionKey for FiRa. Value starts with a key-index byte.
    pub const SECURE_SESSION_KEY: u16 = 0xE8;
    pub const STATIC_KEYS: u16 = 0xE9;
    pub const RCM_RX_MARGIN_TIME: u16 = 0xEA;
    pub const RCM_RX_TIMEOUT: u16 = 0xEB;
    pub const DYNAMIC_PRIORITY_IN_SYNCH: u16 = 0xEC;
    pub const TX_POWER_TEMP_COMPENSATION: u16 = 0xED;
    pub const LONG_SRC_ADDRESS: u16 = 0xEF;
    pub const KDF_CASCADE: u16 = 0xF0;
    pub const RR_RETRY_THRESHOLD: u16 = 0xF1;
    pub const TX_POWER_ID: u16 = 0xF2;
    pub const RX_PHY_LOGGING_ENABLE: u16 = 0xF4;
    pub const TX_PHY_LOGGING_ENABLE: u16 = 0xF5;
    pub const LOG_PARAMS_CONF: u16 = 0xF6;
    pub const CIR_TAP_OFFSET: u16 = 0xF7;
    pub const CIR_NUM_TAPS: u16 = 0xF8;
    pub const STS_INDEX_RESTART: u16 = 0xF9;
    pub const VENDOR_SPECIFIC_OUI: u16 = 0xFA;
    pub const RADIO_CFG_IDXS: u16 = 0xFB;
    pub const CRYPTO_KEY_USAGE_FLAG: u16 = 0xFD;
    pub const SEND_FINAL_ALWAYS: u16 = 0xFE;
}

/// Human-readable name of an application configuration tag.
pub fn app_tag_name(tag: u16) -> &'static str {
    use app::*;
    match tag {
        DEVICE_TYPE => "DEVICE_TYPE",
        RANGING_ROUND_USAGE => "RANGING_ROUND_USAGE",
        STS_CONFIG => "STS_CONFIG",
        MULTI_NODE_MODE => "MULTI_NODE_MODE",
        CHANNEL_NUMBER => "CHANNEL_NUMBER",
        NO_OF_CONTROLEE => "NO_OF_CONTROLEE",
        DEVICE_MAC_ADDRESS => "DEVICE_MAC_ADDRESS",
        DST_MAC_ADDRESS => "DST_MAC_ADDRESS",
        SLOT_DURATION => "SLOT_DURATION",
        RANGING_INTERVAL => "RANGING_INTERVAL",
        STS_INDEX => "STS_INDEX",
        MAC_FCS_TYPE => "MAC_FCS_TYPE",
        RANGING_ROUND_CONTROL => "RANGING_ROUND_CONTROL",
        AOA_RESULT_REQ => "AOA_RESULT_REQ",
        RNG_DATA_NTF => "RNG_DATA_NTF",
        RNG_DATA_NTF_PROXIMITY_NEAR => "RNG_DATA_NTF_PROXIMITY_NEAR",
        RNG_DATA_NTF_PROXIMITY_FAR => "RNG_DATA_NTF_PROXIMITY_FAR",
        DEVICE_ROLE => "DEVICE_ROLE",
        RFRAME_CONFIG => "RFRAME_CONFIG",
        RX_MODE => "RX_MODE",
        PREAMBLE_CODE_INDEX => "PREAMBLE_CODE_INDEX",
        SFD_ID => "SFD_ID",
        PSDU_DATA_RATE => "PSDU_DATA_RATE",
        PREAMBLE_DURATION => "PREAMBLE_DURATION",
        ANTENNA_PAIR_SELECTION => "ANTENNA_PAIR_SELECTION",
        MAC_CFG => "MAC_CFG",
        RANGING_TIME_STRUCT => "RANGING_TIME_STRUCT",
        SLOTS_PER_RR => "SLOTS_PER_RR",
        TX_ADAPTIVE_PAYLOAD_POWER => "TX_ADAPTIVE_PAYLOAD_POWER",
        TX_ANTENNA_SELECTION => "TX_ANTENNA_SELECTION",
        RESPONDER_SLOT_INDEX => "RESPONDER_SLOT_INDEX",
        PRF_MODE => "PRF_MODE",
        MAX_CONTENTION_PHASE_LEN => "MAX_CONTENTION_PHASE_LEN",
        CONTENTION_PHASE_UPDATE_LEN => "CONTENTION_PHASE_UPDATE_LEN",
        SCHEDULED_MODE => "SCHEDULED_MODE",
        KEY_ROTATION => "KEY_ROTATION",
        KEY_ROTATION_RATE => "KEY_ROTATION_RATE",
        SESSION_PRIORITY => "SESSION_PRIORITY",
        MAC_ADDRESS_MODE => "MAC_ADDRESS_MODE",
        VENDOR_ID => "VENDOR_ID",
        STATIC_STS_IV => "STATIC_STS_IV",
        NUMBER_OF_STS_SEGMENTS => "NUMBER_OF_STS_SEGMENTS",
        MAX_RR_RETRY => "MAX_RR_RETRY",
        UWB_INITIATION_TIME => "UWB_INITIATION_TIME",
        RANGING_ROUND_HOPPING => "RANGING_ROUND_HOPPING",
        BLOCK_STRIDE_LENGTH => "BLOCK_STRIDE_LENGTH",
        RESULT_REPORT_CONFIG => "RESULT_REPORT_CONFIG",
        IN_BAND_TERMINATION_ATTEMPT_COUNT => "IN_BAND_TERMINATION_ATTEMPT_COUNT",
        SUB_SESSION_ID => "SUB_SESSION_ID",
        BPRF_PHR_DATA_RATE => "BPRF_PHR_DATA_RATE",
        MAX_NUM_OF_MEASUREMENTS => "MAX_NUM_OF_MEASUREMENTS",
        STS_LENGTH => "STS_LENGTH",
        SUSPEND_RANGING_ROUNDS => "SUSPEND_RANGING_ROUNDS",
        SESSION_KEY => "SESSION_KEY",
        SUB_SESSION_KEY => "SUB_SESSION_KEY",
        HOP_MODE_KEY => "HOP_MODE_KEY",
        CCC_CONFIG_QUIRKS => "CCC_CONFIG_QUIRKS",
        RANGING_PROTOCOL_VER => "RANGING_PROTOCOL_VER",
        UWB_CONFIG_ID => "UWB_CONFIG_ID",
        PULSE_SHAPE_COMBO => "PULSE_SHAPE_COMBO",
        URSK_TTL => "URSK_TTL",
        RESPONDER_LISTEN_ONLY => "RESPONDER_LISTEN_ONLY",
        LAST_STS_INDEX_USED => "LAST_STS_INDEX_USED",
        RX_START_MARGIN => "RX_START_MARGIN",
        RX_TIMEOUT => "RX_TIMEOUT",
        ADAPTED_RANGING_INDEX => "ADAPTED_RANGING_INDEX",
        NBIC_CONF => "NBIC_CONF",
        GROUPDELAY_RECALC_ENABLE => "GROUPDELAY_RECALC_ENABLE",
        SECURE_SESSION_KEY => "SECURE_SESSION_KEY",
        STATIC_KEYS => "STATIC_KEYS",
        RCM_RX_MARGIN_TIME => "RCM_RX_MARGIN_TIME",
        RCM_RX_TIMEOUT => "RCM_RX_TIMEOUT",
        DYNAMIC_PRIORITY_IN_SYNCH => "DYNAMIC_PRIORITY_IN_SYNCH",
        TX_POWER_TEMP_COMPENSATION => "TX_POWER_TEMP_COMPENSATION",
        LONG_SRC_ADDRESS => "LONG_SRC_ADDRESS",
        KDF_CASCADE => "KDF_CASCADE",
        RR_RETRY_THRESHOLD => "RR_RETRY_THRESHOLD",
        TX_POWER_ID => "TX_POWER_ID",
        RX_PHY_LOGGING_ENABLE => "RX_PHY_LOGGING_ENABLE",
        TX_PHY_LOGGING_ENABLE => "TX_PHY_LOGGING_ENABLE",
        LOG_PARAMS_CONF => "LOG_PARAMS_CONF",
        CIR_TAP_OFFSET => "CIR_TAP_OFFSET",
        CIR_NUM_TAPS => "CIR_NUM_TAPS",
        STS_INDEX_RESTART => "STS_INDEX_RESTART",
        VENDOR_SPECIFIC_OUI => "VENDOR_SPECIFIC_OUI",
        RADIO_CFG_IDXS => "RADIO_CFG_IDXS",
        CRYPTO_KEY_USAGE_FLAG => "CRYPTO_KEY_USAGE_FLAG",
        SEND_FINAL_ALWAYS => "SEND_FINAL_ALWAYS",
        _ => "UNKNOWN",
    }
}
