//! Group identifiers and opcode tables.
//!
//! A UCI operation is selected by a 4-bit group id and a 6-bit opcode.
//! Opcodes are only meaningful within their group, so they live in one
//! module per group.

use std::fmt;

/// UCI group identifier (GID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupId {
    /// Core device management.
    Core,
    /// Session configuration and lifecycle.
    Session,
    /// Ranging control and ranging data.
    Range,
    /// Data transfer.
    Data,
    /// Proprietary vendor group (license, serial number, CCC data).
    ProprietaryVendor,
    /// RF test group.
    RfTest,
    /// NXP vendor group.
    NxpVendor,
    /// Any group id without a dedicated variant.
    Other(u8),
}

impl GroupId {
    /// Build a group id from the low four bits of `value`.
    pub fn from_u8(value: u8) -> Self {
        match value & 0x0F {
            0x00 => Self::Core,
            0x01 => Self::Session,
            0x02 => Self::Range,
            0x09 => Self::Data,
            0x0A => Self::ProprietaryVendor,
            0x0D => Self::RfTest,
            0x0E => Self::NxpVendor,
            other => Self::Other(other),
        }
    }

    /// The 4-bit wire value.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Core => 0x00,
            Self::Session => 0x01,
            Self::Range => 0x02,
            Self::Data => 0x09,
            Self::ProprietaryVendor => 0x0A,
            Self::RfTest => 0x0D,
            Self::NxpVendor => 0x0E,
            Self::Other(value) => value & 0x0F,
        }
    }

    /// Human-readable group name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Core => "CORE",
            Self::Session => "SESSION",
            Self::Range => "RANGE",
            Self::Data => "DATA",
            Self::ProprietaryVendor => "VENDOR",
            Self::RfTest => "RF_TEST",
            Self::NxpVendor => "NXP_VENDOR",
            Self::Other(_) => "RFU",
        }
    }
}

impl From<u8> for GroupId {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}

impl From<GroupId> for u8 {
    fn from(gid: GroupId) -> Self {
        gid.as_u8()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:X})", self.name(), self.as_u8())
    }
}

/// Core group opcodes.
pub mod core {
    pub const DEVICE_RESET: u8 = 0x00;
    pub const DEVICE_STATUS: u8 = 0x01;
    pub const DEVICE_INFO: u8 = 0x02;
    pub const GET_CAPS_INFO: u8 = 0x03;
    pub const SET_CONFIG: u8 = 0x04;
    pub const GET_CONFIG: u8 = 0x05;
    pub const DEVICE_SUSPEND: u8 = 0x06;
    pub const GENERIC_ERROR: u8 = 0x07;
}

/// Session group opcodes.
pub mod session {
    pub const INIT: u8 = 0x00;
    pub const DEINIT: u8 = 0x01;
    pub const STATUS: u8 = 0x02;
    pub const SET_APP_CONFIG: u8 = 0x03;
    pub const GET_APP_CONFIG: u8 = 0x04;
    pub const GET_COUNT: u8 = 0x05;
    pub const GET_STATE: u8 = 0x06;
    pub const UPDATE_CONTROLLER_MULTICAST_LIST: u8 = 0x07;
    pub const GET_POSSIBLE_RAN_MULTIPLIER: u8 = 0x20;
}

/// Range group opcodes.
pub mod range {
    /// RANGE_START command; also the opcode of the FiRa RANGE_DATA notification.
    pub const START: u8 = 0x00;
    pub const DATA: u8 = 0x00;
    pub const STOP: u8 = 0x01;
    pub const CTRL_REQ: u8 = 0x02;
    pub const GET_RANGING_COUNT: u8 = 0x03;
    pub const BLINK_DATA_TX: u8 = 0x04;
    pub const CCC_DATA: u8 = 0x20;
    pub const RESUME: u8 = 0x21;
    pub const CCC_DATA_EXP: u8 = 0x23;
}

/// Proprietary vendor group opcodes.
pub mod vendor {
    pub const CCC_DATA_SET: u8 = 0x20;
    pub const GET_SERIAL_NUMBER: u8 = 0x30;
    pub const LICENSE_CHECK: u8 = 0x31;
}

/// NXP vendor group opcodes.
pub mod nxp {
    pub const SET_TRIM_VALUES: u8 = 0x26;
}

/// RF test group opcodes.
pub mod rf_test {
    pub const CONFIG_SET: u8 = 0x00;
    pub const CONFIG_GET: u8 = 0x01;
    pub const PERIODIC_TX: u8 = 0x02;
    pub const PER_RX: u8 = 0x03;
    pub const RX: u8 = 0x05;
    pub const LOOPBACK: u8 = 0x06;
    pub const STOP_SESSION: u8 = 0x07;
    pub const SS_TWR: u8 = 0x08;
}
