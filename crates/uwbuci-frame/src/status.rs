//! UCI status codes reported by the device.
//!
//! Status codes are data, not errors: they travel inside decoded results and
//! callers decide what to do with them.

use std::fmt;

macro_rules! uci_status {
    ($($variant:ident = $value:literal => $name:literal,)+) => {
        /// Status byte carried by responses and some notifications.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum UciStatus {
            $($variant,)+
            /// A status value without a dedicated variant.
            Other(u8),
        }

        impl UciStatus {
            /// Map a raw status byte.
            pub fn from_u8(value: u8) -> Self {
                match value {
                    $($value => Self::$variant,)+
                    other => Self::Other(other),
                }
            }

            /// The raw status byte.
            pub fn as_u8(self) -> u8 {
                match self {
                    $(Self::$variant => $value,)+
                    Self::Other(value) => value,
                }
            }

            /// Protocol name of the status.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                    Self::Other(_) => "UCI_STATUS_RFU",
                }
            }
        }
    };
}

uci_status! {
    Ok = 0x00 => "UCI_STATUS_OK",
    Rejected = 0x01 => "UCI_STATUS_REJECTED",
    Failed = 0x02 => "UCI_STATUS_FAILED",
    SyntaxError = 0x03 => "UCI_STATUS_SYNTAX_ERROR",
    InvalidParam = 0x04 => "UCI_STATUS_INVALID_PARAM",
    InvalidRange = 0x05 => "UCI_STATUS_INVALID_RANGE",
    InvalidMessageSize = 0x06 => "UCI_STATUS_INVALID_MESSAGE_SIZE",
    UnknownGid = 0x07 => "UCI_STATUS_UNKNOWN_GID",
    UnknownOid = 0x08 => "UCI_STATUS_UNKNOWN_OID",
    ReadOnly = 0x09 => "UCI_STATUS_READ_ONLY",
    CommandRetry = 0x0A => "UCI_STATUS_COMMAND_RETRY",
    Unknown = 0x0B => "UCI_STATUS_UNKNOWN",
    NotApplicable = 0x0C => "UCI_STATUS_NOT_APPLICABLE",
    SessionNotExist = 0x11 => "UCI_STATUS_SESSION_NOT_EXIST",
    SessionDuplicate = 0x12 => "UCI_STATUS_SESSION_DUPLICATE",
    SessionActive = 0x13 => "UCI_STATUS_SESSION_ACTIVE",
    MaxSessionsExceeded = 0x14 => "UCI_STATUS_MAX_SESSIONS_EXCEEDED",
    SessionNotConfigured = 0x15 => "UCI_STATUS_SESSION_NOT_CONFIGURED",
    ActiveSessionsOngoing = 0x16 => "UCI_STATUS_ACTIVE_SESSIONS_ONGOING",
    MulticastListFull = 0x17 => "UCI_STATUS_MULTICAST_LIST_FULL",
    AddressNotFound = 0x18 => "UCI_STATUS_ADDRESS_NOT_FOUND",
    AddressAlreadyPresent = 0x19 => "UCI_STATUS_ADDRESS_ALREADY_PRESENT",
    InitiationTimeTooOld = 0x1A => "UCI_STATUS_UWB_INITIATION_TIME_TOO_OLD",
    OkNegativeDistanceReport = 0x1B => "UCI_STATUS_OK_NEGATIVE_DISTANCE_REPORT",
    InvalidStsIndex = 0x1C => "UCI_STATUS_INVALID_STS_IDX",
    RangingTxFailed = 0x20 => "UCI_STATUS_RANGING_TX_FAILED",
    RangingRxTimeout = 0x21 => "UCI_STATUS_RANGING_RX_TIMEOUT",
    RangingRxPhyDecFailed = 0x22 => "UCI_STATUS_RANGING_RX_PHY_DEC_FAILED",
    RangingRxPhyToaFailed = 0x23 => "UCI_STATUS_RANGING_RX_PHY_TOA_FAILED",
    RangingRxPhyStsFailed = 0x24 => "UCI_STATUS_RANGING_RX_PHY_STS_FAILED",
    RangingRxMacDecFailed = 0x25 => "UCI_STATUS_RANGING_RX_MAC_DEC_FAILED",
    RangingRxMacIeDecFailed = 0x26 => "UCI_STATUS_RANGING_RX_MAC_IE_DEC_FAILED",
    RangingRxMacIeMissing = 0x27 => "UCI_STATUS_RANGING_RX_MAC_IE_MISSING",
    VerificationFailed = 0x7D => "UCI_STATUS_VERIFICATION_FAILED",
    Reboot = 0x80 => "UCI_STATUS_REBOOT",
    RebootWatchdog = 0x81 => "UCI_STATUS_REBOOT_WDT",
    InvalidResponderSlot = 0xA0 => "UCI_STATUS_INVALID_RESPONDER_SLOT",
    LicenseNeeded = 0xA1 => "UCI_STATUS_LICENSE_NEEDED",
    LicenseVerifyFailed = 0xA2 => "UCI_STATUS_LICENSE_VERIFY_FAILED",
    InvalidPublicKey = 0xA3 => "UCI_STATUS_INVALID_PUBLIC_KEY",
    SerialNumberTooLong = 0xA4 => "UCI_STATUS_SN_TOO_LONG",
    ConsistencyCheckFailed = 0xE1 => "UCI_STATUS_CONSISTENCY_CHECK_FAILED",
    CrcError = 0xF8 => "UCI_STATUS_CRC_ERROR",
    NotImplemented = 0xFE => "UCI_STATUS_NOT_IMPLEMENTED",
    Undefined = 0xFF => "UCI_STATUS_UNDEFINED",
}

impl UciStatus {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl From<u8> for UciStatus {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}

impl fmt::Display for UciStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), self.as_u8())
    }
}
