//! Protocol value types carried by session notifications and responses.

use std::fmt;

use serde::Serialize;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value without a dedicated variant.
            Other(u8),
        }

        impl $name {
            pub fn from_u8(value: u8) -> Self {
                match value {
                    $($value => Self::$variant,)+
                    other => Self::Other(other),
                }
            }

            pub fn as_u8(self) -> u8 {
                match self {
                    $(Self::$variant => $value,)+
                    Self::Other(value) => value,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(_) => "RFU",
                }
            }
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                Self::from_u8(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    Self::Other(value) => write!(f, "RFU(0x{value:02X})"),
                    known => f.write_str(known.name()),
                }
            }
        }
    };
}

wire_enum! {
    /// Lifecycle state reported by SESSION_STATUS_NTF.
    SessionState {
        Init = 0x00 => "INIT",
        Deinit = 0x01 => "DEINIT",
        Active = 0x02 => "ACTIVE",
        Idle = 0x03 => "IDLE",
        Unknown = 0xFF => "UNKNOWN",
    }
}

wire_enum! {
    /// Why a session changed state.
    ReasonCode {
        StateChangeWithSessionManagementCommand = 0x00 => "STATE_CHANGE_WITH_SESSION_MANAGEMENT_CMD",
        MaxRangingRoundRetryCountReached = 0x01 => "MAX_RANGING_ROUND_RETRY_COUNT_REACHED",
        MaxNumberOfMeasurementsReached = 0x02 => "MAX_NUMBER_OF_MEASUREMENTS_REACHED",
        UrskExpired = 0x03 => "ERR_URSK_EXPIRED",
        TerminationOnMaxSts = 0x04 => "ERR_TERMINATION_ON_MAX_STS",
        SlotLengthNotSupported = 0x20 => "ERR_SLOT_LENGTH_NOT_SUPPORTED",
        InsufficientSlotsPerRr = 0x21 => "ERR_INSUFFICIENT_SLOTS_PER_RR",
        MacAddressModeNotSupported = 0x22 => "ERR_MAC_ADDRESS_MODE_NOT_SUPPORTED",
        InvalidRangingInterval = 0x23 => "ERR_INVALID_RANGING_INTERVAL",
        InvalidStsConfig = 0x24 => "ERR_INVALID_STS_CONFIG",
        InvalidRframeConfig = 0x25 => "ERR_INVALID_RFRAME_CONFIG",
    }
}

wire_enum! {
    /// Device state reported by CORE_DEVICE_STATUS_NTF.
    DeviceState {
        Rfu = 0x00 => "DEVICE_STATE_RFU",
        Ready = 0x01 => "DEVICE_STATE_READY",
        Active = 0x02 => "DEVICE_STATE_ACTIVE",
        Error = 0xFF => "DEVICE_STATE_ERROR",
    }
}

wire_enum! {
    /// Session type sent with SESSION_INIT.
    SessionType {
        FiraRanging = 0x00 => "FIRA_RANGING",
        CccRanging = 0xA0 => "CCC_RANGING",
        DeviceTest = 0xD0 => "DEVICE_TEST",
    }
}

wire_enum! {
    /// Per-controlee status in a multicast list update notification.
    MulticastStatus {
        Ok = 0x00 => "OK_MULTICAST_LIST_UPDATE",
        ListFull = 0x01 => "ERROR_MULTICAST_LIST_FULL",
        KeyFetchFail = 0x02 => "ERROR_KEY_FETCH_FAIL",
        SubSessionIdNotFound = 0x03 => "ERROR_SUB_SESSION_ID_NOT_FOUND",
    }
}

wire_enum! {
    /// Ranging status nibble of a CCC range data notification.
    CccRangeStatus {
        Success = 0x00 => "RANGING_SUCCESS",
        TransactionOverflow = 0x01 => "RANGING_TRANSACTION_OVERFLOW",
        TransactionExpired = 0x02 => "RANGING_TRANSACTION_EXPIRED",
        IncorrectFrame = 0x03 => "RANGING_INCORRECT_FRAME",
        ResponderListenMode = 0x0D => "RANGING_RESPONDER_LISTEN_MODE",
        ControlMessageLost = 0x0F => "RANGING_CONTROL_MSG_LOST",
    }
}

/// DEVICE_TYPE values.
pub mod device_type {
    pub const CONTROLEE: u8 = 0;
    pub const CONTROLLER: u8 = 1;
    /// CCC only.
    pub const DL_TAG: u8 = 2;
}

/// DEVICE_ROLE values.
pub mod device_role {
    pub const RESPONDER: u8 = 0;
    pub const INITIATOR: u8 = 1;
}

/// Last known status of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub session_id: u32,
    pub state: SessionState,
    pub reason: ReasonCode,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session 0x{:08X} {} ({})",
            self.session_id, self.state, self.reason
        )
    }
}
