//! Response and notification dispatch.
//!
//! A [`DispatchTable`] maps a typed `(GroupId, opcode)` key to a decoder,
//! one map per message type. Tables are plain owned values: each device
//! connection builds its own and may override entries, which is how the
//! CCC and FiRa session flows swap in role-specific ranging decoders.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};
use uwbuci_frame::gid::{core, nxp, range, session, vendor};
use uwbuci_frame::{decode_message, GroupId, MessageType, UciMessage, UciStatus};

use crate::decoders::{self, serialize_status, Decoded, Decoding};
use crate::ranging;

/// Pure payload decoder.
pub type Decoder = fn(&[u8]) -> Decoding;

/// Lookup key of a dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    pub gid: GroupId,
    pub oid: u8,
}

impl DispatchKey {
    pub fn new(gid: GroupId, oid: u8) -> Self {
        Self {
            gid,
            oid: oid & 0x3F,
        }
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/0x{:02X}", self.gid, self.oid)
    }
}

/// Where a message goes.
#[derive(Debug, Clone, Copy)]
pub enum Route {
    Registered(Decoder),
    /// No decoder for this key. Dispatch degrades to NOT_IMPLEMENTED.
    Unregistered,
    /// Neither a response nor a notification.
    UnsupportedType,
}

/// Structured result of one received frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResult {
    #[serde(serialize_with = "serialize_message_type")]
    pub message_type: MessageType,
    #[serde(serialize_with = "serialize_gid")]
    pub gid: GroupId,
    pub oid: u8,
    #[serde(serialize_with = "serialize_status")]
    pub status: UciStatus,
    pub decoded: Decoded,
}

impl DispatchResult {
    /// Result reported when nothing could be received or decoded.
    pub fn failed() -> Self {
        Self {
            message_type: MessageType::Undefined(0),
            gid: GroupId::Core,
            oid: 0,
            status: UciStatus::Failed,
            decoded: Decoded::None,
        }
    }

    pub fn key(&self) -> DispatchKey {
        DispatchKey::new(self.gid, self.oid)
    }

    pub fn is_response(&self) -> bool {
        self.message_type == MessageType::Response
    }

    pub fn is_notification(&self) -> bool {
        self.message_type == MessageType::Notification
    }
}

impl fmt::Display for DispatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.message_type,
            self.key(),
            self.status,
            self.decoded
        )
    }
}

fn serialize_message_type<S: Serializer>(mt: &MessageType, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(mt.name())
}

fn serialize_gid<S: Serializer>(gid: &GroupId, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(gid.name())
}

/// Decoder tables for one device connection.
#[derive(Clone)]
pub struct DispatchTable {
    responses: HashMap<DispatchKey, Decoder>,
    notifications: HashMap<DispatchKey, Decoder>,
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTable {
    /// Tables with no decoders at all.
    pub fn empty() -> Self {
        Self {
            responses: HashMap::new(),
            notifications: HashMap::new(),
        }
    }

    /// Tables pre-populated with the default decoders.
    pub fn new() -> Self {
        let mut table = Self::empty();

        table.register_notification(GroupId::Core, core::DEVICE_STATUS, decoders::device_status_ntf);
        table.register_notification(GroupId::Core, core::GENERIC_ERROR, decoders::generic_error_ntf);
        table.register_notification(GroupId::Session, session::STATUS, decoders::session_status_ntf);
        table.register_notification(
            GroupId::Session,
            session::UPDATE_CONTROLLER_MULTICAST_LIST,
            decoders::multicast_list_ntf,
        );
        table.register_notification(GroupId::Range, range::DATA, ranging::fira_range_ntf);
        table.register_notification(
            GroupId::ProprietaryVendor,
            vendor::CCC_DATA_SET,
            decoders::ccc_data_ntf,
        );

        table.register_response(GroupId::Core, core::DEVICE_RESET, decoders::common_status);
        table.register_response(GroupId::Core, core::DEVICE_INFO, decoders::device_info_rsp);
        table.register_response(GroupId::Core, core::GET_CAPS_INFO, decoders::caps_info_rsp);
        table.register_response(GroupId::Core, core::SET_CONFIG, decoders::set_config_rsp);
        table.register_response(GroupId::Core, core::GET_CONFIG, decoders::get_config_rsp);

        table.register_response(GroupId::Session, session::INIT, decoders::common_status);
        table.register_response(GroupId::Session, session::DEINIT, decoders::common_status);
        table.register_response(GroupId::Session, session::SET_APP_CONFIG, decoders::set_config_rsp);
        table.register_response(GroupId::Session, session::GET_APP_CONFIG, decoders::get_config_rsp);
        table.register_response(GroupId::Session, session::GET_COUNT, decoders::session_count_rsp);
        table.register_response(GroupId::Session, session::GET_STATE, decoders::session_state_rsp);
        table.register_response(
            GroupId::Session,
            session::UPDATE_CONTROLLER_MULTICAST_LIST,
            decoders::common_status,
        );
        table.register_response(
            GroupId::Session,
            session::GET_POSSIBLE_RAN_MULTIPLIER,
            decoders::ran_multiplier_rsp,
        );

        table.register_response(GroupId::Range, range::START, decoders::common_status);
        table.register_response(GroupId::Range, range::STOP, decoders::common_status);
        table.register_response(GroupId::Range, range::GET_RANGING_COUNT, decoders::ranging_count_rsp);
        table.register_response(GroupId::Range, range::RESUME, decoders::common_status);

        table.register_response(
            GroupId::ProprietaryVendor,
            vendor::GET_SERIAL_NUMBER,
            decoders::serial_number_rsp,
        );
        table.register_response(
            GroupId::ProprietaryVendor,
            vendor::LICENSE_CHECK,
            decoders::license_check_rsp,
        );
        table.register_response(
            GroupId::ProprietaryVendor,
            vendor::CCC_DATA_SET,
            decoders::ccc_data_set_rsp,
        );
        table.register_response(GroupId::NxpVendor, nxp::SET_TRIM_VALUES, decoders::common_status);

        table
    }

    /// Register a response decoder, replacing any earlier one for the key.
    pub fn register_response(&mut self, gid: GroupId, oid: u8, decoder: Decoder) {
        self.responses.insert(DispatchKey::new(gid, oid), decoder);
    }

    /// Register a notification decoder, replacing any earlier one for the key.
    pub fn register_notification(&mut self, gid: GroupId, oid: u8, decoder: Decoder) {
        self.notifications.insert(DispatchKey::new(gid, oid), decoder);
    }

    pub fn route(&self, message_type: MessageType, key: DispatchKey) -> Route {
        let table = match message_type {
            MessageType::Response => &self.responses,
            MessageType::Notification => &self.notifications,
            _ => return Route::UnsupportedType,
        };
        table
            .get(&key)
            .copied()
            .map_or(Route::Unregistered, Route::Registered)
    }

    /// Decode a complete frame (header and payload, no CRC) and dispatch it.
    pub fn dispatch_frame(&self, frame: &[u8]) -> DispatchResult {
        match decode_message(frame, false, false) {
            Ok(msg) => self.dispatch(&msg),
            Err(err) => {
                tracing::warn!(error = %err, len = frame.len(), "dropping undecodable frame");
                DispatchResult::failed()
            }
        }
    }

    /// Route a decoded message to its decoder.
    ///
    /// Unknown keys and undecodable payloads become status values, never errors.
    pub fn dispatch(&self, msg: &UciMessage) -> DispatchResult {
        let mut payload = Vec::with_capacity(msg.payload_length());
        if let Some(status) = msg.status {
            payload.push(status.as_u8());
        }
        payload.extend_from_slice(&msg.payload);

        let key = DispatchKey::new(msg.gid, msg.oid);
        let result = |status: UciStatus, decoded: Decoded| DispatchResult {
            message_type: msg.message_type,
            gid: msg.gid,
            oid: key.oid,
            status,
            decoded,
        };

        match self.route(msg.message_type, key) {
            Route::UnsupportedType => {
                tracing::error!(message_type = %msg.message_type, %key, "unsupported message type");
                result(UciStatus::Unknown, Decoded::None)
            }
            Route::Unregistered => {
                tracing::warn!(
                    message_type = %msg.message_type,
                    %key,
                    len = payload.len(),
                    "no decoder registered"
                );
                result(UciStatus::NotImplemented, Decoded::Raw(payload))
            }
            Route::Registered(decoder) => match decoder(&payload) {
                Ok((status, decoded)) => {
                    if status.is_ok() {
                        tracing::debug!(message_type = %msg.message_type, %key, %status, "dispatched");
                    } else {
                        tracing::warn!(message_type = %msg.message_type, %key, %status, "device reported error status");
                    }
                    result(status, decoded)
                }
                Err(err) => {
                    tracing::warn!(%key, error = %err, "payload does not match decoder layout");
                    result(UciStatus::InvalidMessageSize, Decoded::Raw(payload))
                }
            },
        }
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("responses", &self.responses.len())
            .field("notifications", &self.notifications.len())
            .finish()
    }
}
