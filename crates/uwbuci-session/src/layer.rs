//! The UCI command set over one device port.

use std::time::Duration;

use bytes::{BufMut, BytesMut};
use tracing::{debug, error, warn};
use uwbuci_frame::gid::{core, nxp, range, session, vendor};
use uwbuci_frame::{encode_tlvs, GroupId, UciConfigTlv, UciMessage};
use uwbuci_transport::{PortConfig, TransportError, UciDevice, UciPort};

use crate::dispatch::{DispatchResult, DispatchTable};
use crate::error::Result;
use crate::types::SessionType;

/// Length of a vendor license string.
pub const LICENSE_LEN: usize = 128;

/// One controlee entry of a multicast list update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controlee {
    pub short_address: u16,
    pub sub_session_id: u32,
}

/// Action byte of SESSION_UPDATE_CONTROLLER_MULTICAST_LIST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulticastAction {
    Add,
    Delete,
}

impl MulticastAction {
    fn as_u8(self) -> u8 {
        match self {
            Self::Add => 0x00,
            Self::Delete => 0x01,
        }
    }
}

/// Command layer bound to one device.
///
/// Owns the port and the dispatch tables. Commands are sent one at a time;
/// each `send_command` returns only after the bytes are clocked out, and the
/// caller collects the response with [`UciLayer::wait_response`].
#[derive(Debug)]
pub struct UciLayer<D> {
    port: UciPort<D>,
    table: DispatchTable,
}

impl<D: UciDevice> UciLayer<D> {
    /// Layer with the default dispatch tables.
    pub fn new(device: D, config: PortConfig) -> Self {
        Self::with_table(UciPort::new(device, config), DispatchTable::new())
    }

    pub fn with_table(port: UciPort<D>, table: DispatchTable) -> Self {
        Self { port, table }
    }

    pub fn open(&mut self) -> Result<()> {
        Ok(self.port.open()?)
    }

    pub fn close(&mut self) -> Result<()> {
        Ok(self.port.close()?)
    }

    pub fn hard_reset(&mut self) -> Result<()> {
        Ok(self.port.hard_reset()?)
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut DispatchTable {
        &mut self.table
    }

    pub fn port(&self) -> &UciPort<D> {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut UciPort<D> {
        &mut self.port
    }

    pub fn into_port(self) -> UciPort<D> {
        self.port
    }

    /// Encode and transmit one command.
    ///
    /// If the device was holding a frame when the command was issued, that
    /// frame is drained first and returned here already dispatched.
    pub fn send_command(
        &mut self,
        gid: GroupId,
        oid: u8,
        payload: &[u8],
    ) -> Result<Option<DispatchResult>> {
        let packet = UciMessage::command(gid, oid, payload.to_vec()).to_bytes(false)?;
        let timeout = self.port.config().send_timeout;
        debug!(%gid, oid, len = payload.len(), "sending command");
        let outcome = self.port.send(&packet, timeout)?;
        Ok(outcome.pending.map(|frame| {
            let result = self.table.dispatch_frame(&frame.bytes);
            warn!(%result, "received pending message before command");
            result
        }))
    }

    /// Block for the next response or notification frame.
    ///
    /// Transport failures are logged and folded into a FAILED result.
    pub fn wait_response(&mut self, timeout: Duration, crc_enabled: bool) -> DispatchResult {
        match self.port.receive(timeout, crc_enabled) {
            Ok(frame) => {
                if frame.crc_valid() == Some(false) {
                    warn!(crc = ?frame.crc, "received frame failed CRC check");
                }
                self.table.dispatch_frame(&frame.bytes)
            }
            Err(err) => {
                match &err {
                    TransportError::HandshakeTimeout { .. } => {
                        debug!(error = %err, "no frame before timeout")
                    }
                    _ => error!(error = %err, "receive failed"),
                }
                DispatchResult::failed()
            }
        }
    }

    /// [`UciLayer::wait_response`] using the port's CRC setting.
    pub fn wait(&mut self, timeout: Duration) -> DispatchResult {
        let crc_enabled = self.port.config().crc_enabled;
        self.wait_response(timeout, crc_enabled)
    }

    // Core group

    pub fn device_reset(&mut self) -> Result<Option<DispatchResult>> {
        self.send_command(GroupId::Core, core::DEVICE_RESET, &[0x00])
    }

    pub fn get_device_info(&mut self) -> Result<Option<DispatchResult>> {
        self.send_command(GroupId::Core, core::DEVICE_INFO, &[])
    }

    pub fn get_caps_info(&mut self) -> Result<Option<DispatchResult>> {
        self.send_command(GroupId::Core, core::GET_CAPS_INFO, &[])
    }

    pub fn set_config(&mut self, tlvs: &[UciConfigTlv]) -> Result<Option<DispatchResult>> {
        let payload = counted_tlvs(&[], tlvs)?;
        self.send_command(GroupId::Core, core::SET_CONFIG, &payload)
    }

    pub fn get_config(&mut self, ids: &[u8]) -> Result<Option<DispatchResult>> {
        let payload = counted_ids(&[], ids)?;
        self.send_command(GroupId::Core, core::GET_CONFIG, &payload)
    }

    // Session group

    pub fn session_init(
        &mut self,
        session_id: u32,
        session_type: SessionType,
    ) -> Result<Option<DispatchResult>> {
        let mut payload = BytesMut::with_capacity(5);
        payload.put_u32_le(session_id);
        payload.put_u8(session_type.as_u8());
        self.send_command(GroupId::Session, session::INIT, &payload)
    }

    pub fn session_deinit(&mut self, session_id: u32) -> Result<Option<DispatchResult>> {
        self.send_command(GroupId::Session, session::DEINIT, &session_id.to_le_bytes())
    }

    pub fn session_set_app_config(
        &mut self,
        session_id: u32,
        tlvs: &[UciConfigTlv],
    ) -> Result<Option<DispatchResult>> {
        let payload = counted_tlvs(&session_id.to_le_bytes(), tlvs)?;
        self.send_command(GroupId::Session, session::SET_APP_CONFIG, &payload)
    }

    pub fn session_get_app_config(
        &mut self,
        session_id: u32,
        ids: &[u8],
    ) -> Result<Option<DispatchResult>> {
        let payload = counted_ids(&session_id.to_le_bytes(), ids)?;
        self.send_command(GroupId::Session, session::GET_APP_CONFIG, &payload)
    }

    pub fn session_get_count(&mut self) -> Result<Option<DispatchResult>> {
        self.send_command(GroupId::Session, session::GET_COUNT, &[])
    }

    pub fn session_get_state(&mut self, session_id: u32) -> Result<Option<DispatchResult>> {
        self.send_command(GroupId::Session, session::GET_STATE, &session_id.to_le_bytes())
    }

    pub fn session_update_multicast_list(
        &mut self,
        session_id: u32,
        action: MulticastAction,
        controlees: &[Controlee],
    ) -> Result<Option<DispatchResult>> {
        let count = u8::try_from(controlees.len()).map_err(|_| {
            TransportError::BadParameter(format!("{} controlees exceed 255", controlees.len()))
        })?;
        let mut payload = BytesMut::with_capacity(6 + controlees.len() * 6);
        payload.put_u32_le(session_id);
        payload.put_u8(action.as_u8());
        payload.put_u8(count);
        for controlee in controlees {
            payload.put_u16_le(controlee.short_address);
            payload.put_u32_le(controlee.sub_session_id);
        }
        self.send_command(
            GroupId::Session,
            session::UPDATE_CONTROLLER_MULTICAST_LIST,
            &payload,
        )
    }

    pub fn session_get_possible_ran_multiplier(
        &mut self,
        session_id: u32,
    ) -> Result<Option<DispatchResult>> {
        self.send_command(
            GroupId::Session,
            session::GET_POSSIBLE_RAN_MULTIPLIER,
            &session_id.to_le_bytes(),
        )
    }

    // Range group

    pub fn range_start(&mut self, session_id: u32) -> Result<Option<DispatchResult>> {
        self.send_command(GroupId::Range, range::START, &session_id.to_le_bytes())
    }

    pub fn range_stop(&mut self, session_id: u32) -> Result<Option<DispatchResult>> {
        self.send_command(GroupId::Range, range::STOP, &session_id.to_le_bytes())
    }

    pub fn range_get_ranging_count(&mut self, session_id: u32) -> Result<Option<DispatchResult>> {
        self.send_command(
            GroupId::Range,
            range::GET_RANGING_COUNT,
            &session_id.to_le_bytes(),
        )
    }

    pub fn range_resume(
        &mut self,
        session_id: u32,
        sts_index: u32,
    ) -> Result<Option<DispatchResult>> {
        let mut payload = BytesMut::with_capacity(8);
        payload.put_u32_le(session_id);
        payload.put_u32_le(sts_index);
        self.send_command(GroupId::Range, range::RESUME, &payload)
    }

    // Vendor groups

    pub fn get_serial_number(&mut self) -> Result<Option<DispatchResult>> {
        self.send_command(GroupId::ProprietaryVendor, vendor::GET_SERIAL_NUMBER, &[])
    }

    /// Submit a license string. It must be exactly [`LICENSE_LEN`] ASCII bytes.
    pub fn verify_license(&mut self, license: &str) -> Result<Option<DispatchResult>> {
        if license.len() != LICENSE_LEN || !license.is_ascii() {
            return Err(TransportError::BadParameter(format!(
                "license must be {LICENSE_LEN} ASCII bytes, got {}",
                license.len()
            ))
            .into());
        }
        self.send_command(
            GroupId::ProprietaryVendor,
            vendor::LICENSE_CHECK,
            license.as_bytes(),
        )
    }

    pub fn ccc_data_set(
        &mut self,
        session_id: u32,
        repeat: u8,
        data: &[u8],
    ) -> Result<Option<DispatchResult>> {
        let len = u8::try_from(data.len()).map_err(|_| {
            TransportError::BadParameter(format!("CCC data length {} exceeds 255", data.len()))
        })?;
        let mut payload = BytesMut::with_capacity(6 + data.len());
        payload.put_u32_le(session_id);
        payload.put_u8(repeat);
        payload.put_u8(len);
        payload.put_slice(data);
        self.send_command(GroupId::ProprietaryVendor, vendor::CCC_DATA_SET, &payload)
    }

    /// Reset the calibration trim values to factory state.
    pub fn nxp_reset_trim(&mut self) -> Result<Option<DispatchResult>> {
        self.send_command(GroupId::NxpVendor, nxp::SET_TRIM_VALUES, &[0x01, 0x04, 0x00])
    }

    /// Send an arbitrary command.
    pub fn user_defined(
        &mut self,
        gid: GroupId,
        oid: u8,
        payload: &[u8],
    ) -> Result<Option<DispatchResult>> {
        self.send_command(gid, oid, payload)
    }
}

fn counted_tlvs(prefix: &[u8], tlvs: &[UciConfigTlv]) -> Result<BytesMut> {
    let count = u8::try_from(tlvs.len())
        .map_err(|_| TransportError::BadParameter(format!("{} TLVs exceed 255", tlvs.len())))?;
    let mut payload = BytesMut::with_capacity(prefix.len() + 1);
    payload.put_slice(prefix);
    payload.put_u8(count);
    encode_tlvs(tlvs, &mut payload)?;
    Ok(payload)
}

fn counted_ids(prefix: &[u8], ids: &[u8]) -> Result<BytesMut> {
    let count = u8::try_from(ids.len())
        .map_err(|_| TransportError::BadParameter(format!("{} ids exceed 255", ids.len())))?;
    let mut payload = BytesMut::with_capacity(prefix.len() + 1 + ids.len());
    payload.put_slice(prefix);
    payload.put_u8(count);
    payload.put_slice(ids);
    Ok(payload)
}
