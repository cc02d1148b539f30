//! Session lifecycle over one device.
//!
//! [`RangingDevice`] owns the command layer and a map of known sessions.
//! Session state is never inferred locally: it changes only when a
//! SESSION_STATUS notification for a known session is observed, whether
//! that notification arrives as an awaited reply, as a frame drained
//! before a send, or during the ranging loop.
//!
//! The device is single-threaded. It may be moved to another thread but
//! must not be shared without external synchronization.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};
use uwbuci_frame::gid::range;
use uwbuci_frame::{GroupId, UciConfigTlv};
use uwbuci_transport::{PortConfig, UciDevice};

use crate::cancel::CancelToken;
use crate::decoders::Decoded;
use crate::dispatch::DispatchResult;
use crate::error::{Result, SessionError};
use crate::layer::UciLayer;
use crate::params::SessionParams;
use crate::ranging;
use crate::types::{SessionState, SessionStatus, SessionType};

/// Per-step reply timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// Command response for init, set app config, stop and deinit.
    pub response: Duration,
    /// Status notification after init and start.
    pub status: Duration,
    /// Response to RANGE_START.
    pub start_response: Duration,
    /// Status notification after RANGE_STOP.
    pub stop_status: Duration,
    /// Status notification after SESSION_DEINIT.
    pub deinit_status: Duration,
    /// One `range_run` wait in a CCC session.
    pub run_ccc: Duration,
    /// One `range_run` wait in a FiRa session.
    pub run_fira: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            response: Duration::from_millis(200),
            status: Duration::from_millis(200),
            start_response: Duration::from_millis(500),
            stop_status: Duration::from_millis(200),
            deinit_status: Duration::from_millis(300),
            run_ccc: Duration::from_millis(1000),
            run_fira: Duration::from_millis(500),
        }
    }
}

#[derive(Debug)]
struct SessionEntry {
    params: SessionParams,
    status: Option<SessionStatus>,
}

/// A UWB device running FiRa and CCC sessions.
#[derive(Debug)]
pub struct RangingDevice<D> {
    layer: UciLayer<D>,
    sessions: HashMap<u32, SessionEntry>,
    timeouts: SessionTimeouts,
    run_profile: SessionType,
}

impl<D: UciDevice> RangingDevice<D> {
    pub fn new(device: D, config: PortConfig) -> Self {
        Self::from_layer(UciLayer::new(device, config))
    }

    pub fn from_layer(layer: UciLayer<D>) -> Self {
        Self {
            layer,
            sessions: HashMap::new(),
            timeouts: SessionTimeouts::default(),
            run_profile: SessionType::FiraRanging,
        }
    }

    pub fn with_timeouts(mut self, timeouts: SessionTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn timeouts(&self) -> &SessionTimeouts {
        &self.timeouts
    }

    pub fn open(&mut self) -> Result<()> {
        self.layer.open()
    }

    pub fn close(&mut self) -> Result<()> {
        self.layer.close()
    }

    pub fn layer(&self) -> &UciLayer<D> {
        &self.layer
    }

    pub fn layer_mut(&mut self) -> &mut UciLayer<D> {
        &mut self.layer
    }

    pub fn into_layer(self) -> UciLayer<D> {
        self.layer
    }

    /// Last observed status of a session.
    pub fn status(&self, session_id: u32) -> Option<SessionStatus> {
        self.sessions.get(&session_id).and_then(|entry| entry.status)
    }

    /// Last observed lifecycle state of a session.
    pub fn state(&self, session_id: u32) -> Option<SessionState> {
        self.status(session_id).map(|status| status.state)
    }

    pub fn params(&self, session_id: u32) -> Option<&SessionParams> {
        self.sessions.get(&session_id).map(|entry| &entry.params)
    }

    pub fn params_mut(&mut self, session_id: u32) -> Option<&mut SessionParams> {
        self.sessions
            .get_mut(&session_id)
            .map(|entry| &mut entry.params)
    }

    /// Known sessions with their last status, in ascending id order.
    pub fn sessions(&self) -> Vec<(u32, Option<SessionStatus>)> {
        let mut out: Vec<_> = self
            .sessions
            .iter()
            .map(|(&id, entry)| (id, entry.status))
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    /// Apply a dispatch result to the session map.
    ///
    /// Only status notifications for known sessions have an effect.
    pub fn observe(&mut self, result: &DispatchResult) {
        let Decoded::SessionStatus(status) = &result.decoded else {
            return;
        };
        let Some(entry) = self.sessions.get_mut(&status.session_id) else {
            debug!(session_id = status.session_id, "status for unknown session ignored");
            return;
        };
        let previous = entry.status.map(|s| s.state);
        entry.status = Some(*status);
        info!(
            session_id = status.session_id,
            from = ?previous,
            to = %status.state,
            reason = %status.reason,
            "session state changed"
        );
    }

    /// Create a session on the device.
    ///
    /// Registers the ranging decoders for the session's profile and role,
    /// sends SESSION_INIT and waits for its response and status
    /// notification. A non-OK reply is logged, not returned as an error;
    /// check [`RangingDevice::state`] before configuring.
    pub fn init(&mut self, params: impl Into<SessionParams>) -> Result<Option<SessionState>> {
        let params = params.into();
        let session_id = params.session_id();
        let session_type = params.session_type();
        self.register_range_decoders(&params);
        self.sessions.insert(
            session_id,
            SessionEntry {
                params,
                status: None,
            },
        );
        self.run_profile = session_type;
        info!(session_id, %session_type, "initializing session");

        self.send(|layer| layer.session_init(session_id, session_type))?;
        self.await_step(self.timeouts.response, "session init response");
        self.await_step(self.timeouts.status, "session init status");
        Ok(self.state(session_id))
    }

    /// Send the session's app config.
    ///
    /// The session must be known and in INIT; otherwise nothing is sent.
    pub fn set_app_config(&mut self, session_id: u32) -> Result<DispatchResult> {
        let tlvs = self.ready_config(session_id)?;
        debug!(session_id, count = tlvs.len(), "sending app config");
        self.send(|layer| layer.session_set_app_config(session_id, &tlvs))?;
        Ok(self.await_step(self.timeouts.response, "set app config response"))
    }

    /// The TLV list `set_app_config` would send for a session.
    pub fn app_config_tlvs(&self, session_id: u32) -> Result<Vec<UciConfigTlv>> {
        let entry = self
            .sessions
            .get(&session_id)
            .ok_or(SessionError::SessionNotReady {
                session_id,
                state: None,
            })?;
        Ok(entry.params.app_config_tlvs()?)
    }

    pub fn range_start(&mut self, session_id: u32) -> Result<Option<SessionState>> {
        info!(session_id, "starting ranging");
        self.send(|layer| layer.range_start(session_id))?;
        self.await_step(self.timeouts.start_response, "range start response");
        self.await_step(self.timeouts.status, "range start status");
        Ok(self.state(session_id))
    }

    /// Stop ranging. A missing status notification is tolerated.
    pub fn range_stop(&mut self, session_id: u32) -> Result<Option<SessionState>> {
        info!(session_id, "stopping ranging");
        self.send(|layer| layer.range_stop(session_id))?;
        self.await_step(self.timeouts.response, "range stop response");
        self.await_step(self.timeouts.stop_status, "range stop status");
        Ok(self.state(session_id))
    }

    /// Wait for the next response or notification.
    ///
    /// The wait uses the run timeout of the most recently initialized
    /// session's profile. A timeout yields a FAILED result.
    pub fn range_run(&mut self) -> DispatchResult {
        let timeout = match self.run_profile {
            SessionType::CccRanging => self.timeouts.run_ccc,
            _ => self.timeouts.run_fira,
        };
        let result = self.layer.wait(timeout);
        self.observe(&result);
        result
    }

    /// Call `range_run` until `cancel` fires or `handler` returns `false`.
    ///
    /// Empty polls are not passed to `handler`. Returns the number of
    /// results delivered.
    pub fn run_until<F>(&mut self, cancel: &CancelToken, mut handler: F) -> usize
    where
        F: FnMut(&DispatchResult) -> bool,
    {
        let mut delivered = 0;
        while !cancel.is_cancelled() {
            let result = self.range_run();
            if result == DispatchResult::failed() {
                continue;
            }
            delivered += 1;
            if !handler(&result) {
                break;
            }
        }
        debug!(delivered, cancelled = cancel.is_cancelled(), "ranging loop finished");
        delivered
    }

    /// Remove the session from the device. The map keeps its last status.
    pub fn deinit(&mut self, session_id: u32) -> Result<Option<SessionState>> {
        info!(session_id, "deinitializing session");
        self.send(|layer| layer.session_deinit(session_id))?;
        self.await_step(self.timeouts.response, "session deinit response");
        self.await_step(self.timeouts.deinit_status, "session deinit status");
        Ok(self.state(session_id))
    }

    /// Send any command through the layer and wait for its response.
    pub fn request<F>(&mut self, command: F) -> Result<DispatchResult>
    where
        F: FnOnce(&mut UciLayer<D>) -> Result<Option<DispatchResult>>,
    {
        self.send(command)?;
        Ok(self.await_step(self.timeouts.response, "command response"))
    }

    fn ready_config(&self, session_id: u32) -> Result<Vec<UciConfigTlv>> {
        let entry = self.sessions.get(&session_id);
        let state = entry.and_then(|entry| entry.status).map(|status| status.state);
        match (entry, state) {
            (Some(entry), Some(SessionState::Init)) => Ok(entry.params.app_config_tlvs()?),
            _ => {
                warn!(session_id, ?state, "session not ready for app config");
                Err(SessionError::SessionNotReady { session_id, state })
            }
        }
    }

    fn register_range_decoders(&mut self, params: &SessionParams) {
        let table = self.layer.table_mut();
        match params {
            SessionParams::Ccc(_) if params.is_controller() => {
                table.register_notification(
                    GroupId::Range,
                    range::CCC_DATA,
                    ranging::ccc_controller_range_ntf,
                );
                table.register_notification(
                    GroupId::Range,
                    range::CCC_DATA_EXP,
                    ranging::ccc_controller_exp_range_ntf,
                );
            }
            SessionParams::Ccc(_) => {
                table.register_notification(
                    GroupId::Range,
                    range::CCC_DATA,
                    ranging::ccc_controlee_range_ntf,
                );
            }
            SessionParams::Fira(_) => {
                table.register_notification(GroupId::Range, range::DATA, ranging::fira_range_ntf);
            }
        }
    }

    fn send<F>(&mut self, command: F) -> Result<()>
    where
        F: FnOnce(&mut UciLayer<D>) -> Result<Option<DispatchResult>>,
    {
        if let Some(pending) = command(&mut self.layer)? {
            self.observe(&pending);
        }
        Ok(())
    }

    fn await_step(&mut self, timeout: Duration, step: &'static str) -> DispatchResult {
        let result = self.layer.wait(timeout);
        if result.status.is_ok() {
            debug!(step, %result, "step complete");
        } else {
            warn!(step, status = %result.status, "step did not succeed");
        }
        self.observe(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use uwbuci_frame::UciStatus;
    use uwbuci_transport::ScriptedDevice;

    use super::*;
    use crate::params::{CccSessionParams, FiraSessionParams};
    use crate::types::{device_role, device_type};

    const SESSION: u32 = 0x0000_0042;

    fn status_ntf(session_id: u32, state: u8) -> Vec<u8> {
        let mut frame = vec![0x61, 0x02, 0x00, 0x06];
        frame.extend_from_slice(&session_id.to_le_bytes());
        frame.extend_from_slice(&[state, 0x00]);
        frame
    }

    /// Replies OK to every command; lifecycle commands also get a status notification.
    fn device() -> ScriptedDevice {
        ScriptedDevice::new().with_responder(|cmd| {
            let gid = cmd[0] & 0x0F;
            let oid = cmd[1] & 0x3F;
            let session_id = cmd
                .get(4..8)
                .map_or(0, |b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]));
            let ok = vec![0x40 | gid, oid, 0x00, 0x01, 0x00];
            match (gid, oid) {
                (0x1, 0x00) => vec![ok, status_ntf(session_id, 0x00)],
                (0x1, 0x01) => vec![ok, status_ntf(session_id, 0x01)],
                (0x2, 0x00) => vec![ok, status_ntf(session_id, 0x02)],
                (0x2, 0x01) => vec![ok, status_ntf(session_id, 0x03)],
                _ => vec![ok],
            }
        })
    }

    fn fast() -> SessionTimeouts {
        SessionTimeouts {
            response: Duration::from_millis(50),
            status: Duration::from_millis(50),
            start_response: Duration::from_millis(50),
            stop_status: Duration::from_millis(50),
            deinit_status: Duration::from_millis(50),
            run_ccc: Duration::from_millis(20),
            run_fira: Duration::from_millis(20),
        }
    }

    fn open(device: ScriptedDevice) -> RangingDevice<ScriptedDevice> {
        let mut dev = RangingDevice::new(device, PortConfig::default()).with_timeouts(fast());
        dev.open().expect("scripted device should open");
        dev
    }

    fn fira() -> FiraSessionParams {
        let mut params =
            FiraSessionParams::new(SESSION, device_type::CONTROLLER, device_role::INITIATOR, 1);
        params.set_dst_addresses(vec![2]);
        params
    }

    #[test]
    fn full_lifecycle_follows_notifications() {
        let mut dev = open(device());
        assert_eq!(dev.init(fira()).unwrap(), Some(SessionState::Init));
        let rsp = dev.set_app_config(SESSION).unwrap();
        assert_eq!(rsp.status, UciStatus::Ok);
        assert_eq!(dev.range_start(SESSION).unwrap(), Some(SessionState::Active));
        assert_eq!(dev.range_stop(SESSION).unwrap(), Some(SessionState::Idle));
        assert_eq!(dev.deinit(SESSION).unwrap(), Some(SessionState::Deinit));
        assert_eq!(dev.sessions().len(), 1);
    }

    #[test]
    fn set_app_config_requires_init_state() {
        let mut dev = open(device());
        let err = dev.set_app_config(SESSION).unwrap_err();
        assert!(matches!(
            err,
            SessionError::SessionNotReady { session_id: SESSION, state: None }
        ));

        dev.init(fira()).unwrap();
        dev.range_start(SESSION).unwrap();
        let sent = dev.layer().port().device().commands().len();
        let err = dev.set_app_config(SESSION).unwrap_err();
        assert!(matches!(
            err,
            SessionError::SessionNotReady {
                state: Some(SessionState::Active),
                ..
            }
        ));
        assert_eq!(dev.layer().port().device().commands().len(), sent);
    }

    #[test]
    fn missing_fira_addresses_block_transmission() {
        let mut dev = open(device());
        let params =
            FiraSessionParams::new(SESSION, device_type::CONTROLLER, device_role::INITIATOR, 1);
        dev.init(params).unwrap();
        let sent = dev.layer().port().device().commands().len();
        let err = dev.set_app_config(SESSION).unwrap_err();
        assert!(matches!(err, SessionError::Param(_)));
        assert_eq!(dev.layer().port().device().commands().len(), sent);
    }

    #[test]
    fn status_for_unknown_session_is_ignored() {
        let mut dev = open(device());
        let result = dev.layer().table().dispatch_frame(&status_ntf(0x99, 0x02));
        dev.observe(&result);
        assert!(dev.sessions().is_empty());
        assert_eq!(dev.state(0x99), None);
    }

    #[test]
    fn controlee_init_overrides_ccc_range_decoder() {
        let mut dev = open(device());
        let params = CccSessionParams::new(SESSION, device_type::CONTROLEE, device_role::RESPONDER, 1);
        dev.init(params).unwrap();
        let key = crate::dispatch::DispatchKey::new(GroupId::Range, range::CCC_DATA);
        let route = dev
            .layer()
            .table()
            .route(uwbuci_frame::MessageType::Notification, key);
        assert!(matches!(route, crate::dispatch::Route::Registered(_)));
    }

    #[test]
    fn run_until_stops_on_handler_or_cancel() {
        let mut dev = open(device());
        dev.init(fira()).unwrap();
        for _ in 0..3 {
            dev.layer_mut()
                .port_mut()
                .device_mut()
                .push_frame(status_ntf(SESSION, 0x02));
        }

        let cancel = CancelToken::new();
        let mut seen = 0;
        let delivered = dev.run_until(&cancel, |result| {
            seen += 1;
            assert!(result.is_notification());
            seen < 2
        });
        assert_eq!(delivered, 2);
        assert_eq!(dev.state(SESSION), Some(SessionState::Active));

        cancel.cancel();
        assert_eq!(dev.run_until(&cancel, |_| true), 0);
        assert_eq!(dev.layer().port().device().queued(), 1);
    }
}
