use uwbuci_frame::gid::{range, session};
use uwbuci_frame::{GroupId, UciMessage, UciStatus};
use uwbuci_session::{
    CancelToken, RangingDevice, ReasonCode, SessionParams, SessionState,
};
use uwbuci_transport::{PortConfig, ScriptedDevice};

use crate::cmd::{load_params, SimulateArgs};
use crate::exit::{session_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::{print_result, OutputFormat};

/// Bytes between consecutive FiRa measurements.
const FIRA_RESULT_STRIDE: usize = 31;

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    let params = load_params(args.profile, args.params.as_deref())?;
    // fail before anything is sent
    params
        .app_config_tlvs()
        .map_err(|err| session_error("invalid configuration", err.into()))?;

    let session_id = params.session_id();
    let scenario = Scenario::for_params(&params, args.count);
    let device = ScriptedDevice::new().with_responder(move |cmd| scenario.reply(cmd));
    let mut dev = RangingDevice::new(device, PortConfig::default());
    dev.open()
        .map_err(|err| session_error("cannot open device", err))?;

    let cancel = CancelToken::new();
    install_ctrlc_handler(cancel.clone())?;

    let state = dev
        .init(params)
        .map_err(|err| session_error("session init failed", err))?;
    expect_state(session_id, "init", state, SessionState::Init)?;

    let rsp = dev
        .set_app_config(session_id)
        .map_err(|err| session_error("app config failed", err))?;
    if rsp.status != UciStatus::Ok {
        return Err(CliError::new(
            FAILURE,
            format!("app config rejected: {} ({})", rsp.status, rsp.decoded),
        ));
    }

    let state = dev
        .range_start(session_id)
        .map_err(|err| session_error("range start failed", err))?;
    expect_state(session_id, "range start", state, SessionState::Active)?;

    let wanted = args.count as usize;
    let mut printed = 0usize;
    dev.run_until(&cancel, |result| {
        print_result(result, format);
        printed += 1;
        printed < wanted
    });

    let state = dev
        .range_stop(session_id)
        .map_err(|err| session_error("range stop failed", err))?;
    expect_state(session_id, "range stop", state, SessionState::Idle)?;
    dev.deinit(session_id)
        .map_err(|err| session_error("session deinit failed", err))?;
    dev.close()
        .map_err(|err| session_error("cannot close device", err))?;

    tracing::info!(session_id, rounds = printed, "simulation finished");
    Ok(SUCCESS)
}

fn expect_state(
    session_id: u32,
    step: &str,
    state: Option<SessionState>,
    expected: SessionState,
) -> CliResult<()> {
    if state == Some(expected) {
        return Ok(());
    }
    let seen = state.map_or_else(|| "no status".to_string(), |s| s.to_string());
    Err(CliError::new(
        FAILURE,
        format!("session 0x{session_id:08X} {step}: expected {expected}, device reported {seen}"),
    ))
}

fn install_ctrlc_handler(cancel: CancelToken) -> CliResult<()> {
    ctrlc::set_handler(move || cancel.cancel())
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

/// Which ranging notification the simulated device emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Fira,
    CccController,
    CccControlee,
}

/// Device side of the simulation: answers every command with OK, follows
/// lifecycle commands with the matching status notification, and queues
/// `rounds` ranging notifications after RANGE_START.
#[derive(Debug, Clone)]
struct Scenario {
    layout: Layout,
    rounds: u32,
    peers: Vec<u16>,
    interval_ms: u32,
}

impl Scenario {
    fn for_params(params: &SessionParams, rounds: u32) -> Self {
        match params {
            SessionParams::Fira(fira) => Self {
                layout: Layout::Fira,
                rounds,
                peers: fira.dst_mac_addr.clone(),
                interval_ms: fira.ranging_interval,
            },
            SessionParams::Ccc(ccc) => Self {
                layout: if params.is_controller() {
                    Layout::CccController
                } else {
                    Layout::CccControlee
                },
                rounds,
                peers: (1..=u16::from(ccc.anchor_num.max(1))).collect(),
                interval_ms: ccc.ranging_interval,
            },
        }
    }

    fn reply(&self, cmd: &[u8]) -> Vec<Vec<u8>> {
        let (Some(&b0), Some(&b1)) = (cmd.first(), cmd.get(1)) else {
            return Vec::new();
        };
        let gid = GroupId::from_u8(b0 & 0x0F);
        let oid = b1 & 0x3F;
        let session_id = cmd
            .get(4..8)
            .map_or(0, |b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]));

        let mut frames = vec![UciMessage::response(gid, oid, UciStatus::Ok, Vec::new())];
        match (gid, oid) {
            (GroupId::Session, session::INIT) => {
                frames.push(status_ntf(session_id, SessionState::Init));
            }
            (GroupId::Session, session::DEINIT) => {
                frames.push(status_ntf(session_id, SessionState::Deinit));
            }
            (GroupId::Range, range::START) => {
                frames.push(status_ntf(session_id, SessionState::Active));
                frames.extend((0..self.rounds).map(|round| self.range_ntf(session_id, round)));
            }
            (GroupId::Range, range::STOP) => {
                frames.push(status_ntf(session_id, SessionState::Idle));
            }
            _ => {}
        }

        frames
            .into_iter()
            .filter_map(|msg| msg.to_bytes(false).ok())
            .map(|bytes| bytes.to_vec())
            .collect()
    }

    fn range_ntf(&self, session_id: u32, round: u32) -> UciMessage {
        let distance = |peer: usize| 120 + (round as u16 % 40) * 5 + peer as u16 * 30;
        let mut p = Vec::new();
        match self.layout {
            Layout::Fira => {
                p.extend_from_slice(&round.to_le_bytes());
                p.extend_from_slice(&session_id.to_le_bytes());
                p.push(0);
                p.extend_from_slice(&self.interval_ms.to_le_bytes());
                // two-way ranging, short addresses
                p.extend_from_slice(&[0x01, 0x00, 0x00]);
                p.extend_from_slice(&[0; 8]);
                p.push(self.peers.len() as u8);
                for (i, peer) in self.peers.iter().enumerate() {
                    let mut block = Vec::with_capacity(FIRA_RESULT_STRIDE);
                    block.extend_from_slice(&peer.to_le_bytes());
                    block.extend_from_slice(&[0x00, 0x00]);
                    block.extend_from_slice(&distance(i).to_le_bytes());
                    block.resize(FIRA_RESULT_STRIDE, 0);
                    p.extend_from_slice(&block);
                }
                UciMessage::notification(GroupId::Range, range::DATA, p)
            }
            Layout::CccController => {
                p.extend_from_slice(&session_id.to_le_bytes());
                p.extend_from_slice(&(round + 1).to_le_bytes());
                p.extend_from_slice(&(round as u16).to_le_bytes());
                p.push(0x00);
                p.push(self.peers.len() as u8);
                let responders = self
                    .peers
                    .iter()
                    .fold(0u32, |mask, peer| mask | (1u32 << (peer % 32)));
                p.extend_from_slice(&responders.to_le_bytes());
                for (i, peer) in self.peers.iter().enumerate() {
                    p.push(*peer as u8);
                    p.extend_from_slice(&distance(i).to_le_bytes());
                }
                UciMessage::notification(GroupId::Range, range::CCC_DATA_EXP, p)
            }
            Layout::CccControlee => {
                p.extend_from_slice(&session_id.to_le_bytes());
                p.push(0x00);
                p.extend_from_slice(&(round + 1).to_le_bytes());
                p.extend_from_slice(&(round as u16).to_le_bytes());
                p.extend_from_slice(&distance(0).to_le_bytes());
                p.extend_from_slice(&[100, 100]);
                p.extend_from_slice(&[0; 8]);
                UciMessage::notification(GroupId::Range, range::CCC_DATA, p)
            }
        }
    }
}

fn status_ntf(session_id: u32, state: SessionState) -> UciMessage {
    let mut payload = session_id.to_le_bytes().to_vec();
    payload.push(state.as_u8());
    payload.push(ReasonCode::StateChangeWithSessionManagementCommand.as_u8());
    UciMessage::notification(GroupId::Session, session::STATUS, payload)
}
