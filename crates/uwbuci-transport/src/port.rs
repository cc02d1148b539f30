//! Half-duplex command/receive handshake over the sideband lines.
//!
//! Sending:
//! 1. If the pending line is asserted, drain that frame first and hand it
//!    back in [`SendOutcome::pending`].
//! 2. Assert chip-select and wait for the ready line.
//! 3. Clock out the command, release chip-select.
//!
//! Receiving:
//! 1. Wait for the pending line, assert chip-select.
//! 2. Clock a zero-filled probe to read the header window.
//! 3. Clock out the declared payload length (plus the CRC trailer if enabled).
//! 4. Wait for the pending line to release, release chip-select.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};
use uwbuci_frame::{append_crc, split_crc, CrcCheck, CRC_SIZE, HEADER_SIZE, MAX_PACKET_SIZE};

use crate::error::{Result, TransportError};
use crate::traits::{deadline_timeout, HandshakeLine, Level, UciDevice};

/// Device variants differ in the header window they shift out on a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderVariant {
    /// Four header bytes, no padding.
    #[default]
    Standard,
    /// One invalid byte precedes the four header bytes.
    LeadingInvalidByte,
}

impl HeaderVariant {
    /// Size of the zero-filled probe clocked to read the header.
    pub fn probe_len(self) -> usize {
        HEADER_SIZE + self.skip()
    }

    /// Number of leading bytes to discard from the probe.
    pub fn skip(self) -> usize {
        match self {
            Self::Standard => 0,
            Self::LeadingInvalidByte => 1,
        }
    }
}

/// Configuration for a [`UciPort`].
#[derive(Debug, Clone)]
pub struct PortConfig {
    pub header_variant: HeaderVariant,
    /// Append a CRC trailer to outgoing commands.
    pub crc_enabled: bool,
    /// Wait for the ready line on send. Zero waits forever.
    pub send_timeout: Duration,
    /// Wait for the pending line to release after draining a frame.
    pub pending_release_timeout: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            header_variant: HeaderVariant::Standard,
            crc_enabled: false,
            send_timeout: Duration::from_millis(200),
            pending_release_timeout: Duration::from_millis(10),
        }
    }
}

/// A frame read from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    /// Header and payload, without any CRC trailer.
    pub bytes: Bytes,
    /// Trailer check when the read was CRC-enabled.
    pub crc: Option<CrcCheck>,
}

impl ReceivedFrame {
    /// `Some(false)` flags a corrupt frame; the caller decides whether to drop it.
    pub fn crc_valid(&self) -> Option<bool> {
        self.crc.and_then(|check| check.is_valid())
    }
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Bytes shifted in while the command was clocked out. Usually garbage.
    pub reply: Bytes,
    /// A frame that was pending before the send and had to be drained.
    pub pending: Option<ReceivedFrame>,
}

/// Sideband-handshake port over a [`UciDevice`].
pub struct UciPort<D> {
    device: D,
    config: PortConfig,
    open: bool,
}

impl<D: UciDevice> UciPort<D> {
    pub fn new(device: D, config: PortConfig) -> Self {
        Self {
            device,
            config,
            open: false,
        }
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_inner(self) -> D {
        self.device
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) -> Result<()> {
        if !self.open {
            self.device.open()?;
            self.device.set_chip_select(Level::RELEASED)?;
            self.open = true;
            debug!(variant = ?self.config.header_variant, "uci port opened");
        }
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.device.close()?;
            debug!("uci port closed");
        }
        Ok(())
    }

    pub fn hard_reset(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.device.hard_reset()
    }

    /// Transmit one command.
    ///
    /// `command` must be a complete UCI packet (4..=259 bytes). When
    /// [`PortConfig::crc_enabled`] is set a trailer is appended here.
    /// A zero `timeout` waits forever for the ready line.
    pub fn send(&mut self, command: &[u8], timeout: Duration) -> Result<SendOutcome> {
        self.ensure_open()?;
        if command.len() < HEADER_SIZE || command.len() > MAX_PACKET_SIZE {
            return Err(TransportError::BadParameter(format!(
                "command length {} outside {}..={}",
                command.len(),
                HEADER_SIZE,
                MAX_PACKET_SIZE
            )));
        }

        let mut tx = BytesMut::with_capacity(command.len() + CRC_SIZE);
        tx.extend_from_slice(command);
        if self.config.crc_enabled {
            append_crc(&mut tx);
        }

        let pending = if self.device.read_line(HandshakeLine::Pending)? == Level::ASSERTED {
            let frame = self.receive(timeout, self.config.crc_enabled)?;
            warn!(len = frame.bytes.len(), "drained pending frame before send");
            if let Err(err) = self.device.wait_for_line(
                HandshakeLine::Pending,
                Level::RELEASED,
                Some(self.config.pending_release_timeout),
            ) {
                debug!(%err, "pending line still asserted after drain");
            }
            Some(frame)
        } else {
            None
        };

        let reply = self.with_chip_select(|device| {
            device.wait_for_line(
                HandshakeLine::Ready,
                Level::ASSERTED,
                deadline_timeout(timeout),
            )?;
            device.exchange(&tx)
        })?;
        debug!(len = tx.len(), "command sent");

        Ok(SendOutcome {
            reply: Bytes::from(reply),
            pending,
        })
    }

    /// Read one frame.
    ///
    /// A zero `timeout` waits forever on each line. With `crc_enabled` the
    /// last two bytes are split off and checked; a mismatch is flagged on
    /// the result, not returned as an error.
    pub fn receive(&mut self, timeout: Duration, crc_enabled: bool) -> Result<ReceivedFrame> {
        self.ensure_open()?;
        let limit = deadline_timeout(timeout);
        self.device
            .wait_for_line(HandshakeLine::Pending, Level::ASSERTED, limit)?;

        let variant = self.config.header_variant;
        let raw = self.with_chip_select(|device| {
            let probe = device.exchange(&vec![0u8; variant.probe_len()])?;
            if probe.len() < variant.probe_len() {
                return Err(TransportError::GeneralIo(format!(
                    "header probe returned {} bytes, expected {}",
                    probe.len(),
                    variant.probe_len()
                )));
            }

            let header = &probe[variant.skip()..];
            let mut remaining = u16::from_be_bytes([header[2], header[3]]) as usize;
            if crc_enabled {
                remaining += CRC_SIZE;
            }

            let rest = if remaining > 0 {
                device.exchange(&vec![0u8; remaining])?
            } else {
                Vec::new()
            };
            if rest.len() < remaining {
                return Err(TransportError::GeneralIo(format!(
                    "payload read returned {} bytes, expected {}",
                    rest.len(),
                    remaining
                )));
            }

            device.wait_for_line(HandshakeLine::Pending, Level::RELEASED, limit)?;

            let mut frame = Vec::with_capacity(HEADER_SIZE + rest.len());
            frame.extend_from_slice(header);
            frame.extend_from_slice(&rest);
            Ok(frame)
        })?;

        if crc_enabled {
            let (body, check) = split_crc(&raw)
                .map_err(|err| TransportError::GeneralIo(err.to_string()))?;
            if check.is_valid() == Some(false) {
                warn!(
                    calculated = check.calculated,
                    provided = ?check.provided,
                    "crc mismatch on received frame"
                );
            }
            debug!(len = body.len(), "frame received");
            return Ok(ReceivedFrame {
                bytes: Bytes::copy_from_slice(body),
                crc: Some(check),
            });
        }

        debug!(len = raw.len(), "frame received");
        Ok(ReceivedFrame {
            bytes: Bytes::from(raw),
            crc: None,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(TransportError::NotOpen)
        }
    }

    /// Run `op` with chip-select asserted, releasing it on every path.
    fn with_chip_select<T>(&mut self, op: impl FnOnce(&mut D) -> Result<T>) -> Result<T> {
        self.device.set_chip_select(Level::ASSERTED)?;
        let result = op(&mut self.device);
        let released = self.device.set_chip_select(Level::RELEASED);
        let value = result?;
        released?;
        Ok(value)
    }
}

impl<D> std::fmt::Debug for UciPort<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UciPort")
            .field("config", &self.config)
            .field("open", &self.open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use uwbuci_frame::crc16_xmodem;

    use super::*;
    use crate::scripted::ScriptedDevice;

    const STATUS_NTF: [u8; 10] = [0x61, 0x02, 0x00, 0x06, 0x78, 0x56, 0x34, 0x12, 0x02, 0x00];
    const RESET_CMD: [u8; 5] = [0x20, 0x00, 0x00, 0x01, 0x00];

    fn open_port(device: ScriptedDevice, config: PortConfig) -> UciPort<ScriptedDevice> {
        let mut port = UciPort::new(device, config);
        port.open().unwrap();
        port
    }

    #[test]
    fn send_records_command_and_releases_chip_select() {
        let mut port = open_port(ScriptedDevice::new(), PortConfig::default());
        let outcome = port.send(&RESET_CMD, Duration::from_millis(50)).unwrap();

        assert_eq!(outcome.pending, None);
        assert_eq!(outcome.reply.len(), RESET_CMD.len());
        assert_eq!(port.device().commands(), &[RESET_CMD.to_vec()]);
        assert_eq!(port.device().chip_select(), Level::High);
    }

    #[test]
    fn send_appends_crc_when_enabled() {
        let config = PortConfig {
            crc_enabled: true,
            ..PortConfig::default()
        };
        let mut port = open_port(ScriptedDevice::new(), config);
        port.send(&RESET_CMD, Duration::from_millis(50)).unwrap();

        let sent = &port.device().commands()[0];
        assert_eq!(sent.len(), RESET_CMD.len() + CRC_SIZE);
        assert_eq!(&sent[5..], &crc16_xmodem(&RESET_CMD).to_le_bytes());
    }

    #[test]
    fn send_rejects_bad_lengths_without_touching_the_bus() {
        let mut port = open_port(ScriptedDevice::new(), PortConfig::default());
        assert!(matches!(
            port.send(&[0x20, 0x00, 0x00], Duration::from_millis(50)),
            Err(TransportError::BadParameter(_))
        ));
        assert!(matches!(
            port.send(&[0u8; MAX_PACKET_SIZE + 1], Duration::from_millis(50)),
            Err(TransportError::BadParameter(_))
        ));
        assert_eq!(port.device().exchange_count(), 0);
        assert_eq!(port.device().chip_select_count(), 0);
    }

    #[test]
    fn send_times_out_when_ready_never_asserts() {
        let mut port = open_port(ScriptedDevice::new().never_ready(), PortConfig::default());
        let timeout = Duration::from_millis(30);
        let started = Instant::now();
        let err = port.send(&RESET_CMD, timeout).unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(
            err,
            TransportError::HandshakeTimeout {
                line: HandshakeLine::Ready,
                ..
            }
        ));
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_secs(1));
        assert_eq!(port.device().chip_select(), Level::High);
        assert!(port.device().commands().is_empty());
    }

    #[test]
    fn send_drains_pending_frame_first() {
        let mut device = ScriptedDevice::new();
        device.push_frame(STATUS_NTF);
        let mut port = open_port(device, PortConfig::default());

        let outcome = port.send(&RESET_CMD, Duration::from_millis(50)).unwrap();
        let pending = outcome.pending.unwrap();
        assert_eq!(pending.bytes.as_ref(), &STATUS_NTF);
        assert_eq!(port.device().commands(), &[RESET_CMD.to_vec()]);
        assert_eq!(port.device().queued(), 0);
    }

    #[test]
    fn receive_reads_standard_header() {
        let mut device = ScriptedDevice::new();
        device.push_frame(STATUS_NTF);
        let mut port = open_port(device, PortConfig::default());

        let frame = port.receive(Duration::from_millis(50), false).unwrap();
        assert_eq!(frame.bytes.as_ref(), &STATUS_NTF);
        assert_eq!(frame.crc, None);
        assert_eq!(port.device().chip_select(), Level::High);
    }

    #[test]
    fn receive_discards_leading_invalid_byte() {
        let variant = HeaderVariant::LeadingInvalidByte;
        let mut device = ScriptedDevice::new().with_variant(variant);
        device.push_frame(STATUS_NTF);
        let config = PortConfig {
            header_variant: variant,
            ..PortConfig::default()
        };
        let mut port = open_port(device, config);

        let frame = port.receive(Duration::from_millis(50), false).unwrap();
        assert_eq!(frame.bytes.as_ref(), &STATUS_NTF);
    }

    #[test]
    fn receive_header_only_frame() {
        let mut device = ScriptedDevice::new();
        device.push_frame([0x62, 0x01, 0x00, 0x00]);
        let mut port = open_port(device, PortConfig::default());

        let frame = port.receive(Duration::from_millis(50), false).unwrap();
        assert_eq!(frame.bytes.as_ref(), &[0x62, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn receive_flags_crc_without_failing() {
        let mut device = ScriptedDevice::new().with_crc(true);
        device.push_frame(STATUS_NTF);
        let mut corrupt = STATUS_NTF.to_vec();
        corrupt.extend_from_slice(&[0x00, 0x00]);
        device.push_raw(corrupt);
        let mut port = open_port(device, PortConfig::default());

        let good = port.receive(Duration::from_millis(50), true).unwrap();
        assert_eq!(good.bytes.as_ref(), &STATUS_NTF);
        assert_eq!(good.crc_valid(), Some(true));

        let bad = port.receive(Duration::from_millis(50), true).unwrap();
        assert_eq!(bad.bytes.as_ref(), &STATUS_NTF);
        assert_eq!(bad.crc_valid(), Some(false));
    }

    #[test]
    fn receive_times_out_without_pending_data() {
        let mut port = open_port(ScriptedDevice::new(), PortConfig::default());
        assert!(matches!(
            port.receive(Duration::from_millis(20), false),
            Err(TransportError::HandshakeTimeout {
                line: HandshakeLine::Pending,
                ..
            })
        ));
        assert_eq!(port.device().chip_select_count(), 0);
    }

    #[test]
    fn receive_empty_exchange_is_general_io() {
        let mut device = ScriptedDevice::new().silent();
        device.push_frame(STATUS_NTF);
        let mut port = open_port(device, PortConfig::default());

        assert!(matches!(
            port.receive(Duration::from_millis(20), false),
            Err(TransportError::GeneralIo(_))
        ));
        assert_eq!(port.device().chip_select(), Level::High);
    }

    #[test]
    fn operations_require_open() {
        let mut port = UciPort::new(ScriptedDevice::new(), PortConfig::default());
        assert!(matches!(
            port.send(&RESET_CMD, Duration::from_millis(10)),
            Err(TransportError::NotOpen)
        ));
        assert!(matches!(
            port.receive(Duration::from_millis(10), false),
            Err(TransportError::NotOpen)
        ));
    }

    #[test]
    fn responder_frames_are_served_after_command() {
        let device = ScriptedDevice::new().with_responder(|cmd| {
            vec![vec![0x40 | (cmd[0] & 0x0F), cmd[1], 0x00, 0x01, 0x00]]
        });
        let mut port = open_port(device, PortConfig::default());
        port.send(&RESET_CMD, Duration::from_millis(50)).unwrap();

        let frame = port.receive(Duration::from_millis(50), false).unwrap();
        assert_eq!(frame.bytes.as_ref(), &[0x40, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn hard_reset_goes_through_device() {
        let mut port = open_port(ScriptedDevice::new(), PortConfig::default());
        port.hard_reset().unwrap();
        assert_eq!(port.device().reset_count(), 1);
    }
}
