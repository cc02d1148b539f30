//! In-memory device for tests and simulation.
//!
//! [`ScriptedDevice`] plays the device side of the sideband protocol:
//! queued frames hold the pending line low until they are clocked out,
//! the ready line follows chip-select, and every command clocked in is
//! recorded. An optional responder computes reply frames per command.

use std::collections::VecDeque;
use std::fmt;

use bytes::BytesMut;
use uwbuci_frame::append_crc;

use crate::error::{Result, TransportError};
use crate::port::HeaderVariant;
use crate::traits::{HandshakeLine, Level, UciDevice};

/// Byte shifted out ahead of the header by [`HeaderVariant::LeadingInvalidByte`] devices.
const INVALID_LEAD_BYTE: u8 = 0xFF;

/// Computes device frames in reply to one command.
pub type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

struct ActiveRead {
    wire: Vec<u8>,
    pos: usize,
}

impl ActiveRead {
    fn done(&self) -> bool {
        self.pos >= self.wire.len()
    }
}

/// Scripted stand-in for a UWB device.
pub struct ScriptedDevice {
    variant: HeaderVariant,
    crc: bool,
    never_ready: bool,
    silent: bool,
    open: bool,
    chip_select: Level,
    queue: VecDeque<Vec<u8>>,
    read: Option<ActiveRead>,
    tx: Vec<u8>,
    commands: Vec<Vec<u8>>,
    exchanges: usize,
    chip_selects: usize,
    resets: usize,
    responder: Option<Responder>,
}

impl Default for ScriptedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedDevice {
    pub fn new() -> Self {
        Self {
            variant: HeaderVariant::Standard,
            crc: false,
            never_ready: false,
            silent: false,
            open: false,
            chip_select: Level::High,
            queue: VecDeque::new(),
            read: None,
            tx: Vec::new(),
            commands: Vec::new(),
            exchanges: 0,
            chip_selects: 0,
            resets: 0,
            responder: None,
        }
    }

    /// Shift out frames in the given header variant.
    pub fn with_variant(mut self, variant: HeaderVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Append a CRC trailer to every queued frame.
    pub fn with_crc(mut self, crc: bool) -> Self {
        self.crc = crc;
        self
    }

    /// Keep the ready line released forever.
    pub fn never_ready(mut self) -> Self {
        self.never_ready = true;
        self
    }

    /// Return no bytes from any exchange.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Compute reply frames for every command clocked in.
    pub fn with_responder(
        mut self,
        responder: impl FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
    ) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Queue a device frame (header and payload). A CRC is appended when enabled.
    pub fn push_frame(&mut self, frame: impl AsRef<[u8]>) {
        let frame = frame.as_ref();
        if self.crc {
            let mut buf = BytesMut::from(frame);
            append_crc(&mut buf);
            self.queue.push_back(buf.to_vec());
        } else {
            self.queue.push_back(frame.to_vec());
        }
    }

    /// Queue bytes exactly as given, trailer included.
    pub fn push_raw(&mut self, wire: impl Into<Vec<u8>>) {
        self.queue.push_back(wire.into());
    }

    /// Commands clocked in so far, in order.
    pub fn commands(&self) -> &[Vec<u8>] {
        &self.commands
    }

    /// Number of byte exchanges, reads included.
    pub fn exchange_count(&self) -> usize {
        self.exchanges
    }

    /// Number of chip-select assertions.
    pub fn chip_select_count(&self) -> usize {
        self.chip_selects
    }

    pub fn reset_count(&self) -> usize {
        self.resets
    }

    /// Frames still waiting to be read.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn chip_select(&self) -> Level {
        self.chip_select
    }

    fn begin_read(&mut self) -> bool {
        match self.queue.pop_front() {
            Some(frame) => {
                let mut wire = Vec::with_capacity(frame.len() + 1);
                if self.variant == HeaderVariant::LeadingInvalidByte {
                    wire.push(INVALID_LEAD_BYTE);
                }
                wire.extend_from_slice(&frame);
                self.read = Some(ActiveRead { wire, pos: 0 });
                true
            }
            None => false,
        }
    }

    fn end_transaction(&mut self) {
        self.read = None;
        if self.tx.is_empty() {
            return;
        }
        let command = std::mem::take(&mut self.tx);
        if let Some(responder) = self.responder.as_mut() {
            for frame in responder(&command) {
                if self.crc {
                    let mut buf = BytesMut::from(frame.as_slice());
                    append_crc(&mut buf);
                    self.queue.push_back(buf.to_vec());
                } else {
                    self.queue.push_back(frame);
                }
            }
        }
        self.commands.push(command);
    }
}

impl UciDevice for ScriptedDevice {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn read_line(&mut self, line: HandshakeLine) -> Result<Level> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        let level = match line {
            HandshakeLine::Ready => {
                if self.chip_select == Level::Low && !self.never_ready {
                    Level::Low
                } else {
                    Level::High
                }
            }
            HandshakeLine::Pending => match &self.read {
                Some(read) if read.done() => Level::High,
                Some(_) => Level::Low,
                None if self.queue.is_empty() => Level::High,
                None => Level::Low,
            },
        };
        Ok(level)
    }

    fn set_chip_select(&mut self, level: Level) -> Result<()> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        match (self.chip_select, level) {
            (Level::High, Level::Low) => self.chip_selects += 1,
            (Level::Low, Level::High) => self.end_transaction(),
            _ => {}
        }
        self.chip_select = level;
        Ok(())
    }

    fn set_reset(&mut self, _level: Level) -> Result<()> {
        Ok(())
    }

    fn exchange(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        self.exchanges += 1;
        if self.silent {
            return Ok(Vec::new());
        }

        let is_read = self.read.is_some()
            || (self.tx.is_empty() && tx.iter().all(|&b| b == 0) && self.begin_read());
        if let Some(read) = self.read.as_mut().filter(|_| is_read) {
            let end = (read.pos + tx.len()).min(read.wire.len());
            let mut rx = read.wire[read.pos..end].to_vec();
            rx.resize(tx.len(), 0);
            read.pos += tx.len();
            return Ok(rx);
        }

        self.tx.extend_from_slice(tx);
        Ok(vec![0u8; tx.len()])
    }

    fn hard_reset(&mut self) -> Result<()> {
        self.resets += 1;
        self.queue.clear();
        self.read = None;
        self.tx.clear();
        Ok(())
    }
}

impl fmt::Debug for ScriptedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedDevice")
            .field("variant", &self.variant)
            .field("crc", &self.crc)
            .field("queued", &self.queue.len())
            .field("commands", &self.commands.len())
            .field("responder", &self.responder.is_some())
            .finish()
    }
}
