use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, TransportError};

/// Hold time of the reset line during a hard reset.
pub const RESET_HOLD: Duration = Duration::from_millis(100);

/// Settle time after releasing the reset line.
pub const RESET_SETTLE: Duration = Duration::from_millis(100);

/// Sideband signals driven by the UWB device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeLine {
    /// Device is ready to receive a command. Asserted low.
    Ready,
    /// Device has data pending, or a transfer is still in progress. Asserted low.
    Pending,
}

impl fmt::Display for HandshakeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready line"),
            Self::Pending => f.write_str("pending line"),
        }
    }
}

/// Logic level of a line. All sideband lines are active low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub const ASSERTED: Level = Level::Low;
    pub const RELEASED: Level = Level::High;
}

/// Physical driver contract for a UWB device.
///
/// Implementations wrap a chip-select byte channel (SPI or a USB bridge)
/// plus the sideband and reset lines. All calls are blocking; a device is
/// owned by exactly one caller and is not meant to be shared across threads.
pub trait UciDevice {
    /// Open the underlying channel.
    fn open(&mut self) -> Result<()>;

    /// Close the underlying channel.
    fn close(&mut self) -> Result<()>;

    /// Sample the current level of a sideband line.
    fn read_line(&mut self, line: HandshakeLine) -> Result<Level>;

    /// Drive the chip-select line.
    fn set_chip_select(&mut self, level: Level) -> Result<()>;

    /// Drive the reset line.
    fn set_reset(&mut self, level: Level) -> Result<()>;

    /// Full-duplex transfer: clock out `tx` and return the same number of
    /// bytes clocked in.
    fn exchange(&mut self, tx: &[u8]) -> Result<Vec<u8>>;

    /// Block until `line` reads `level`.
    ///
    /// `None` waits forever. The default implementation polls
    /// [`read_line`](Self::read_line) against a monotonic deadline.
    fn wait_for_line(
        &mut self,
        line: HandshakeLine,
        level: Level,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let started = Instant::now();
        loop {
            if self.read_line(line)? == level {
                return Ok(());
            }
            if let Some(timeout) = timeout {
                if started.elapsed() >= timeout {
                    return Err(TransportError::HandshakeTimeout { line, timeout });
                }
            }
            thread::yield_now();
        }
    }

    /// Pulse the reset line low, then let the device settle.
    fn hard_reset(&mut self) -> Result<()> {
        self.set_reset(Level::Low)?;
        thread::sleep(RESET_HOLD);
        self.set_reset(Level::High)?;
        thread::sleep(RESET_SETTLE);
        Ok(())
    }
}

impl<D: UciDevice + ?Sized> UciDevice for Box<D> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn read_line(&mut self, line: HandshakeLine) -> Result<Level> {
        (**self).read_line(line)
    }

    fn set_chip_select(&mut self, level: Level) -> Result<()> {
        (**self).set_chip_select(level)
    }

    fn set_reset(&mut self, level: Level) -> Result<()> {
        (**self).set_reset(level)
    }

    fn exchange(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        (**self).exchange(tx)
    }

    fn wait_for_line(
        &mut self,
        line: HandshakeLine,
        level: Level,
        timeout: Option<Duration>,
    ) -> Result<()> {
        (**self).wait_for_line(line, level, timeout)
    }

    fn hard_reset(&mut self) -> Result<()> {
        (**self).hard_reset()
    }
}

/// Convert a millisecond-style timeout where zero means "wait forever".
pub fn deadline_timeout(timeout: Duration) -> Option<Duration> {
    if timeout.is_zero() {
        None
    } else {
        Some(timeout)
    }
}
