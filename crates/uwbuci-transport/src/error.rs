use std::time::Duration;

use crate::traits::HandshakeLine;

/// Errors that can occur in UCI transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The command is empty, shorter than a header or larger than a packet.
    #[error("bad parameter: {0}")]
    BadParameter(String),

    /// A sideband line did not reach the requested level in time.
    #[error("handshake timeout waiting for {line} after {timeout:?}")]
    HandshakeTimeout {
        line: HandshakeLine,
        timeout: Duration,
    },

    /// The byte channel returned no data where data was expected.
    #[error("general I/O error: {0}")]
    GeneralIo(String),

    /// The device has not been opened.
    #[error("device not open")]
    NotOpen,

    /// An I/O error from the underlying driver.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
