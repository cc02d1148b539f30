use std::fmt;
use std::io;

use uwbuci_frame::FrameError;
use uwbuci_session::SessionError;
use uwbuci_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::HandshakeTimeout { .. } => {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        TransportError::BadParameter(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::Param(_) | SessionError::Json(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        SessionError::SessionNotReady { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use uwbuci_session::ParamError;
    use uwbuci_transport::HandshakeLine;

    use super::*;

    #[test]
    fn handshake_timeout_maps_to_timeout_code() {
        let err = SessionError::Transport(TransportError::HandshakeTimeout {
            line: HandshakeLine::Ready,
            timeout: Duration::from_millis(200),
        });
        assert_eq!(session_error("init failed", err).code, TIMEOUT);
    }

    #[test]
    fn missing_parameter_is_invalid_data() {
        let err = SessionError::Param(ParamError::MissingRequired {
            name: "dst_mac_addr",
            tag: 0x07,
        });
        let cli = session_error("config failed", err);
        assert_eq!(cli.code, DATA_INVALID);
        assert!(cli.message.starts_with("config failed: "));
    }

    #[test]
    fn not_ready_is_plain_failure() {
        let err = SessionError::SessionNotReady {
            session_id: 1,
            state: None,
        };
        assert_eq!(session_error("config failed", err).code, FAILURE);
    }

    #[test]
    fn crc_mismatch_is_invalid_data() {
        let err = FrameError::CrcMismatch {
            calculated: 0x1234,
            received: 0x4321,
        };
        assert_eq!(frame_error("decode failed", err).code, DATA_INVALID);
    }
}
