use crate::types::SessionState;

/// Errors raised while building a session configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    /// A parameter that must be set explicitly is still at its default.
    #[error("{name} (tag 0x{tag:02X}) is mandatory and must be set")]
    MissingRequired { name: &'static str, tag: u16 },

    /// A setter received a value outside its accepted set.
    #[error("{name} value {value} out of range ({allowed})")]
    OutOfRange {
        name: &'static str,
        value: i64,
        allowed: &'static str,
    },
}

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session is unknown, or not in a state that accepts the operation.
    /// Nothing was transmitted.
    #[error(
        "session 0x{session_id:08X} not ready ({})",
        .state.map_or_else(|| "never initialized".to_string(), |s| format!("state {s}"))
    )]
    SessionNotReady {
        session_id: u32,
        state: Option<SessionState>,
    },

    /// Configuration could not be built.
    #[error("parameter error: {0}")]
    Param(#[from] ParamError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] uwbuci_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] uwbuci_frame::FrameError),

    /// Parameter file could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
