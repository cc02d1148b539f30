//! UWB Command Interface (UCI) protocol engine.
//!
//! uwbuci talks to FiRa and CCC ranging transceivers over a chip-select byte
//! channel with a two-line sideband handshake, and drives ranging sessions
//! through their lifecycle.
//!
//! # Crate Structure
//!
//! - [`frame`]: UCI packet codec, CRC-16/XMODEM trailer and config TLVs
//! - [`transport`]: handshake port over a [`transport::UciDevice`]
//! - [`session`]: dispatch tables, command layer, session state machine and
//!   the FiRa/CCC parameter model

/// Re-export frame types.
pub mod frame {
    pub use uwbuci_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use uwbuci_transport::*;
}

/// Re-export session types.
pub mod session {
    pub use uwbuci_session::*;
}
