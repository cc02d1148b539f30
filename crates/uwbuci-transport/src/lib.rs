//! Sideband-handshake transport for UCI devices.
//!
//! The device is reached through a chip-select byte channel plus two
//! active-low sideband lines:
//! - "ready": the device can accept a command
//! - "pending": the device has a frame to shift out
//!
//! [`UciDevice`] is the contract a physical driver implements; [`UciPort`]
//! runs the turn-taking protocol on top of it. [`ScriptedDevice`] is an
//! in-memory device for tests and simulation.

pub mod error;
pub mod port;
pub mod scripted;
pub mod traits;

pub use error::{Result, TransportError};
pub use port::{HeaderVariant, PortConfig, ReceivedFrame, SendOutcome, UciPort};
pub use scripted::{Responder, ScriptedDevice};
pub use traits::{HandshakeLine, Level, UciDevice};
