//! UCI dispatch, session lifecycle and parameter model.
//!
//! Layers, bottom up:
//! - [`DispatchTable`]: `(GroupId, opcode)` to decoder maps for responses
//!   and notifications
//! - [`UciLayer`]: the UCI command set over one [`uwbuci_transport::UciPort`]
//! - [`RangingDevice`]: per-session state machine driven by status
//!   notifications
//! - [`SessionParams`]: FiRa and CCC configuration with default-diff TLV
//!   generation
//!
//! Device status codes are returned as data in [`DispatchResult`]; only
//! transport, framing and local precondition failures are errors.

pub mod cancel;
pub mod decoders;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod layer;
pub mod params;
mod reader;
pub mod ranging;
pub mod types;

pub use cancel::CancelToken;
pub use decoders::{Decoded, DeviceInfo};
pub use device::{RangingDevice, SessionTimeouts};
pub use dispatch::{Decoder, DispatchKey, DispatchResult, DispatchTable, Route};
pub use error::{ParamError, Result, SessionError};
pub use layer::{Controlee, MulticastAction, UciLayer, LICENSE_LEN};
pub use params::{CccSessionParams, FiraSessionParams, SessionParams};
pub use types::{
    device_role, device_type, DeviceState, ReasonCode, SessionState, SessionStatus, SessionType,
};
