//! Duplex message bridge between the native layer and the application layer.
//!
//! Two primitives travel in each direction:
//!
//! - **Calls**: named-method requests with a correlation id, completed exactly
//!   once with a JSON payload or a structured [`BridgeError`]. No retries.
//! - **Events**: fire-and-forget notifications, FIFO per emitting side.
//!
//! # Module Structure
//!
//! - [`call`]: `BridgeCall` and `Invoker`
//! - [`channel`]: `MessageBridge` endpoints and [`pair`]
//! - [`listeners`]: per-event listener lists
//! - [`protocol`]: method names and payload shapes
//! - [`stdio`]: JSON-lines transport for an external application process
//! - [`error`]: error codes

pub mod call;
pub mod channel;
pub mod error;
pub mod listeners;
pub mod protocol;
pub mod stdio;

pub use call::{BridgeCall, CallResult, Invoker};
pub use channel::{pair, BridgeConfig, BridgeEvent, Emitter, MessageBridge};
pub use error::{BridgeError, BridgeErrorCode};
pub use listeners::{ListenerId, Listeners};
pub use protocol::{InboundMethod, SendMessageArgs, SendMessageReply};
