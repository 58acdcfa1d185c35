//! Global-hotkey chat overlay core.
//!
//! A system-wide hotkey toggles a floating chat overlay; a duplex message
//! bridge connects the native side to an application layer that produces
//! the replies. Everything outside `platform` is free of FFI so it builds
//! and tests on any host.

pub mod app;
pub mod bridge;
pub mod events;
pub mod handlers;
pub mod hotkey;
pub mod logging;
pub mod model;
pub mod overlay;
pub mod permission;
pub mod storage;
pub mod timers;

#[cfg(target_os = "macos")]
pub mod platform;

pub use app::{Orchestrator, Platform};
pub use bridge::{BridgeError, BridgeErrorCode, MessageBridge};
pub use events::{AppEvent, EventBus, EventPublisher};
pub use model::{Binding, BindingId, ChatLog, ChatMessage};
pub use overlay::WindowVisibility;
pub use permission::PermissionState;
