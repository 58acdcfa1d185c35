//! Global hotkey registration.
//!
//! The OS side is hidden behind [`HotkeyBackend`] so the registrar's state
//! machine can be driven by a fake in tests. The real Carbon backend lives in
//! `platform::macos::input::hotkeys`.
//!
//! - [`registrar`]: `HotkeyRegistrar`, owner of one binding's registration
//! - [`registry`]: process-wide binding id → activation route map read by the
//!   OS callback
//! - [`error`]: `HotkeyError`

pub mod error;
pub mod registrar;
pub mod registry;

pub use error::HotkeyError;
pub use registrar::{HotkeyRegistrar, RegistrationState};
pub use registry::{EventDisposition, HotkeyRegistry};

use crate::model::{Binding, BindingId};

/// Carbon `OSStatus`.
pub type OsStatus = i32;

/// `noErr`
pub const NO_ERR: OsStatus = 0;

/// `eventNotHandledErr`: lets the event propagate to other handlers.
pub const EVENT_NOT_HANDLED_ERR: OsStatus = -9874;

/// Opaque handle to an OS hotkey registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeyRef(pub usize);

/// Opaque handle to an installed OS event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerRef(pub usize);

/// OS hotkey and event-handler API.
///
/// Failures carry the raw OS status code.
pub trait HotkeyBackend {
    fn register_hotkey(&mut self, binding: &Binding) -> Result<HotkeyRef, OsStatus>;

    fn unregister_hotkey(&mut self, hotkey: HotkeyRef) -> OsStatus;

    /// Install a hotkey-pressed handler that only claims events carrying `id`.
    fn install_handler(&mut self, id: BindingId) -> Result<HandlerRef, OsStatus>;

    fn remove_handler(&mut self, handler: HandlerRef) -> OsStatus;
}
