//! macOS implementation using Carbon, ApplicationServices and AppKit.
//!
//! - FFI declarations for Carbon hotkeys, the accessibility trust query and
//!   the objc2 messaging helpers
//! - Input: Carbon hotkey backend and trust provider
//! - UI: the overlay NSWindow
//! - App: run-loop pump timer and termination observer

pub mod app;
pub mod ffi;
pub mod input;
pub mod ui;

pub use app::{install_pump_timer, install_termination_observer};
pub use input::{AxTrust, CarbonHotkeys};
pub use ui::CocoaOverlayWindow;
