//! Floating chat overlay: visibility, auto-hide and placement.
//!
//! The native window is behind [`WindowBackend`]; the AppKit implementation
//! lives in `platform::macos::ui::window`.

pub mod controller;
pub mod geometry;

pub use controller::{OverlayWindowController, WatchdogOutcome, WindowBackend, WindowVisibility};
pub use geometry::{Frame, OverlayLayout, Size};
