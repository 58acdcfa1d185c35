//! AppKit UI.

pub mod window;

pub use window::CocoaOverlayWindow;
