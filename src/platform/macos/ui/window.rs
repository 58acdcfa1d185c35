//! AppKit overlay window.
//!
//! A floating, title-less NSWindow. Its content (chat list and input field)
//! is drawn by the rendering layer; this type only owns placement,
//! visibility and focus.

use tracing::debug;

use crate::overlay::{Frame, WindowBackend};
use crate::platform::macos::ffi::bridge::{
    class, frame_from_rect, id, msg_send, nil, NSApp, NSBackingStoreType, NSRect,
    NSWindowStyleMask, NSWindowTitleVisibility, NO, YES,
};

// NSFloatingWindowLevel
const FLOATING_LEVEL: isize = 3;

pub struct CocoaOverlayWindow {
    window: id,
}

impl CocoaOverlayWindow {
    /// Create the (hidden) overlay window.
    ///
    /// # Safety
    /// Must be called from the main thread inside an autorelease pool, after
    /// NSApplication has been initialised.
    pub unsafe fn new(initial: Frame) -> Self {
        let rect: NSRect = initial.into();
        let style = NSWindowStyleMask::Titled | NSWindowStyleMask::FullSizeContentView;
        let window: id = msg_send![class!(NSWindow), alloc];
        let window: id = msg_send![
            window,
            initWithContentRect: rect,
            styleMask: style,
            backing: NSBackingStoreType::Buffered,
            defer: NO
        ];

        let _: () = msg_send![window, setReleasedWhenClosed: NO];
        let _: () = msg_send![window, setLevel: FLOATING_LEVEL];
        let _: () = msg_send![window, setTitleVisibility: NSWindowTitleVisibility::Hidden];
        let _: () = msg_send![window, setTitlebarAppearsTransparent: YES];
        let _: () = msg_send![window, setMovableByWindowBackground: YES];

        let background: id = msg_send![class!(NSColor), windowBackgroundColor];
        let _: () = msg_send![window, setBackgroundColor: background];

        Self { window }
    }
}

impl WindowBackend for CocoaOverlayWindow {
    fn show(&mut self, frame: Frame) {
        let rect: NSRect = frame.into();
        unsafe {
            let _: () = msg_send![self.window, setFrame: rect, display: YES];
            let _: () = msg_send![self.window, makeKeyAndOrderFront: nil];
        }
    }

    fn hide(&mut self) {
        unsafe {
            let _: () = msg_send![self.window, orderOut: nil];
        }
    }

    fn set_frame(&mut self, frame: Frame) {
        let rect: NSRect = frame.into();
        unsafe {
            let _: () = msg_send![self.window, setFrame: rect, display: YES, animate: YES];
        }
    }

    fn has_focus(&self) -> bool {
        unsafe { msg_send![self.window, isKeyWindow] }
    }

    fn activate_process(&mut self) {
        unsafe {
            let _: () = msg_send![NSApp(), activateIgnoringOtherApps: YES];
        }
    }

    fn primary_display(&self) -> Option<Frame> {
        unsafe {
            let screen: id = msg_send![class!(NSScreen), mainScreen];
            if screen == nil {
                debug!("No main screen");
                return None;
            }
            let rect: NSRect = msg_send![screen, frame];
            Some(frame_from_rect(rect))
        }
    }
}

impl Drop for CocoaOverlayWindow {
    fn drop(&mut self) {
        unsafe {
            let _: () = msg_send![self.window, orderOut: nil];
            let _: () = msg_send![self.window, release];
        }
    }
}
