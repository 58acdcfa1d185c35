//! objc2 messaging helpers.
//!
//! AppKit is driven through raw `id` pointers and `msg_send!`. The aliases
//! here keep call sites short.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]

pub use objc2::runtime::{AnyObject, Bool};
pub use objc2::{class, msg_send};

pub use objc2_foundation::{NSPoint, NSRect, NSSize};

pub use objc2_app_kit::{
    NSApplicationActivationPolicy, NSBackingStoreType, NSWindowStyleMask, NSWindowTitleVisibility,
};

pub use objc2_core_foundation::CGFloat;

pub use block2::RcBlock;

use objc2_foundation::NSString;

/// Objective-C object pointer.
pub type id = *mut AnyObject;

pub const nil: id = std::ptr::null_mut();

/// Objective-C `YES` (BOOL, not Rust bool).
pub const YES: Bool = Bool::YES;

/// Objective-C `NO`.
pub const NO: Bool = Bool::NO;

/// The shared NSApplication instance.
#[inline]
#[allow(non_snake_case)]
pub fn NSApp() -> id {
    unsafe { msg_send![class!(NSApplication), sharedApplication] }
}

/// Create an NSString and return it as a raw `id`.
///
/// The string is retained and never released; use for long-lived constants.
pub fn nsstring_id(s: &str) -> id {
    let ns = NSString::from_str(s);
    objc2::rc::Retained::into_raw(ns) as id
}

/// Run a closure within an autorelease pool.
#[inline]
pub fn autoreleasepool<R, F: FnOnce() -> R>(f: F) -> R {
    unsafe {
        let pool: id = msg_send![class!(NSAutoreleasePool), new];
        let result = f();
        let _: () = msg_send![pool, drain];
        result
    }
}

impl From<crate::overlay::Frame> for NSRect {
    fn from(frame: crate::overlay::Frame) -> Self {
        NSRect::new(
            NSPoint::new(frame.x as CGFloat, frame.y as CGFloat),
            NSSize::new(frame.width as CGFloat, frame.height as CGFloat),
        )
    }
}

/// Convert an AppKit rect into an overlay frame.
pub fn frame_from_rect(rect: NSRect) -> crate::overlay::Frame {
    crate::overlay::Frame::new(
        rect.origin.x as f64,
        rect.origin.y as f64,
        rect.size.width as f64,
        rect.size.height as f64,
    )
}
