//! FFI bindings for ApplicationServices (accessibility trust) and the
//! CoreFoundation calls needed to build its options dictionary.

#![allow(non_upper_case_globals, non_snake_case)]

use std::ffi::c_void;

/// Opaque `CFDictionaryKeyCallBacks` / `CFDictionaryValueCallBacks`; only
/// ever passed by address.
#[repr(C)]
pub struct CFDictionaryCallBacks {
    _private: [u8; 0],
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    pub fn CFRelease(obj: *const c_void);

    pub fn CFDictionaryCreate(
        allocator: *const c_void,
        keys: *const *const c_void,
        values: *const *const c_void,
        numValues: isize,
        keyCallBacks: *const CFDictionaryCallBacks,
        valueCallBacks: *const CFDictionaryCallBacks,
    ) -> *const c_void;

    pub static kCFBooleanTrue: *const c_void;
    pub static kCFBooleanFalse: *const c_void;
    pub static kCFTypeDictionaryKeyCallBacks: CFDictionaryCallBacks;
    pub static kCFTypeDictionaryValueCallBacks: CFDictionaryCallBacks;
}

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    pub fn AXIsProcessTrustedWithOptions(options: *const c_void) -> bool;

    pub static kAXTrustedCheckOptionPrompt: *const c_void;
}

/// Query accessibility trust, optionally surfacing the system prompt.
///
/// # Safety
/// Must be called with the ApplicationServices framework loaded (always true
/// for a linked binary). Safe from any thread.
pub unsafe fn is_process_trusted(prompt: bool) -> bool {
    let keys = [kAXTrustedCheckOptionPrompt];
    let values = [if prompt { kCFBooleanTrue } else { kCFBooleanFalse }];

    let dict = CFDictionaryCreate(
        std::ptr::null(),
        keys.as_ptr(),
        values.as_ptr(),
        1,
        &kCFTypeDictionaryKeyCallBacks,
        &kCFTypeDictionaryValueCallBacks,
    );

    let trusted = AXIsProcessTrustedWithOptions(dict);

    if !dict.is_null() {
        CFRelease(dict);
    }
    trusted
}
