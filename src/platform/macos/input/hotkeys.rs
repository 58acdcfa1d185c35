//! Carbon hotkey backend.
//!
//! Each installed handler carries its binding id packed into the handler's
//! user-data pointer. The trampoline reads the pressed hotkey's id from the
//! event, compares it with that packed id, and hands matches to the global
//! [`HotkeyRegistry`](crate::hotkey::HotkeyRegistry), which publishes onto
//! the main-thread bus. It never touches application state directly.

use std::ffi::c_void;

use tracing::trace;

use crate::hotkey::registry::{self, EventDisposition};
use crate::hotkey::{
    HandlerRef, HotkeyBackend, HotkeyRef, OsStatus, EVENT_NOT_HANDLED_ERR, NO_ERR,
};
use crate::model::{Binding, BindingId};
use crate::platform::macos::ffi::{
    EventHandlerCallRef, EventHandlerRef, EventHotKeyID, EventHotKeyRef, EventRef, EventTypeSpec,
    GetApplicationEventTarget, GetEventClass, GetEventKind, GetEventParameter, InstallEventHandler,
    RegisterEventHotKey, RemoveEventHandler, UnregisterEventHotKey, K_EVENT_CLASS_KEYBOARD,
    K_EVENT_HOTKEY_PRESSED, K_EVENT_PARAM_DIRECT_OBJECT, TYPE_EVENT_HOTKEY_ID,
};

/// `RegisterEventHotKey` reported success but returned no ref.
const NULL_REF_STATUS: OsStatus = -50; // paramErr

/// Carbon Event Manager implementation of [`HotkeyBackend`].
///
/// Must be used from the main thread.
#[derive(Debug, Default)]
pub struct CarbonHotkeys;

impl CarbonHotkeys {
    pub fn new() -> Self {
        Self
    }
}

fn pack_id(id: BindingId) -> *mut c_void {
    (((id.signature as u64) << 32) | id.id as u64) as usize as *mut c_void
}

fn unpack_id(ptr: *mut c_void) -> BindingId {
    let raw = ptr as usize as u64;
    BindingId::new((raw >> 32) as u32, raw as u32)
}

impl HotkeyBackend for CarbonHotkeys {
    fn register_hotkey(&mut self, binding: &Binding) -> Result<HotkeyRef, OsStatus> {
        let hk_id = EventHotKeyID {
            signature: binding.id.signature,
            id: binding.id.id,
        };
        let mut out_ref: EventHotKeyRef = std::ptr::null_mut();
        let status = unsafe {
            RegisterEventHotKey(
                binding.key_code,
                binding.modifiers,
                hk_id,
                GetApplicationEventTarget(),
                0,
                &mut out_ref,
            )
        };
        if status != NO_ERR {
            return Err(status);
        }
        if out_ref.is_null() {
            return Err(NULL_REF_STATUS);
        }
        Ok(HotkeyRef(out_ref as usize))
    }

    fn unregister_hotkey(&mut self, hotkey: HotkeyRef) -> OsStatus {
        unsafe { UnregisterEventHotKey(hotkey.0 as EventHotKeyRef) }
    }

    fn install_handler(&mut self, id: BindingId) -> Result<HandlerRef, OsStatus> {
        let types = [EventTypeSpec {
            event_class: K_EVENT_CLASS_KEYBOARD,
            event_kind: K_EVENT_HOTKEY_PRESSED,
        }];
        let mut handler_ref: EventHandlerRef = std::ptr::null_mut();
        let status = unsafe {
            InstallEventHandler(
                GetApplicationEventTarget(),
                hotkey_trampoline,
                types.len() as u32,
                types.as_ptr(),
                pack_id(id),
                &mut handler_ref,
            )
        };
        if status != NO_ERR {
            return Err(status);
        }
        Ok(HandlerRef(handler_ref as usize))
    }

    fn remove_handler(&mut self, handler: HandlerRef) -> OsStatus {
        unsafe { RemoveEventHandler(handler.0 as EventHandlerRef) }
    }
}

/// Carbon callback for hotkey-pressed events.
///
/// Runs on a thread the OS picks. Must not panic and must not block.
extern "C" fn hotkey_trampoline(
    _call_ref: EventHandlerCallRef,
    event: EventRef,
    user_data: *mut c_void,
) -> OsStatus {
    unsafe {
        if GetEventClass(event) != K_EVENT_CLASS_KEYBOARD
            || GetEventKind(event) != K_EVENT_HOTKEY_PRESSED
        {
            return EVENT_NOT_HANDLED_ERR;
        }

        let mut hot_id = EventHotKeyID {
            signature: 0,
            id: 0,
        };
        let status = GetEventParameter(
            event,
            K_EVENT_PARAM_DIRECT_OBJECT,
            TYPE_EVENT_HOTKEY_ID,
            std::ptr::null_mut(),
            std::mem::size_of::<EventHotKeyID>() as u32,
            std::ptr::null_mut(),
            &mut hot_id as *mut _ as *mut c_void,
        );
        if status != NO_ERR {
            trace!(status, "Hotkey event without an id");
            return EVENT_NOT_HANDLED_ERR;
        }

        let received = BindingId::new(hot_id.signature, hot_id.id);
        let disposition = registry::global().dispatch_scoped(unpack_id(user_data), received);
        if disposition == EventDisposition::NotHandled {
            trace!(id = %received, "Hotkey event left for other handlers");
        }
        disposition.os_status()
    }
}
