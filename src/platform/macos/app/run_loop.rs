//! Main run-loop integration.
//!
//! The orchestrator is parked in a thread-local on the main thread. A
//! repeating NSTimer in the common run-loop modes (so it keeps firing while
//! menus are open) calls `pump()`, and a termination observer unregisters
//! the hotkey before the process exits.

use std::cell::RefCell;

use tracing::{debug, warn};

use crate::app::Orchestrator;
use crate::model::PUMP_INTERVAL_SECS;
use crate::platform::macos::ffi::bridge::{class, id, msg_send, nil, nsstring_id, RcBlock, YES};

thread_local! {
    static ORCHESTRATOR: RefCell<Option<Orchestrator>> = const { RefCell::new(None) };
}

/// Run `f` against the parked orchestrator. Returns `None` if there is none
/// or it is already borrowed (re-entrant run-loop callback).
pub fn with_orchestrator<R>(f: impl FnOnce(&mut Orchestrator) -> R) -> Option<R> {
    ORCHESTRATOR.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => slot.as_mut().map(f),
        Err(_) => {
            warn!("Orchestrator busy, skipping re-entrant call");
            None
        }
    })
}

/// Park `orchestrator` on this thread and start pumping it.
///
/// # Safety
/// Must be called from the main thread inside an autorelease pool.
pub unsafe fn install_pump_timer(orchestrator: Orchestrator) -> id {
    ORCHESTRATOR.with(|cell| {
        if let Ok(mut slot) = cell.try_borrow_mut() {
            *slot = Some(orchestrator);
        }
    });

    let block = RcBlock::new(|_timer: id| {
        with_orchestrator(|app| app.pump());
    });

    let timer: id = msg_send![
        class!(NSTimer),
        timerWithTimeInterval: PUMP_INTERVAL_SECS,
        repeats: YES,
        block: &*block
    ];
    let run_loop: id = msg_send![class!(NSRunLoop), currentRunLoop];
    let _: () = msg_send![run_loop, addTimer: timer, forMode: nsstring_id("kCFRunLoopCommonModes")];
    debug!(interval = PUMP_INTERVAL_SECS, "Pump timer installed");
    timer
}

/// Unregister the hotkey and hide the overlay when the app terminates.
///
/// # Safety
/// Must be called from the main thread inside an autorelease pool.
pub unsafe fn install_termination_observer() {
    let center: id = msg_send![class!(NSNotificationCenter), defaultCenter];

    let block = RcBlock::new(|_note: id| {
        with_orchestrator(|app| app.shutdown());
        ORCHESTRATOR.with(|cell| {
            if let Ok(mut slot) = cell.try_borrow_mut() {
                slot.take();
            }
        });
    });

    let name = nsstring_id("NSApplicationWillTerminateNotification");
    let _: id = msg_send![
        center,
        addObserverForName: name,
        object: nil,
        queue: nil,
        usingBlock: &*block
    ];
}
