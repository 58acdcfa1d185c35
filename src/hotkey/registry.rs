//! Binding id → activation route map.
//!
//! The OS hotkey callback is a plain `extern "C"` function with no access to
//! the registrar. It looks the received binding id up here and, on a match,
//! publishes the activation onto the main-thread bus. Nothing else happens on
//! the callback thread.
//!
//! # Design
//!
//! - One process-wide registry in a `OnceLock`, reachable from the callback
//! - Routes are tagged with the owning registrar so a stale registrar can
//!   never remove a newer registrar's route
//! - The map sits behind a `Mutex`; a poisoned lock is recovered, the map is
//!   always left consistent

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::trace;

use super::{OsStatus, EVENT_NOT_HANDLED_ERR, NO_ERR};
use crate::events::{AppEvent, EventPublisher};
use crate::model::BindingId;

/// Whether the callback claimed the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Handled,
    NotHandled,
}

impl EventDisposition {
    /// Status returned to the OS: `noErr` or `eventNotHandledErr`.
    pub fn os_status(&self) -> OsStatus {
        match self {
            EventDisposition::Handled => NO_ERR,
            EventDisposition::NotHandled => EVENT_NOT_HANDLED_ERR,
        }
    }
}

struct ActivationRoute {
    owner: u64,
    publisher: EventPublisher,
}

#[derive(Default)]
pub struct HotkeyRegistry {
    routes: Mutex<HashMap<BindingId, ActivationRoute>>,
    next_owner: AtomicU64,
}

static GLOBAL: OnceLock<Arc<HotkeyRegistry>> = OnceLock::new();

/// The process-wide registry used by the OS callback.
pub fn global() -> &'static Arc<HotkeyRegistry> {
    GLOBAL.get_or_init(|| Arc::new(HotkeyRegistry::new()))
}

impl HotkeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an owner token for a registrar.
    pub fn next_owner(&self) -> u64 {
        self.next_owner.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BindingId, ActivationRoute>> {
        self.routes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Route activations of `id` to `publisher`, replacing any previous route.
    pub fn insert(&self, id: BindingId, owner: u64, publisher: EventPublisher) {
        self.lock().insert(id, ActivationRoute { owner, publisher });
    }

    /// Remove the route for `id` if `owner` installed it. Returns whether a
    /// route was removed.
    pub fn remove(&self, id: BindingId, owner: u64) -> bool {
        let mut routes = self.lock();
        match routes.get(&id) {
            Some(route) if route.owner == owner => {
                routes.remove(&id);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, id: BindingId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Publish an activation for `received` if a route exists.
    pub fn dispatch(&self, received: BindingId) -> EventDisposition {
        let routes = self.lock();
        match routes.get(&received) {
            Some(route) => {
                route.publisher.publish(AppEvent::HotkeyActivated(received));
                EventDisposition::Handled
            }
            None => {
                trace!(id = %received, "No route for hotkey event");
                EventDisposition::NotHandled
            }
        }
    }

    /// Callback entry point for a handler scoped to `expected`.
    ///
    /// Events for any other binding are left for other handlers.
    pub fn dispatch_scoped(&self, expected: BindingId, received: BindingId) -> EventDisposition {
        if expected != received {
            return EventDisposition::NotHandled;
        }
        self.dispatch(received)
    }
}
