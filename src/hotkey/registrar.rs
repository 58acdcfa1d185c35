//! Registration state machine for one global hotkey.
//!
//! `register()` is idempotent: it always tears down whatever is live before
//! asking the OS again, so repeated calls never leave two handlers installed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::registry::HotkeyRegistry;
use super::{HandlerRef, HotkeyBackend, HotkeyError, HotkeyRef, NO_ERR};
use crate::events::EventPublisher;
use crate::model::{Binding, BindingId};
use crate::permission::PermissionGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Unregistered,
    Registered,
}

pub struct HotkeyRegistrar {
    binding: Binding,
    backend: Box<dyn HotkeyBackend>,
    registry: Arc<HotkeyRegistry>,
    publisher: EventPublisher,
    owner: u64,
    hotkey: Option<HotkeyRef>,
    handler: Option<HandlerRef>,
    enabled: bool,
    require_permission: bool,
}

impl HotkeyRegistrar {
    pub fn new(
        binding: Binding,
        backend: Box<dyn HotkeyBackend>,
        registry: Arc<HotkeyRegistry>,
        publisher: EventPublisher,
    ) -> Self {
        let owner = registry.next_owner();
        Self {
            binding,
            backend,
            registry,
            publisher,
            owner,
            hotkey: None,
            handler: None,
            enabled: true,
            require_permission: false,
        }
    }

    /// Refuse to register unless the permission poll reports Granted.
    pub fn with_required_permission(mut self, require: bool) -> Self {
        self.require_permission = require;
        self
    }

    /// Desired state to start from; takes effect on the next `register()`.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn binding_id(&self) -> BindingId {
        self.binding.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn state(&self) -> RegistrationState {
        if self.hotkey.is_some() {
            RegistrationState::Registered
        } else {
            RegistrationState::Unregistered
        }
    }

    pub fn is_registered(&self) -> bool {
        self.state() == RegistrationState::Registered
    }

    /// Register the binding with the OS, replacing any live registration.
    ///
    /// Returns `Unregistered` without touching the OS when the desired state
    /// is disabled.
    pub fn register(
        &mut self,
        gate: &mut PermissionGate,
    ) -> Result<RegistrationState, HotkeyError> {
        self.unregister();

        if !self.enabled {
            debug!(binding = %self.binding, "Hotkey disabled, not registering");
            return Ok(RegistrationState::Unregistered);
        }

        let permission = gate.check(false);
        if !permission.is_granted() {
            if self.require_permission {
                warn!(binding = %self.binding, %permission, "Hotkey registration needs permission");
                return Err(HotkeyError::PermissionDenied(permission));
            }
            debug!(%permission, "Registering hotkey without confirmed permission");
        }

        let hotkey = self.backend.register_hotkey(&self.binding).map_err(|status| {
            warn!(binding = %self.binding, status, "RegisterEventHotKey failed");
            HotkeyError::RegistrationFailed { status }
        })?;

        let handler = match self.backend.install_handler(self.binding.id) {
            Ok(handler) => handler,
            Err(status) => {
                warn!(binding = %self.binding, status, "InstallEventHandler failed, rolling back");
                let undo = self.backend.unregister_hotkey(hotkey);
                if undo != NO_ERR {
                    warn!(status = undo, "UnregisterEventHotKey failed during rollback");
                }
                return Err(HotkeyError::HandlerInstallFailed { status });
            }
        };

        self.hotkey = Some(hotkey);
        self.handler = Some(handler);
        self.registry
            .insert(self.binding.id, self.owner, self.publisher.clone());

        info!(binding = %self.binding, id = %self.binding.id, "Hotkey registered");
        Ok(RegistrationState::Registered)
    }

    /// Remove the handler, the OS registration and the route. No-op when
    /// nothing is registered.
    pub fn unregister(&mut self) {
        if let Some(handler) = self.handler.take() {
            let status = self.backend.remove_handler(handler);
            if status != NO_ERR {
                warn!(status, "RemoveEventHandler failed");
            }
        }
        if let Some(hotkey) = self.hotkey.take() {
            let status = self.backend.unregister_hotkey(hotkey);
            if status != NO_ERR {
                warn!(status, "UnregisterEventHotKey failed");
            }
            debug!(binding = %self.binding, "Hotkey unregistered");
        }
        self.registry.remove(self.binding.id, self.owner);
    }

    /// Store the desired state and apply it.
    pub fn set_enabled(
        &mut self,
        enabled: bool,
        gate: &mut PermissionGate,
    ) -> Result<RegistrationState, HotkeyError> {
        self.enabled = enabled;
        if enabled {
            self.register(gate)
        } else {
            self.unregister();
            Ok(RegistrationState::Unregistered)
        }
    }
}

impl Drop for HotkeyRegistrar {
    fn drop(&mut self) {
        self.unregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::hotkey::OsStatus;
    use crate::permission::{PermissionState, TrustProvider};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        calls: Vec<&'static str>,
        fail_register: Option<OsStatus>,
        fail_install: Option<OsStatus>,
    }

    struct Recorder(Rc<RefCell<Log>>);

    impl HotkeyBackend for Recorder {
        fn register_hotkey(&mut self, _binding: &Binding) -> Result<HotkeyRef, OsStatus> {
            let mut log = self.0.borrow_mut();
            log.calls.push("register");
            log.fail_register.map_or(Ok(HotkeyRef(1)), Err)
        }
        fn unregister_hotkey(&mut self, _hotkey: HotkeyRef) -> OsStatus {
            self.0.borrow_mut().calls.push("unregister");
            NO_ERR
        }
        fn install_handler(&mut self, _id: BindingId) -> Result<HandlerRef, OsStatus> {
            let mut log = self.0.borrow_mut();
            log.calls.push("install");
            log.fail_install.map_or(Ok(HandlerRef(2)), Err)
        }
        fn remove_handler(&mut self, _handler: HandlerRef) -> OsStatus {
            self.0.borrow_mut().calls.push("remove");
            NO_ERR
        }
    }

    struct Fixed(bool);

    impl TrustProvider for Fixed {
        fn is_trusted(&self, _prompt: bool) -> bool {
            self.0
        }
    }

    fn setup(log: &Rc<RefCell<Log>>) -> (HotkeyRegistrar, Arc<HotkeyRegistry>, EventBus) {
        let bus = EventBus::new();
        let registry = Arc::new(HotkeyRegistry::new());
        let registrar = HotkeyRegistrar::new(
            Binding::default(),
            Box::new(Recorder(log.clone())),
            registry.clone(),
            bus.publisher(),
        );
        (registrar, registry, bus)
    }

    #[test]
    fn test_register_installs_route() {
        let log = Rc::new(RefCell::new(Log::default()));
        let (mut registrar, registry, _bus) = setup(&log);
        let mut gate = PermissionGate::new(Box::new(Fixed(true)));

        assert_eq!(
            registrar.register(&mut gate),
            Ok(RegistrationState::Registered)
        );
        assert!(registry.contains(BindingId::default()));
        assert_eq!(log.borrow().calls, vec!["register", "install"]);
    }

    #[test]
    fn test_second_register_tears_down_first() {
        let log = Rc::new(RefCell::new(Log::default()));
        let (mut registrar, _registry, _bus) = setup(&log);
        let mut gate = PermissionGate::new(Box::new(Fixed(true)));

        registrar.register(&mut gate).unwrap();
        registrar.register(&mut gate).unwrap();
        assert_eq!(
            log.borrow().calls,
            vec!["register", "install", "remove", "unregister", "register", "install"]
        );
    }

    #[test]
    fn test_install_failure_rolls_back() {
        let log = Rc::new(RefCell::new(Log {
            fail_install: Some(-50),
            ..Log::default()
        }));
        let (mut registrar, registry, _bus) = setup(&log);
        let mut gate = PermissionGate::new(Box::new(Fixed(true)));

        assert_eq!(
            registrar.register(&mut gate),
            Err(HotkeyError::HandlerInstallFailed { status: -50 })
        );
        assert_eq!(log.borrow().calls, vec!["register", "install", "unregister"]);
        assert_eq!(registrar.state(), RegistrationState::Unregistered);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_required_permission_blocks_os_call() {
        let log = Rc::new(RefCell::new(Log::default()));
        let (registrar, _registry, _bus) = setup(&log);
        let mut registrar = registrar.with_required_permission(true);
        let mut gate = PermissionGate::new(Box::new(Fixed(false)));

        assert_eq!(
            registrar.register(&mut gate),
            Err(HotkeyError::PermissionDenied(PermissionState::Denied))
        );
        assert!(log.borrow().calls.is_empty());
    }

    #[test]
    fn test_disabled_register_only_unregisters() {
        let log = Rc::new(RefCell::new(Log::default()));
        let (mut registrar, _registry, _bus) = setup(&log);
        let mut gate = PermissionGate::new(Box::new(Fixed(true)));

        registrar.register(&mut gate).unwrap();
        assert_eq!(
            registrar.set_enabled(false, &mut gate),
            Ok(RegistrationState::Unregistered)
        );
        assert_eq!(
            registrar.register(&mut gate),
            Ok(RegistrationState::Unregistered)
        );
        assert!(!registrar.is_enabled());
        assert_eq!(
            log.borrow().calls,
            vec!["register", "install", "remove", "unregister"]
        );
    }

    #[test]
    fn test_drop_unregisters() {
        let log = Rc::new(RefCell::new(Log::default()));
        let (mut registrar, registry, _bus) = setup(&log);
        let mut gate = PermissionGate::new(Box::new(Fixed(true)));

        registrar.register(&mut gate).unwrap();
        drop(registrar);
        assert!(registry.is_empty());
        assert_eq!(log.borrow().calls.last(), Some(&"unregister"));
    }
}
