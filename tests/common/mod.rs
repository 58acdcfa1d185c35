//! Fake OS backends and a test harness around the orchestrator.
//!
//! Each fake shares its state through `Rc<RefCell<_>>` so tests can inspect
//! it after the fake has been boxed into the component under test.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use hotchat::app::{Orchestrator, Platform};
use hotchat::bridge::{pair, BridgeCall, BridgeConfig, BridgeEvent, MessageBridge};
use hotchat::hotkey::{HandlerRef, HotkeyBackend, HotkeyRef, HotkeyRegistry, OsStatus, NO_ERR};
use hotchat::model::{Binding, BindingId};
use hotchat::overlay::{Frame, WindowBackend};
use hotchat::permission::TrustProvider;
use hotchat::storage::AppConfig;
use tokio::runtime::Handle;

// === Hotkeys ===

#[derive(Debug, Default)]
pub struct HotkeyLog {
    pub live_hotkeys: usize,
    pub live_handlers: usize,
    pub max_live_handlers: usize,
    pub register_calls: usize,
    pub unregister_calls: usize,
    pub install_calls: usize,
    pub remove_calls: usize,
    pub handler_ids: Vec<BindingId>,
    pub fail_register: Option<OsStatus>,
    pub fail_install: Option<OsStatus>,
    next_ref: usize,
}

#[derive(Clone, Default)]
pub struct FakeHotkeys(pub Rc<RefCell<HotkeyLog>>);

impl FakeHotkeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> std::cell::Ref<'_, HotkeyLog> {
        self.0.borrow()
    }

    pub fn fail_register(&self, status: Option<OsStatus>) {
        self.0.borrow_mut().fail_register = status;
    }

    pub fn fail_install(&self, status: Option<OsStatus>) {
        self.0.borrow_mut().fail_install = status;
    }
}

impl HotkeyBackend for FakeHotkeys {
    fn register_hotkey(&mut self, _binding: &Binding) -> Result<HotkeyRef, OsStatus> {
        let mut log = self.0.borrow_mut();
        log.register_calls += 1;
        if let Some(status) = log.fail_register {
            return Err(status);
        }
        log.live_hotkeys += 1;
        log.next_ref += 1;
        Ok(HotkeyRef(log.next_ref))
    }

    fn unregister_hotkey(&mut self, _hotkey: HotkeyRef) -> OsStatus {
        let mut log = self.0.borrow_mut();
        log.unregister_calls += 1;
        log.live_hotkeys -= 1;
        NO_ERR
    }

    fn install_handler(&mut self, id: BindingId) -> Result<HandlerRef, OsStatus> {
        let mut log = self.0.borrow_mut();
        log.install_calls += 1;
        if let Some(status) = log.fail_install {
            return Err(status);
        }
        log.live_handlers += 1;
        log.max_live_handlers = log.max_live_handlers.max(log.live_handlers);
        log.handler_ids.push(id);
        log.next_ref += 1;
        Ok(HandlerRef(log.next_ref))
    }

    fn remove_handler(&mut self, _handler: HandlerRef) -> OsStatus {
        let mut log = self.0.borrow_mut();
        log.remove_calls += 1;
        log.live_handlers -= 1;
        NO_ERR
    }
}

// === Window ===

#[derive(Debug, Default)]
pub struct WindowLog {
    pub on_screen: bool,
    pub focus: bool,
    pub shows: Vec<Frame>,
    pub resizes: Vec<Frame>,
    pub hides: usize,
    pub activations: usize,
    pub display: Option<Frame>,
}

#[derive(Clone, Default)]
pub struct FakeWindow(pub Rc<RefCell<WindowLog>>);

impl FakeWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> std::cell::Ref<'_, WindowLog> {
        self.0.borrow()
    }

    pub fn set_focus(&self, focus: bool) {
        self.0.borrow_mut().focus = focus;
    }

    pub fn set_display(&self, display: Option<Frame>) {
        self.0.borrow_mut().display = display;
    }
}

impl WindowBackend for FakeWindow {
    fn show(&mut self, frame: Frame) {
        let mut log = self.0.borrow_mut();
        log.on_screen = true;
        log.shows.push(frame);
    }

    fn hide(&mut self) {
        let mut log = self.0.borrow_mut();
        log.on_screen = false;
        log.hides += 1;
    }

    fn set_frame(&mut self, frame: Frame) {
        self.0.borrow_mut().resizes.push(frame);
    }

    fn has_focus(&self) -> bool {
        let log = self.0.borrow();
        log.on_screen && log.focus
    }

    fn activate_process(&mut self) {
        self.0.borrow_mut().activations += 1;
    }

    fn primary_display(&self) -> Option<Frame> {
        self.0.borrow().display
    }
}

// === Trust ===

#[derive(Clone)]
pub struct FakeTrust {
    pub trusted: Rc<Cell<bool>>,
    pub prompts: Rc<Cell<u32>>,
}

impl FakeTrust {
    pub fn new(trusted: bool) -> Self {
        Self {
            trusted: Rc::new(Cell::new(trusted)),
            prompts: Rc::new(Cell::new(0)),
        }
    }

    pub fn set(&self, trusted: bool) {
        self.trusted.set(trusted);
    }
}

impl TrustProvider for FakeTrust {
    fn is_trusted(&self, prompt: bool) -> bool {
        if prompt {
            self.prompts.set(self.prompts.get() + 1);
        }
        self.trusted.get()
    }
}

// === Harness ===

pub struct Harness {
    pub app: Orchestrator,
    /// Application side of the bridge.
    pub peer: MessageBridge,
    pub hotkeys: FakeHotkeys,
    pub window: FakeWindow,
    pub trust: FakeTrust,
    pub registry: Arc<HotkeyRegistry>,
}

/// Build an orchestrator with fake backends on the current tokio runtime.
pub fn harness(config: AppConfig) -> Harness {
    harness_with(config, true)
}

pub fn harness_with(config: AppConfig, trusted: bool) -> Harness {
    let hotkeys = FakeHotkeys::new();
    let window = FakeWindow::new();
    let trust = FakeTrust::new(trusted);
    let registry = Arc::new(HotkeyRegistry::new());
    let (native, peer) = pair(&config.bridge());

    let platform = Platform {
        trust: Box::new(trust.clone()),
        hotkeys: Box::new(hotkeys.clone()),
        window: Box::new(window.clone()),
    };
    let app = Orchestrator::new(config, platform, registry.clone(), native, Handle::current());

    Harness {
        app,
        peer,
        hotkeys,
        window,
        trust,
        registry,
    }
}

impl Harness {
    /// Simulate the OS delivering a hotkey press for `id` to the handler
    /// installed for the configured binding.
    pub fn press(&self, id: BindingId) -> hotchat::hotkey::EventDisposition {
        self.registry.dispatch_scoped(self.app.binding().id, id)
    }

    /// All events the native side has emitted so far.
    pub fn drain_peer_events(&mut self) -> Vec<BridgeEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.peer.try_next_event() {
            events.push(event);
        }
        events
    }

    pub fn next_peer_call(&mut self) -> Option<BridgeCall> {
        self.peer.try_next_call()
    }
}

/// Let spawned tasks run and deliver their results onto the bus.
pub async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub fn config() -> AppConfig {
    AppConfig::default()
}

pub fn default_bridge() -> BridgeConfig {
    BridgeConfig::default()
}
