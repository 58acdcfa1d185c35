//! Wires the hotkey, permission, overlay and bridge components together.
//!
//! The orchestrator lives on the main thread and is the only owner of
//! mutable application state. Other threads reach it through the event bus
//! or the bridge queues, both drained by [`Orchestrator::pump`].

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::bridge::protocol::{
    self, HOTKEY_ACTIVATED, HOTKEY_REGISTERED, HOTKEY_UNREGISTERED, PERMISSION_STATUS_CHANGED,
    SEND_MESSAGE, START_VOICE_RECORDING,
};
use crate::bridge::{BridgeError, ListenerId, Listeners, MessageBridge, SendMessageReply};
use crate::events::{AppEvent, EventBus, EventPublisher};
use crate::handlers::{dispatcher, inbound};
use crate::hotkey::{HotkeyBackend, HotkeyError, HotkeyRegistrar, HotkeyRegistry, RegistrationState};
use crate::model::{Binding, ChatLog, ChatMessage};
use crate::overlay::{OverlayWindowController, WindowBackend, WindowVisibility};
use crate::permission::{PermissionGate, PermissionState, TrustProvider};
use crate::storage::AppConfig;
use crate::timers::Timers;

/// Native backends for the three OS seams.
pub struct Platform {
    pub trust: Box<dyn TrustProvider>,
    pub hotkeys: Box<dyn HotkeyBackend>,
    pub window: Box<dyn WindowBackend>,
}

pub struct Orchestrator {
    pub(crate) config: AppConfig,
    pub(crate) bus: EventBus,
    pub(crate) timers: Timers,
    pub(crate) gate: PermissionGate,
    pub(crate) registrar: HotkeyRegistrar,
    pub(crate) overlay: OverlayWindowController,
    pub(crate) bridge: MessageBridge,
    pub(crate) listeners: Listeners,
    pub(crate) chat: ChatLog,
}

impl Orchestrator {
    /// Build the orchestrator around the native side of `bridge`.
    ///
    /// `runtime` drives timers and bridge replies; it must outlive the
    /// orchestrator.
    pub fn new(
        config: AppConfig,
        platform: Platform,
        registry: Arc<HotkeyRegistry>,
        bridge: MessageBridge,
        runtime: Handle,
    ) -> Self {
        let binding = config.binding_or_default();
        Self::with_binding(config, binding, platform, registry, bridge, runtime)
    }

    pub fn with_binding(
        config: AppConfig,
        binding: Binding,
        platform: Platform,
        registry: Arc<HotkeyRegistry>,
        bridge: MessageBridge,
        runtime: Handle,
    ) -> Self {
        let bus = EventBus::new();
        let timers = Timers::new(runtime, bus.publisher());
        let gate = PermissionGate::new(platform.trust).with_retry_delay(config.permission_retry());
        let registrar = HotkeyRegistrar::new(binding, platform.hotkeys, registry, bus.publisher())
            .with_enabled(config.hotkey_enabled)
            .with_required_permission(config.require_permission);
        let overlay = OverlayWindowController::new(platform.window).with_auto_hide(config.auto_hide());

        Self {
            config,
            bus,
            timers,
            gate,
            registrar,
            overlay,
            bridge,
            listeners: Listeners::new(),
            chat: ChatLog::new(),
        }
    }

    // === Lifecycle ===

    /// Poll permission (surfacing the OS prompt if needed) and perform the
    /// first registration.
    pub fn start(&mut self) -> Result<RegistrationState, HotkeyError> {
        info!(binding = %self.registrar.binding(), "Starting");
        let before = self.gate.state();
        self.gate.check(true);
        self.notify_permission(before);
        self.register_hotkey()
    }

    /// Process everything queued for the main thread: bus events first,
    /// then inbound calls, then inbound events. Returns the number of items
    /// handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;

        for event in self.bus.drain() {
            dispatcher::dispatch(self, event);
            handled += 1;
        }
        while let Some(call) = self.bridge.try_next_call() {
            inbound::answer(self, call);
            handled += 1;
        }
        while let Some(event) = self.bridge.try_next_event() {
            dispatcher::deliver(self, event);
            handled += 1;
        }

        handled
    }

    pub fn shutdown(&mut self) {
        self.overlay.hide();
        self.registrar.unregister();
        info!("Shut down");
    }

    // === Hotkey ===

    /// Toggle the overlay; fetch recent history when it opens.
    pub fn on_activation(&mut self) -> WindowVisibility {
        self.bridge.emit(HOTKEY_ACTIVATED, json!({}));
        let visibility = self.overlay.toggle(&self.timers);
        if visibility == WindowVisibility::Visible {
            self.load_recent_messages();
        }
        visibility
    }

    pub fn register_hotkey(&mut self) -> Result<RegistrationState, HotkeyError> {
        let before = self.gate.state();
        let result = self.registrar.register(&mut self.gate);
        self.after_registration(before, &result);
        result
    }

    pub fn unregister_hotkey(&mut self) {
        self.registrar.unregister();
        self.bridge.emit(HOTKEY_UNREGISTERED, json!({}));
    }

    pub fn set_hotkey_enabled(&mut self, enabled: bool) -> Result<RegistrationState, HotkeyError> {
        info!(enabled, "Hotkey enabled state changed");
        if enabled {
            let before = self.gate.state();
            let result = self.registrar.set_enabled(true, &mut self.gate);
            self.after_registration(before, &result);
            result
        } else {
            let was_registered = self.registrar.is_registered();
            let result = self.registrar.set_enabled(false, &mut self.gate);
            if was_registered {
                self.bridge.emit(HOTKEY_UNREGISTERED, json!({}));
            }
            result
        }
    }

    fn after_registration(
        &mut self,
        before: PermissionState,
        result: &Result<RegistrationState, HotkeyError>,
    ) {
        self.notify_permission(before);
        match result {
            Ok(RegistrationState::Registered) => {
                self.bridge.emit(HOTKEY_REGISTERED, json!({ "success": true }));
            }
            Ok(RegistrationState::Unregistered) => {
                debug!("Hotkey left unregistered (disabled)");
            }
            Err(e) => {
                self.bridge.emit(
                    HOTKEY_REGISTERED,
                    json!({ "success": false, "error": e.to_string(), "status": e.status() }),
                );
            }
        }
    }

    // === Permission ===

    /// Poll without prompting.
    pub fn check_permission(&mut self) -> PermissionState {
        let before = self.gate.state();
        let state = self.gate.check(false);
        self.notify_permission(before);
        state
    }

    /// Prompt, then retry registration once after the configured delay.
    pub fn request_permission(&mut self) -> PermissionState {
        let before = self.gate.state();
        let state = self.gate.request_and_retry(&self.timers);
        self.notify_permission(before);
        state
    }

    fn notify_permission(&self, before: PermissionState) {
        let now = self.gate.state();
        if now != before {
            self.bridge.emit(
                PERMISSION_STATUS_CHANGED,
                json!({ "hasPermission": now.is_granted() }),
            );
        }
    }

    // === Overlay ===

    pub fn show_overlay(&mut self) {
        if self.overlay.is_visible() {
            return;
        }
        self.overlay.show(&self.timers);
        self.load_recent_messages();
    }

    pub fn hide_overlay(&mut self) {
        self.overlay.hide();
    }

    pub(crate) fn refresh_footprint(&mut self) {
        self.overlay.set_expanded(self.chat.is_expanded());
    }

    // === Outbound calls ===

    fn load_recent_messages(&self) {
        let limit = self.config.recent_message_limit;
        debug!(limit, "Fetching recent messages");
        let reply = protocol::recent_messages(self.bridge.invoker(), limit);
        self.timers.complete_with(reply, AppEvent::HistoryLoaded);
    }

    /// Append a user message and send it to the application layer. The
    /// reply is appended when it arrives.
    pub fn submit_message(&mut self, text: &str) -> Result<ChatMessage, BridgeError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BridgeError::invalid_arguments("message is required"));
        }
        let message = self.chat.push_user(text);
        self.refresh_footprint();

        let reply = self.bridge.invoker().invoke_as::<SendMessageReply>(
            SEND_MESSAGE,
            json!({ "message": text, "timestamp": message.timestamp }),
        );
        self.timers.complete_with(reply, AppEvent::MessageReplied);
        Ok(message)
    }

    pub fn start_voice_recording(&self) {
        let reply = self.bridge.invoke(START_VOICE_RECORDING, json!({}));
        self.timers.complete_with(reply, AppEvent::VoiceRecordingAck);
    }

    // === Listeners ===

    pub fn listen<F>(&mut self, name: &str, listener: F) -> ListenerId
    where
        F: FnMut(&Value) + 'static,
    {
        self.listeners.listen(name, listener)
    }

    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.listeners.unlisten(id)
    }

    // === Accessors ===

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn visibility(&self) -> WindowVisibility {
        self.overlay.visibility()
    }

    pub fn is_expanded(&self) -> bool {
        self.overlay.is_expanded()
    }

    pub fn overlay_session(&self) -> u64 {
        self.overlay.session()
    }

    pub fn registration_state(&self) -> RegistrationState {
        self.registrar.state()
    }

    pub fn hotkey_enabled(&self) -> bool {
        self.registrar.is_enabled()
    }

    pub fn binding(&self) -> &Binding {
        self.registrar.binding()
    }

    pub fn permission_state(&self) -> PermissionState {
        self.gate.state()
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// Publisher for the main-thread queue.
    pub fn publisher(&self) -> EventPublisher {
        self.bus.publisher()
    }
}
