//! Application events for the main-thread work queue.
//!
//! Everything that must touch main-thread state (window visibility, chat log,
//! registration) arrives as an `AppEvent`: hotkey activations from the OS
//! callback thread, timer expiries, and completions of outbound bridge calls.
//! This module is pure Rust with no FFI dependencies.

use serde_json::Value;

use crate::bridge::{BridgeError, SendMessageReply};
use crate::model::{BindingId, ChatMessage};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    // === Input Events ===
    /// A registered hotkey fired. Carries the id read from the OS event.
    HotkeyActivated(BindingId),

    // === Timer Events ===
    /// Retry hotkey registration after a permission prompt.
    RetryRegistration,

    /// Auto-hide watchdog fired for the given visibility session.
    AutoHideCheck { session: u64 },

    // === Bridge Completions ===
    /// Reply to `getRecentMessages`.
    HistoryLoaded(Result<Vec<ChatMessage>, BridgeError>),

    /// Reply to `sendMessage`.
    MessageReplied(Result<SendMessageReply, BridgeError>),

    /// Reply to `startVoiceRecording`.
    VoiceRecordingAck(Result<Value, BridgeError>),
}

impl AppEvent {
    /// Returns true for events produced by an outbound bridge call.
    pub fn is_bridge_completion(&self) -> bool {
        matches!(
            self,
            AppEvent::HistoryLoaded(_)
                | AppEvent::MessageReplied(_)
                | AppEvent::VoiceRecordingAck(_)
        )
    }

    /// Returns a human-readable description of the event for debugging.
    pub fn description(&self) -> &'static str {
        match self {
            AppEvent::HotkeyActivated(_) => "Hotkey activated",
            AppEvent::RetryRegistration => "Retry hotkey registration",
            AppEvent::AutoHideCheck { .. } => "Auto-hide check",
            AppEvent::HistoryLoaded(_) => "Recent messages loaded",
            AppEvent::MessageReplied(_) => "Message replied",
            AppEvent::VoiceRecordingAck(_) => "Voice recording acknowledged",
        }
    }
}
