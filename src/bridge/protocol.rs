//! Method and event names plus their argument and reply shapes.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use super::call::Invoker;
use super::error::BridgeError;
use crate::model::{ChatMessage, DEFAULT_RECENT_LIMIT};

// === Outbound methods (native → application) ===

pub const SEND_MESSAGE: &str = "sendMessage";
pub const GET_RECENT_MESSAGES: &str = "getRecentMessages";
pub const START_VOICE_RECORDING: &str = "startVoiceRecording";

// === Inbound events (application → native) ===

pub const HISTORY_UPDATED: &str = "historyUpdated";
pub const MESSAGE_RECEIVED: &str = "messageReceived";

// === Outbound notifications (native → application) ===

pub const HOTKEY_ACTIVATED: &str = "hotkeyActivated";
pub const HOTKEY_REGISTERED: &str = "hotkeyRegistered";
pub const HOTKEY_UNREGISTERED: &str = "hotkeyUnregistered";
pub const PERMISSION_STATUS_CHANGED: &str = "permissionStatusChanged";

/// Methods the application layer may call on the native side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMethod {
    RegisterHotkey,
    UnregisterHotkey,
    CheckPermissions,
    RequestPermissions,
    ShowChatWindow,
    HideChatWindow,
    SetHotkeyEnabled,
}

impl InboundMethod {
    pub const ALL: [InboundMethod; 7] = [
        InboundMethod::RegisterHotkey,
        InboundMethod::UnregisterHotkey,
        InboundMethod::CheckPermissions,
        InboundMethod::RequestPermissions,
        InboundMethod::ShowChatWindow,
        InboundMethod::HideChatWindow,
        InboundMethod::SetHotkeyEnabled,
    ];

    pub fn parse(name: &str) -> Result<Self, BridgeError> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == name)
            .ok_or_else(|| BridgeError::not_implemented(name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InboundMethod::RegisterHotkey => "registerHotkey",
            InboundMethod::UnregisterHotkey => "unregisterHotkey",
            InboundMethod::CheckPermissions => "checkPermissions",
            InboundMethod::RequestPermissions => "requestPermissions",
            InboundMethod::ShowChatWindow => "showChatWindow",
            InboundMethod::HideChatWindow => "hideChatWindow",
            InboundMethod::SetHotkeyEnabled => "setHotkeyEnabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageArgs {
    pub message: String,
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecentMessagesArgs {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for RecentMessagesArgs {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetHotkeyEnabledArgs {
    pub enabled: bool,
}

/// Decode call arguments. `null` is treated as an empty object.
pub fn parse_arguments<T: DeserializeOwned>(method: &str, arguments: &Value) -> Result<T, BridgeError> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments.clone()
    };
    serde_json::from_value(arguments)
        .map_err(|e| BridgeError::invalid_arguments(format!("invalid arguments for '{}': {}", method, e)))
}

/// Decode a reply payload into `T`.
pub fn parse_reply<T: DeserializeOwned>(method: &str, reply: Value) -> Result<T, BridgeError> {
    serde_json::from_value(reply)
        .map_err(|e| BridgeError::invalid_arguments(format!("malformed reply to '{}': {}", method, e)))
}

/// Decode a list of history entries.
///
/// The payload must be an array; entries that do not decode are skipped.
pub fn parse_history(payload: &Value) -> Result<Vec<ChatMessage>, BridgeError> {
    let entries = payload
        .as_array()
        .ok_or_else(|| BridgeError::invalid_arguments("history must be an array"))?;

    let mut messages = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<ChatMessage>(entry.clone()) {
            Ok(message) => messages.push(message),
            Err(e) => warn!(index, error = %e, "Skipping malformed history entry"),
        }
    }
    Ok(messages)
}

pub fn parse_message(payload: &Value) -> Result<ChatMessage, BridgeError> {
    serde_json::from_value(payload.clone())
        .map_err(|e| BridgeError::invalid_arguments(format!("malformed message: {}", e)))
}

/// Ask the application layer for the `limit` most recent history entries.
///
/// If more entries come back, only the last `limit` are kept; order is
/// preserved.
pub fn recent_messages(
    invoker: &Invoker,
    limit: usize,
) -> impl Future<Output = Result<Vec<ChatMessage>, BridgeError>> + Send + 'static {
    let reply = invoker.invoke(GET_RECENT_MESSAGES, json!({ "limit": limit }));
    async move {
        let mut messages = parse_history(&reply.await?).map_err(|e| {
            BridgeError::invalid_arguments(format!(
                "malformed reply to '{}': {}",
                GET_RECENT_MESSAGES, e.message
            ))
        })?;
        if messages.len() > limit {
            let excess = messages.len() - limit;
            messages.drain(..excess);
        }
        Ok(messages)
    }
}
