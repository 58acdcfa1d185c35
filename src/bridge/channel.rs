//! Duplex bridge endpoints.
//!
//! [`pair`] returns two symmetric endpoints. Each holds an invoker and an
//! emitter pointing at the other side, plus queues of the calls and events
//! the other side sent. Calls and events travel on separate channels, so an
//! event carries no ordering guarantee relative to call completions.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use super::call::{BridgeCall, CallResult, Invoker};

/// Fire-and-forget notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeEvent {
    pub name: String,
    #[serde(default)]
    pub payload: Value,
}

impl BridgeEvent {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

#[derive(Clone)]
pub struct Emitter {
    tx: mpsc::UnboundedSender<BridgeEvent>,
}

impl Emitter {
    /// Queue an event for the other side. Events are delivered in the order
    /// they were emitted. Dropped silently if the other side is gone.
    pub fn emit(&self, name: &str, payload: Value) {
        if self.tx.send(BridgeEvent::new(name, payload)).is_err() {
            debug!(event = name, "Bridge peer gone, event dropped");
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Complete unanswered calls with `Timeout` after this long. `None`
    /// waits forever.
    pub invoke_timeout: Option<Duration>,
}

/// One side of the bridge.
pub struct MessageBridge {
    invoker: Invoker,
    emitter: Emitter,
    calls: mpsc::UnboundedReceiver<BridgeCall>,
    events: mpsc::UnboundedReceiver<BridgeEvent>,
}

/// Create a connected `(native, application)` pair.
pub fn pair(config: &BridgeConfig) -> (MessageBridge, MessageBridge) {
    let (native_call_tx, native_calls) = mpsc::unbounded_channel();
    let (app_call_tx, app_calls) = mpsc::unbounded_channel();
    let (native_event_tx, native_events) = mpsc::unbounded_channel();
    let (app_event_tx, app_events) = mpsc::unbounded_channel();
    let ids = Arc::new(AtomicU64::new(0));

    let native = MessageBridge {
        invoker: Invoker::new(app_call_tx, ids.clone(), config.invoke_timeout),
        emitter: Emitter { tx: app_event_tx },
        calls: native_calls,
        events: native_events,
    };
    let application = MessageBridge {
        invoker: Invoker::new(native_call_tx, ids, config.invoke_timeout),
        emitter: Emitter {
            tx: native_event_tx,
        },
        calls: app_calls,
        events: app_events,
    };
    (native, application)
}

impl MessageBridge {
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn invoke(
        &self,
        method: &str,
        arguments: Value,
    ) -> impl std::future::Future<Output = CallResult> + Send + 'static {
        self.invoker.invoke(method, arguments)
    }

    pub fn emit(&self, name: &str, payload: Value) {
        self.emitter.emit(name, payload);
    }

    /// Next call from the other side, if one is queued.
    pub fn try_next_call(&mut self) -> Option<BridgeCall> {
        self.calls.try_recv().ok()
    }

    /// Wait for the next call. `None` once the other side is gone.
    pub async fn next_call(&mut self) -> Option<BridgeCall> {
        self.calls.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<BridgeEvent> {
        self.events.try_recv().ok()
    }

    pub async fn next_event(&mut self) -> Option<BridgeEvent> {
        self.events.recv().await
    }

    pub fn into_parts(
        self,
    ) -> (
        Invoker,
        Emitter,
        mpsc::UnboundedReceiver<BridgeCall>,
        mpsc::UnboundedReceiver<BridgeEvent>,
    ) {
        (self.invoker, self.emitter, self.calls, self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_calls_cross_sides() {
        let (native, mut app) = pair(&BridgeConfig::default());
        let pending = native.invoke("getRecentMessages", json!({"limit": 3}));

        let call = app.next_call().await.unwrap();
        assert_eq!(call.method(), "getRecentMessages");
        call.reply(json!([]));
        assert_eq!(pending.await, Ok(json!([])));
    }

    #[tokio::test]
    async fn test_events_are_fifo() {
        let (native, mut app) = pair(&BridgeConfig::default());
        native.emit("a", json!(1));
        native.emit("b", json!(2));

        assert_eq!(app.next_event().await.unwrap().name, "a");
        assert_eq!(app.next_event().await.unwrap().name, "b");
        assert!(app.try_next_event().is_none());
    }

    #[test]
    fn test_nothing_queued_initially() {
        let (mut native, mut app) = pair(&BridgeConfig::default());
        assert!(native.try_next_call().is_none());
        assert!(native.try_next_event().is_none());
        assert!(app.try_next_call().is_none());
    }

    #[test]
    fn test_emit_after_peer_dropped_is_silent() {
        let (native, app) = pair(&BridgeConfig::default());
        drop(app);
        native.emit("historyUpdated", json!([]));
    }
}
