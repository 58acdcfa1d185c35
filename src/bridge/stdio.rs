//! JSON-lines transport for the application side of the bridge.
//!
//! Lets an external process act as the application layer over stdin/stdout.
//! One JSON object per line:
//!
//! ```text
//! {"type":"call","id":1,"method":"getRecentMessages","arguments":{"limit":3}}
//! {"type":"reply","id":1,"result":[...]}
//! {"type":"reply","id":2,"error":{"code":"NOT_IMPLEMENTED","message":"..."}}
//! {"type":"event","name":"historyUpdated","payload":[...]}
//! ```
//!
//! Calls the native side makes are written out and matched to the replies
//! read back by id. Calls read in are forwarded to the native side and
//! answered with a reply line. Unparseable lines are logged and skipped.

use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::call::{BridgeCall, CallResult, Invoker};
use super::channel::{Emitter, MessageBridge};
use super::error::BridgeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireFrame {
    Call {
        id: u64,
        method: String,
        #[serde(default)]
        arguments: Value,
    },
    Reply {
        id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<BridgeError>,
    },
    Event {
        name: String,
        #[serde(default)]
        payload: Value,
    },
}

impl WireFrame {
    pub fn reply(id: u64, result: CallResult) -> Self {
        match result {
            Ok(value) => WireFrame::Reply {
                id,
                result: Some(value),
                error: None,
            },
            Err(error) => WireFrame::Reply {
                id,
                result: None,
                error: Some(error),
            },
        }
    }
}

/// Native calls written out and still waiting for a reply line, by id.
///
/// Calls whose caller has stopped waiting (timed out) are pruned, so their
/// late replies are reported as unknown.
#[derive(Debug, Default)]
pub struct PendingCalls {
    calls: HashMap<u64, BridgeCall>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, call: BridgeCall) {
        self.prune();
        self.calls.insert(call.correlation_id(), call);
    }

    /// Remove the call for `id`. Returns `None` if unknown or abandoned.
    pub fn take(&mut self, id: u64) -> Option<BridgeCall> {
        self.calls.remove(&id).filter(|call| !call.is_closed())
    }

    /// Drop every call whose caller is gone. Returns how many were dropped.
    pub fn prune(&mut self) -> usize {
        let before = self.calls.len();
        self.calls.retain(|_, call| !call.is_closed());
        let pruned = before - self.calls.len();
        if pruned > 0 {
            debug!(pruned, "Dropped abandoned bridge calls");
        }
        pruned
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Serve the application side of the bridge over stdin/stdout.
pub async fn serve_stdio(bridge: MessageBridge) -> io::Result<()> {
    serve(bridge, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Serve the application side of the bridge over a line reader and writer.
///
/// Returns when the reader reaches end of input. Calls still waiting for a
/// reply at that point complete with `Unavailable`.
pub async fn serve<R, W>(bridge: MessageBridge, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (invoker, emitter, mut calls, mut events) = bridge.into_parts();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<WireFrame>();
    let mut pending = PendingCalls::new();
    let mut lines = reader.lines();

    info!("Bridge transport ready on stdio");

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => handle_line(&line, &invoker, &emitter, &mut pending, &out_tx),
                None => {
                    debug!(pending = pending.len(), "Bridge input closed");
                    break;
                }
            },
            Some(call) = calls.recv() => {
                let frame = WireFrame::Call {
                    id: call.correlation_id(),
                    method: call.method().to_string(),
                    arguments: call.arguments().clone(),
                };
                pending.insert(call);
                write_frame(&mut writer, &frame).await?;
            }
            Some(event) = events.recv() => {
                let frame = WireFrame::Event {
                    name: event.name,
                    payload: event.payload,
                };
                write_frame(&mut writer, &frame).await?;
            }
            Some(frame) = out_rx.recv() => {
                write_frame(&mut writer, &frame).await?;
            }
        }
    }

    Ok(())
}

fn handle_line(
    line: &str,
    invoker: &Invoker,
    emitter: &Emitter,
    pending: &mut PendingCalls,
    out: &mpsc::UnboundedSender<WireFrame>,
) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    let frame = match serde_json::from_str::<WireFrame>(line) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "Skipping unparseable bridge line");
            return;
        }
    };

    match frame {
        WireFrame::Call {
            id,
            method,
            arguments,
        } => {
            let reply = invoker.invoke(&method, arguments);
            let out = out.clone();
            tokio::spawn(async move {
                let _ = out.send(WireFrame::reply(id, reply.await));
            });
        }
        WireFrame::Reply { id, result, error } => match pending.take(id) {
            Some(call) => match error {
                Some(error) => call.fail(error),
                None => call.reply(result.unwrap_or(Value::Null)),
            },
            None => warn!(id, "Reply for unknown or abandoned call"),
        },
        WireFrame::Event { name, payload } => emitter.emit(&name, payload),
    }
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &WireFrame) -> io::Result<()> {
    let mut line = serde_json::to_string(frame).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{pair, BridgeConfig, BridgeErrorCode};
    use serde_json::json;
    use std::time::Duration;
    use tokio::io::{duplex, split, Lines, ReadHalf, WriteHalf, DuplexStream};

    struct Client {
        lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl Client {
        async fn send(&mut self, value: Value) {
            let mut line = value.to_string();
            line.push('\n');
            self.writer.write_all(line.as_bytes()).await.unwrap();
        }

        async fn recv(&mut self) -> Value {
            let line = self.lines.next_line().await.unwrap().unwrap();
            serde_json::from_str(&line).unwrap()
        }
    }

    fn start() -> (MessageBridge, Client) {
        start_with(&BridgeConfig::default())
    }

    fn start_with(config: &BridgeConfig) -> (MessageBridge, Client) {
        let (native, app) = pair(config);
        let (client, server) = duplex(64 * 1024);
        let (server_r, server_w) = split(server);
        tokio::spawn(serve(app, BufReader::new(server_r), server_w));
        let (client_r, client_w) = split(client);
        (
            native,
            Client {
                lines: BufReader::new(client_r).lines(),
                writer: client_w,
            },
        )
    }

    #[tokio::test]
    async fn test_native_call_is_answered_by_reply_line() {
        let (native, mut client) = start();
        let pending = native.invoke("getRecentMessages", json!({"limit": 3}));

        let call = client.recv().await;
        assert_eq!(call["type"], "call");
        assert_eq!(call["method"], "getRecentMessages");
        assert_eq!(call["arguments"], json!({"limit": 3}));

        client
            .send(json!({"type": "reply", "id": call["id"], "result": []}))
            .await;
        assert_eq!(pending.await, Ok(json!([])));
    }

    #[tokio::test]
    async fn test_error_reply_is_structured() {
        let (native, mut client) = start();
        let pending = native.invoke("sendMessage", json!({"message": "hi", "timestamp": 1.0}));

        let call = client.recv().await;
        client
            .send(json!({
                "type": "reply",
                "id": call["id"],
                "error": {"code": "UNAVAILABLE", "message": "model offline"}
            }))
            .await;

        let err = pending.await.unwrap_err();
        assert_eq!(err.code, BridgeErrorCode::Unavailable);
        assert_eq!(err.message, "model offline");
    }

    #[tokio::test]
    async fn test_inbound_call_gets_reply_line() {
        let (mut native, mut client) = start();
        client
            .send(json!({"type": "call", "id": 42, "method": "checkPermissions"}))
            .await;

        let call = native.next_call().await.unwrap();
        assert_eq!(call.method(), "checkPermissions");
        assert_eq!(call.arguments(), &Value::Null);
        call.reply(json!({"success": true, "hasPermission": false}));

        let reply = client.recv().await;
        assert_eq!(
            reply,
            json!({"type": "reply", "id": 42, "result": {"success": true, "hasPermission": false}})
        );
    }

    #[tokio::test]
    async fn test_events_flow_both_ways_and_garbage_is_skipped() {
        let (mut native, mut client) = start();
        client.send(json!("not a frame")).await;
        client
            .send(json!({"type": "event", "name": "historyUpdated", "payload": []}))
            .await;

        let event = native.next_event().await.unwrap();
        assert_eq!(event.name, "historyUpdated");

        native.emit("hotkeyActivated", json!({}));
        let line = client.recv().await;
        assert_eq!(line, json!({"type": "event", "name": "hotkeyActivated", "payload": {}}));
    }

    #[tokio::test]
    async fn test_end_of_input_fails_waiting_calls_unavailable() {
        let (native, mut client) = start();
        let pending = native.invoke("getRecentMessages", json!({"limit": 3}));

        let call = client.recv().await;
        assert_eq!(call["method"], "getRecentMessages");
        drop(client);

        let err = pending.await.unwrap_err();
        assert_eq!(err.code, BridgeErrorCode::Unavailable);
    }

    #[test]
    fn test_abandoned_calls_are_pruned_on_insert() {
        let mut pending = PendingCalls::new();
        let (first, first_rx) = BridgeCall::new("sendMessage", Value::Null, 1);
        let (second, _second_rx) = BridgeCall::new("sendMessage", Value::Null, 2);

        pending.insert(first);
        drop(first_rx);
        pending.insert(second);

        assert_eq!(pending.len(), 1);
        assert!(pending.take(1).is_none());
        assert!(pending.take(2).is_some());
        assert!(pending.is_empty());
    }

    #[test]
    fn test_reply_for_abandoned_call_is_not_delivered() {
        let mut pending = PendingCalls::new();
        let (call, rx) = BridgeCall::new("startVoiceRecording", Value::Null, 7);
        pending.insert(call);
        drop(rx);

        assert!(pending.take(7).is_none());
        assert_eq!(pending.prune(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_call_leaves_pending_table() {
        let config = BridgeConfig {
            invoke_timeout: Some(Duration::from_millis(100)),
        };
        let (native, mut app) = pair(&config);
        let mut pending = PendingCalls::new();

        let reply = native.invoke("sendMessage", json!({"message": "hi"}));
        pending.insert(app.next_call().await.unwrap());
        assert_eq!(pending.len(), 1);

        assert_eq!(reply.await.unwrap_err().code, BridgeErrorCode::Timeout);
        assert_eq!(pending.prune(), 1);
        assert!(pending.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_replies_after_timeout_are_dropped() {
        let config = BridgeConfig {
            invoke_timeout: Some(Duration::from_millis(100)),
        };
        let (native, mut client) = start_with(&config);

        let mut ids = Vec::new();
        for _ in 0..3 {
            let pending = native.invoke("sendMessage", json!({"message": "hi"}));
            let call = client.recv().await;
            ids.push(call["id"].clone());
            let err = pending.await.unwrap_err();
            assert_eq!(err.code, BridgeErrorCode::Timeout);
        }

        // Late replies for the timed-out ids are dropped; the transport keeps
        // serving new calls.
        for id in ids {
            client
                .send(json!({"type": "reply", "id": id, "result": {"response": "late"}}))
                .await;
        }
        let fresh = native.invoke("getRecentMessages", json!({"limit": 3}));
        let call = client.recv().await;
        client
            .send(json!({"type": "reply", "id": call["id"], "result": []}))
            .await;
        assert_eq!(fresh.await, Ok(json!([])));
    }
}
