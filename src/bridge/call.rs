//! Request side of the bridge: calls, their completion, and the invoker.
//!
//! A call owns a oneshot responder. Completing consumes the call, so a
//! second completion cannot be written; dropping it unanswered completes the
//! caller with `Unavailable`.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use super::error::BridgeError;
use super::protocol::parse_reply;

pub type CallResult = Result<Value, BridgeError>;

#[derive(Debug)]
pub struct BridgeCall {
    method: String,
    arguments: Value,
    correlation_id: u64,
    responder: oneshot::Sender<CallResult>,
}

impl BridgeCall {
    /// Build a call and the receiver its result will arrive on.
    pub fn new(
        method: impl Into<String>,
        arguments: Value,
        correlation_id: u64,
    ) -> (Self, oneshot::Receiver<CallResult>) {
        let (responder, rx) = oneshot::channel();
        let call = Self {
            method: method.into(),
            arguments,
            correlation_id,
            responder,
        };
        (call, rx)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn arguments(&self) -> &Value {
        &self.arguments
    }

    pub fn correlation_id(&self) -> u64 {
        self.correlation_id
    }

    /// Whether the caller stopped waiting (timed out or dropped its future).
    pub fn is_closed(&self) -> bool {
        self.responder.is_closed()
    }

    pub fn complete(self, result: CallResult) {
        trace!(
            id = self.correlation_id,
            method = %self.method,
            ok = result.is_ok(),
            "Completing bridge call"
        );
        if self.responder.send(result).is_err() {
            debug!(id = self.correlation_id, method = %self.method, "Caller gone before reply");
        }
    }

    pub fn reply(self, value: Value) {
        self.complete(Ok(value));
    }

    pub fn fail(self, error: BridgeError) {
        self.complete(Err(error));
    }
}

/// Sends calls to the other side of the bridge.
#[derive(Clone)]
pub struct Invoker {
    tx: mpsc::UnboundedSender<BridgeCall>,
    next_id: Arc<AtomicU64>,
    timeout: Option<Duration>,
}

impl Invoker {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<BridgeCall>,
        next_id: Arc<AtomicU64>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            tx,
            next_id,
            timeout,
        }
    }

    /// Send a call and return a future for its single result.
    ///
    /// The call is queued before this returns, so calls made in sequence are
    /// received in sequence even if their futures are awaited out of order.
    pub fn invoke(
        &self,
        method: &str,
        arguments: Value,
    ) -> impl Future<Output = CallResult> + Send + 'static {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (call, rx) = BridgeCall::new(method, arguments, id);
        let sent = self
            .tx
            .send(call)
            .map_err(|_| BridgeError::unavailable("bridge peer is gone"));
        let timeout = self.timeout;
        let method = method.to_string();

        async move {
            sent?;
            let reply = match timeout {
                Some(limit) => match tokio::time::timeout(limit, rx).await {
                    Ok(reply) => reply,
                    Err(_) => return Err(BridgeError::timeout(&method)),
                },
                None => rx.await,
            };
            reply.unwrap_or_else(|_| {
                Err(BridgeError::unavailable(format!(
                    "'{}' was dropped without a reply",
                    method
                )))
            })
        }
    }

    /// Like [`invoke`](Self::invoke), decoding the reply into `R`. A reply of
    /// the wrong shape fails with `InvalidArguments`.
    pub fn invoke_as<R>(
        &self,
        method: &str,
        arguments: Value,
    ) -> impl Future<Output = Result<R, BridgeError>> + Send + 'static
    where
        R: DeserializeOwned + Send + 'static,
    {
        let reply = self.invoke(method, arguments);
        let method = method.to_string();
        async move { parse_reply(&method, reply.await?) }
    }
}
