//! Deferred delivery onto the main queue.
//!
//! Nothing on the main thread sleeps or awaits. Work that finishes later
//! (a timer expiring, a bridge reply arriving) runs as a tokio task and
//! publishes an [`AppEvent`] when it is done; the main thread picks it up on
//! its next pump.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::events::{AppEvent, EventPublisher};

#[derive(Clone)]
pub struct Timers {
    runtime: Handle,
    publisher: EventPublisher,
}

impl Timers {
    pub fn new(runtime: Handle, publisher: EventPublisher) -> Self {
        Self { runtime, publisher }
    }

    /// Publish `event` once, after `delay`.
    pub fn after(&self, delay: Duration, event: AppEvent) -> JoinHandle<()> {
        let publisher = self.publisher.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            publisher.publish(event);
        })
    }

    /// Await `future` off the main thread and publish its output mapped
    /// through `wrap`.
    pub fn complete_with<F, T>(&self, future: F, wrap: fn(T) -> AppEvent) -> JoinHandle<()>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let publisher = self.publisher.clone();
        self.runtime.spawn(async move {
            let output = future.await;
            publisher.publish(wrap(output));
        })
    }
}
