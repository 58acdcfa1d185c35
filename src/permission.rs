//! Input-monitoring permission gate.
//!
//! macOS never pushes trust changes to the process, so the state here is only
//! ever updated by polling. Callers re-poll whenever the answer matters.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::events::AppEvent;
use crate::model::PERMISSION_RETRY_DELAY;
use crate::timers::Timers;

/// OS trust query.
pub trait TrustProvider {
    /// Whether the process is trusted. `prompt = true` may surface the
    /// system permission dialog.
    fn is_trusted(&self, prompt: bool) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PermissionState::Unknown => "unknown",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        })
    }
}

pub struct PermissionGate {
    provider: Box<dyn TrustProvider>,
    state: PermissionState,
    retry_delay: Duration,
}

impl PermissionGate {
    pub fn new(provider: Box<dyn TrustProvider>) -> Self {
        Self {
            provider,
            state: PermissionState::Unknown,
            retry_delay: PERMISSION_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Poll the OS and store the result.
    pub fn check(&mut self, prompt: bool) -> PermissionState {
        let state = if self.provider.is_trusted(prompt) {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        if state != self.state {
            info!(from = %self.state, to = %state, "Input monitoring permission changed");
        }
        self.state = state;
        state
    }

    /// Last polled state, without asking the OS again.
    pub fn state(&self) -> PermissionState {
        self.state
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Prompt for permission, then schedule exactly one registration retry.
    ///
    /// The user usually has not answered the dialog by the time the retry
    /// fires; a later grant is picked up on the next explicit request or
    /// registration.
    pub fn request_and_retry(&mut self, timers: &Timers) -> PermissionState {
        let state = self.check(true);
        debug!(delay_ms = self.retry_delay.as_millis() as u64, "Scheduling registration retry");
        timers.after(self.retry_delay, AppEvent::RetryRegistration);
        state
    }
}
