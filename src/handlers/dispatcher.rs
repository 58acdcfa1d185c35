//! Main-thread handling of bus events and inbound bridge events.
//!
//! ```text
//! EventBus::drain()        → dispatch() → orchestrator actions
//! MessageBridge events     → deliver()  → chat log + listeners
//! ```

use tracing::{debug, info, warn};

use crate::app::Orchestrator;
use crate::bridge::protocol::{parse_history, parse_message, HISTORY_UPDATED, MESSAGE_RECEIVED};
use crate::bridge::BridgeEvent;
use crate::events::AppEvent;
use crate::overlay::WatchdogOutcome;

pub(crate) fn dispatch(app: &mut Orchestrator, event: AppEvent) {
    debug!(
        event = event.description(),
        completion = event.is_bridge_completion(),
        "Dispatching"
    );

    match event {
        AppEvent::HotkeyActivated(id) => {
            if id != app.registrar.binding_id() {
                debug!(%id, "Activation for another binding ignored");
                return;
            }
            app.on_activation();
        }

        AppEvent::RetryRegistration => {
            if let Err(e) = app.register_hotkey() {
                warn!(error = %e, "Registration retry failed");
            }
        }

        AppEvent::AutoHideCheck { session } => {
            let outcome = app.overlay.on_auto_hide_check(session);
            if outcome == WatchdogOutcome::Stale {
                debug!(session, current = app.overlay.session(), "Stale auto-hide check");
            }
        }

        AppEvent::HistoryLoaded(Ok(messages)) => {
            debug!(count = messages.len(), "Recent messages loaded");
            app.chat.replace(messages);
            app.refresh_footprint();
        }
        AppEvent::HistoryLoaded(Err(e)) => {
            warn!(error = %e, "Could not load recent messages");
        }

        AppEvent::MessageReplied(Ok(reply)) => {
            app.chat.push_reply(&reply.response, reply.id);
            app.refresh_footprint();
        }
        AppEvent::MessageReplied(Err(e)) => {
            warn!(error = %e, "sendMessage failed");
        }

        AppEvent::VoiceRecordingAck(Ok(ack)) => {
            info!(%ack, "Voice recording started");
        }
        AppEvent::VoiceRecordingAck(Err(e)) => {
            warn!(error = %e, "startVoiceRecording failed");
        }
    }
}

pub(crate) fn deliver(app: &mut Orchestrator, event: BridgeEvent) {
    match event.name.as_str() {
        HISTORY_UPDATED => match parse_history(&event.payload) {
            Ok(messages) => {
                app.chat.replace(messages);
                app.refresh_footprint();
            }
            Err(e) => warn!(error = %e, "Ignoring malformed historyUpdated"),
        },
        MESSAGE_RECEIVED => match parse_message(&event.payload) {
            Ok(message) => {
                app.chat.append(message);
                app.refresh_footprint();
            }
            Err(e) => warn!(error = %e, "Ignoring malformed messageReceived"),
        },
        other => debug!(event = other, "No built-in handling"),
    }

    app.listeners.deliver(&event.name, &event.payload);
}
