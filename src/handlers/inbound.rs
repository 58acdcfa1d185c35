//! Answers calls the application layer makes on the native side.
//!
//! Every call is completed exactly once before `answer` returns.

use serde_json::json;
use tracing::{debug, warn};

use crate::app::Orchestrator;
use crate::bridge::protocol::{parse_arguments, SetHotkeyEnabledArgs};
use crate::bridge::{BridgeCall, BridgeError, InboundMethod};
use crate::hotkey::{HotkeyError, RegistrationState};

pub(crate) fn answer(app: &mut Orchestrator, call: BridgeCall) {
    let method = match InboundMethod::parse(call.method()) {
        Ok(method) => method,
        Err(e) => {
            warn!(method = call.method(), "Unknown bridge method");
            call.fail(e);
            return;
        }
    };
    debug!(method = method.as_str(), id = call.correlation_id(), "Inbound call");

    match method {
        InboundMethod::RegisterHotkey => match app.register_hotkey() {
            Ok(state) => call.reply(json!({
                "success": true,
                "registered": state == RegistrationState::Registered,
            })),
            Err(e) => reply_failure(call, e),
        },

        InboundMethod::UnregisterHotkey => {
            app.unregister_hotkey();
            call.reply(json!({ "success": true }));
        }

        InboundMethod::CheckPermissions => {
            let state = app.check_permission();
            call.reply(json!({
                "success": true,
                "hasPermission": state.is_granted(),
                "state": state,
            }));
        }

        InboundMethod::RequestPermissions => {
            let state = app.request_permission();
            call.reply(json!({
                "success": true,
                "hasPermission": state.is_granted(),
                "state": state,
            }));
        }

        InboundMethod::ShowChatWindow => {
            app.show_overlay();
            call.reply(json!({ "success": true }));
        }

        InboundMethod::HideChatWindow => {
            app.hide_overlay();
            call.reply(json!({ "success": true }));
        }

        InboundMethod::SetHotkeyEnabled => {
            let args: SetHotkeyEnabledArgs = match parse_arguments(method.as_str(), call.arguments()) {
                Ok(args) => args,
                Err(e) => {
                    call.fail(e);
                    return;
                }
            };
            match app.set_hotkey_enabled(args.enabled) {
                Ok(_) => call.reply(json!({ "success": true, "enabled": args.enabled })),
                Err(e) => reply_failure(call, e),
            }
        }
    }
}

/// Permission problems fail the call; OS refusals are a normal reply with
/// `success: false` and the status code.
fn reply_failure(call: BridgeCall, error: HotkeyError) {
    match error {
        HotkeyError::PermissionDenied(_) => call.fail(BridgeError::unavailable(error.to_string())),
        _ => call.reply(json!({
            "success": false,
            "error": error.to_string(),
            "status": error.status(),
        })),
    }
}
