//! macOS entry point.
//!
//! Wires the Carbon, accessibility and AppKit backends into the
//! orchestrator, serves the application side of the bridge on stdio, and
//! runs the AppKit main loop.

use std::process::ExitCode;

use tracing::{error, info, warn};

use hotchat::app::{Orchestrator, Platform};
use hotchat::bridge::{self, stdio::serve_stdio};
use hotchat::hotkey::registry;
use hotchat::overlay::OverlayLayout;
use hotchat::platform::macos::ffi::bridge::{
    autoreleasepool, id, msg_send, NSApp, NSApplicationActivationPolicy,
};
use hotchat::platform::macos::{
    install_pump_timer, install_termination_observer, AxTrust, CarbonHotkeys, CocoaOverlayWindow,
};
use hotchat::storage::ensure_config;

pub fn run() -> ExitCode {
    let config = ensure_config();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("hotchat-rt")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    let (native, application) = bridge::pair(&config.bridge());
    runtime.spawn(async move {
        if let Err(e) = serve_stdio(application).await {
            error!(error = %e, "Bridge transport stopped");
        }
    });

    autoreleasepool(|| unsafe {
        let app: id = NSApp();
        let _: bool = msg_send![app, setActivationPolicy: NSApplicationActivationPolicy::Accessory];

        let window = CocoaOverlayWindow::new(OverlayLayout::default().frame_for(None, false));
        let platform = Platform {
            trust: Box::new(AxTrust),
            hotkeys: Box::new(CarbonHotkeys::new()),
            window: Box::new(window),
        };

        let mut orchestrator = Orchestrator::new(
            config,
            platform,
            registry::global().clone(),
            native,
            runtime.handle().clone(),
        );
        match orchestrator.start() {
            Ok(state) => info!(?state, binding = %orchestrator.binding(), "Ready"),
            Err(e) => warn!(error = %e, "Hotkey not registered at startup"),
        }

        install_pump_timer(orchestrator);
        install_termination_observer();

        let _: () = msg_send![app, run];
    });

    runtime.shutdown_background();
    ExitCode::SUCCESS
}
