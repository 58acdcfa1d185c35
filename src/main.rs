use std::process::ExitCode;

#[cfg(target_os = "macos")]
mod macos_main;

fn main() -> ExitCode {
    hotchat::logging::init_logging();

    #[cfg(target_os = "macos")]
    {
        macos_main::run()
    }

    #[cfg(not(target_os = "macos"))]
    {
        tracing::error!("hotchat needs macOS: global hotkeys use the Carbon Event Manager");
        ExitCode::FAILURE
    }
}
