use thiserror::Error;

use super::OsStatus;
use crate::permission::PermissionState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotkeyError {
    #[error("input monitoring permission is required (state: {0})")]
    PermissionDenied(PermissionState),

    #[error("hotkey registration failed (OSStatus {status})")]
    RegistrationFailed { status: OsStatus },

    #[error("hotkey event handler install failed (OSStatus {status})")]
    HandlerInstallFailed { status: OsStatus },
}

impl HotkeyError {
    /// OS status code, when the OS refused the call.
    pub fn status(&self) -> Option<OsStatus> {
        match self {
            HotkeyError::PermissionDenied(_) => None,
            HotkeyError::RegistrationFailed { status }
            | HotkeyError::HandlerInstallFailed { status } => Some(*status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_exposed_for_os_failures() {
        assert_eq!(
            HotkeyError::RegistrationFailed { status: -9878 }.status(),
            Some(-9878)
        );
        assert_eq!(
            HotkeyError::HandlerInstallFailed { status: -50 }.status(),
            Some(-50)
        );
        assert_eq!(
            HotkeyError::PermissionDenied(PermissionState::Denied).status(),
            None
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            HotkeyError::RegistrationFailed { status: -9878 }.to_string(),
            "hotkey registration failed (OSStatus -9878)"
        );
        assert!(HotkeyError::PermissionDenied(PermissionState::Denied)
            .to_string()
            .contains("denied"));
    }
}
