//! Accessibility trust provider.

use crate::permission::TrustProvider;
use crate::platform::macos::ffi::is_process_trusted;

/// Queries `AXIsProcessTrustedWithOptions`.
#[derive(Debug, Default)]
pub struct AxTrust;

impl TrustProvider for AxTrust {
    fn is_trusted(&self, prompt: bool) -> bool {
        unsafe { is_process_trusted(prompt) }
    }
}
