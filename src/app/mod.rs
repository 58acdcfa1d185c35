//! Application core.
//!
//! [`Orchestrator`] owns every main-thread component and routes hotkey
//! activations, timer expiries and bridge traffic between them.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, Platform};
