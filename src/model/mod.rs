//! Application domain model.
//!
//! Pure data with no FFI: hotkey bindings, chat history and the constants
//! shared by the rest of the crate.

pub mod binding;
pub mod chat;
pub mod constants;

pub use binding::{Binding, BindingId, BindingParseError};
pub use chat::{ChatLog, ChatMessage};
pub use constants::*;
