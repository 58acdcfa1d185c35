//! Raw FFI declarations and objc2 helpers.

pub mod accessibility;
pub mod bridge;
pub mod carbon;

pub use accessibility::*;
pub use carbon::*;
