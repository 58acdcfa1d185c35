//! Platform-specific implementations of the OS seams.

pub mod macos;
