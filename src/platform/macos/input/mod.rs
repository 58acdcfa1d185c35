//! Native input: Carbon hotkeys and the accessibility trust query.

pub mod hotkeys;
pub mod trust;

pub use hotkeys::CarbonHotkeys;
pub use trust::AxTrust;
