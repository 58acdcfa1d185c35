//! Configuration constants and default values.
//!
//! Window geometry, timer durations and config file locations.

use std::time::Duration;

// === Timers ===

/// Delay before the overlay auto-hides when it does not hold focus.
pub const AUTO_HIDE_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between prompting for permission and retrying registration.
pub const PERMISSION_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Main-thread pump interval in seconds (~60 fps).
pub const PUMP_INTERVAL_SECS: f64 = 0.016;

// === Bridge ===

/// Number of history entries fetched when the overlay opens.
pub const DEFAULT_RECENT_LIMIT: usize = 3;

// === Overlay Geometry ===

/// Overlay width in points.
pub const OVERLAY_WIDTH: f64 = 420.0;

/// Height with only the input field.
pub const COLLAPSED_HEIGHT: f64 = 100.0;

/// Height with history and input field.
pub const EXPANDED_HEIGHT: f64 = 400.0;

/// Upward offset from the vertical center of the display.
pub const VERTICAL_OFFSET: f64 = 100.0;

/// Display size assumed when the OS reports no screen.
pub const FALLBACK_DISPLAY_WIDTH: f64 = 800.0;
pub const FALLBACK_DISPLAY_HEIGHT: f64 = 600.0;

// === Config ===

/// Directory under the user config dir.
pub const CONFIG_DIR_NAME: &str = "hotchat";

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "HOTCHAT_CONFIG";
