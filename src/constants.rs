//! Central Configuration Constants
//!
//! Single source of truth for deployment defaults.
//! The defaults describe the reference deployment (one VAV unit, 4 sensors).

/// Default site identifier
pub const DEFAULT_SITE_ID: &str = "SNE22-1";

/// Default air-handling unit identifier
pub const DEFAULT_UNIT_ID: &str = "VAV1-2";

/// Default number of temperature sensors on the unit
pub const DEFAULT_SENSOR_COUNT: usize = 4;

/// Measurement stem shared by every channel suffix
pub const TEMP_STEM: &str = "Temp";

/// Business hours (inclusive)
pub const BUSINESS_HOURS_START: u32 = 8;
pub const BUSINESS_HOURS_END: u32 = 17;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get site identifier from environment or use default
pub fn get_site_id() -> String {
    std::env::var("SENSOR_SITE_ID")
        .unwrap_or_else(|_| DEFAULT_SITE_ID.to_string())
}

/// Get unit identifier from environment or use default
pub fn get_unit_id() -> String {
    std::env::var("SENSOR_UNIT_ID")
        .unwrap_or_else(|_| DEFAULT_UNIT_ID.to_string())
}

/// Get sensor count from environment or use default
pub fn get_sensor_count() -> usize {
    std::env::var("SENSOR_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SENSOR_COUNT)
}

/// Check if readings should be echoed back in score records
pub fn is_echo_readings_enabled() -> bool {
    std::env::var("SENSOR_ECHO_READINGS")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
