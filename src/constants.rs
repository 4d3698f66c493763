/// Pipeline sizes and thresholds used across the step endpoints.
/// These are product decisions and intentionally not part of the runtime config.

// Candidate pool shown on the 6x6 grid
pub const POOL_SIZE: usize = 36;
// Survivors of step 1
pub const SHORTLIST_SIZE: usize = 12;

pub const CONFIRM_THRESHOLD: f64 = 0.98;
pub const REJECT_THRESHOLD: f64 = 0.3;
/// Decimal places the UI displays; thresholds compare against the same rounding.
pub const SCORE_DECIMALS: u32 = 3;

// Data files
pub const PROPERTY_FILE: &str = "property_data.csv";
pub const CATALOG_FILE: &str = "catalog_data.csv";
pub const CONFIG_FILE: &str = "config.toml";

// Server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_STATIC_DIR: &str = "frontend";

pub const SERVICE_NAME: &str = "hotel-match-viz";
pub const API_TITLE: &str = "Hotel Matching Visualization API";
pub const API_VERSION: &str = "1.0.0";

// Environment overrides
pub const ENV_HOST: &str = "HOTEL_MATCH_HOST";
pub const ENV_PORT: &str = "HOTEL_MATCH_PORT";
pub const ENV_DATA_DIR: &str = "HOTEL_MATCH_DATA_DIR";
pub const ENV_STATIC_DIR: &str = "HOTEL_MATCH_STATIC_DIR";
