//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! client.

// Provider endpoints (relative to the configured base URL)
pub const OAUTH_TOKEN_PATH: &str = "oauth/token";
pub const APPOINTMENT_ENDPOINT: &str = "v1/person/appointment";
pub const DEPARTMENT_ENDPOINT: &str = "v1/reference/type/DEPT";
pub const POSITION_TITLE_ENDPOINT: &str = "v1/reference/type/POSTTL";
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

// Token lifecycle defaults
pub const DEFAULT_TOKEN_SKEW_SECS: u64 = 60;
pub const DEFAULT_TOKEN_TIMEOUT_MS: u64 = 10_000;

// Request layer defaults
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
pub const RETRYABLE_STATUS_CODES: [u16; 3] = [502, 503, 504];

// Appointment merge rules
pub const MERGE_GAP_THRESHOLD_DAYS: i64 = 90;
pub const PROVIDER_DATE_FORMAT: &str = "%Y%m%d";
pub const PRIMARY_FLAG_YES: &str = "Y";
