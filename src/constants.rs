//! Project constants
//!
//! Defaults for the ranking policy, the polling scheduler and the wire
//! formats. Config values fall back to these when a field is omitted.

/// Address denoting the chain-native asset in quotes and rate lookups
pub const NATIVE_TOKEN_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Native currency precision (wei per native unit = 10^18)
pub const NATIVE_DECIMALS: u8 = 18;

/// Decimal shift between gwei and the native unit
pub const GWEI_DECIMALS: u32 = 9;

/// Quote ranking policy
pub mod ranking {
    /// Ceiling on the estimated processing time of the best-priced
    /// quote. A quote at or above this ETA is skipped when the user
    /// sorts by adjusted return.
    pub const MAX_ETA_SECONDS: u64 = 3600;

    /// Minimum ratio between a fast quote's adjusted return and the
    /// best adjusted return in the batch. A fast quote below this
    /// ratio is skipped when the user sorts by ETA.
    pub const RETURN_VALUE_TOLERANCE: f64 = 0.80;
}

/// Transaction status polling
pub mod tracker {
    /// Interval between status polls, shared by all active sessions
    pub const POLL_INTERVAL_SECS: u64 = 10;
}

/// Status API defaults
pub mod api {
    /// Base URL of the bridge aggregator status API
    pub const STATUS_API_BASE: &str = "https://bridge-api.crosslane.dev/v1";

    /// Per-request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;
}

/// Display formatting
pub mod display {
    /// Default precision for token amounts
    pub const TOKEN_AMOUNT_PRECISION: u32 = 6;

    /// Default precision for fiat amounts
    pub const FIAT_AMOUNT_PRECISION: u32 = 2;
}
