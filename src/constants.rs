/// Trailing window, in days, over which provider transactions are fetched.
pub const TRANSACTION_WINDOW_DAYS: i64 = 30;

/// Currency assumed when a provider omits one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Per-request timeout for provider HTTP calls, in seconds.
pub const PROVIDER_REQUEST_TIMEOUT_SECS: u64 = 30;
