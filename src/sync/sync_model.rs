use chrono::NaiveDateTime;
use serde::Serialize;

/// Outcome of one full sync invocation.
///
/// Per-connection failures are accumulated in `errors` and do not flip
/// `success`; the flag only goes false when the sync could not even determine
/// which connections to process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    pub accounts_updated: usize,
    pub errors: Vec<String>,
    pub completed_at: NaiveDateTime,
}

impl SyncResult {
    pub fn started() -> Self {
        SyncResult {
            success: true,
            accounts_updated: 0,
            errors: Vec::new(),
            completed_at: chrono::Utc::now().naive_utc(),
        }
    }
}
