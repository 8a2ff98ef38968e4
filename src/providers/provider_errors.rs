use thiserror::Error;

/// Errors raised while talking to one external provider. These are always
/// scoped to a single connection: the sync orchestrator records them and
/// moves on to the next provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("API request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
    #[error("Unsupported provider kind: {0}")]
    UnsupportedKind(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::RequestFailed(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::InvalidResponse(e.to_string())
    }
}
