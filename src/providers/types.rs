use thiserror::Error;

use crate::models::ChatDetail;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("V0_API_KEY is not configured")]
    MissingApiKey,

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Chat not found: {0}")]
    NotFound(String),

    #[error("Rate limited: retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct CreateChatRequest {
    pub message: String,
    pub system: Option<String>,
}

/// Outcome of a v0 call that may answer with a chat or with an event stream.
#[derive(Debug, Clone)]
pub enum ChatResult {
    Detail(ChatDetail),
    Stream,
}
