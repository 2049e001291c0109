use thiserror::Error;

/// Failures of a remote scoring call. None of these reach the caller of
/// `ScoringService`; they select the local fallback.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("remote scorer not configured")]
    Unavailable,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream reported error: {0}")]
    Upstream(String),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}
