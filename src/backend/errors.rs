/// Errors produced while talking to the compute backend.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum BackendError {
    #[error("Invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Backend returned HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("JSON error: {0}")]
    Json(String),
    #[error("Invalid backend response: {0}")]
    Validation(String),
    #[error("Backend worker is not running")]
    WorkerGone,
    #[error("Backend disabled (offline mode)")]
    Offline,
}
