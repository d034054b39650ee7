use thiserror::Error;

/// Error taxonomy for the sync pipeline.
///
/// `MissingConfig` and `Authentication` abort a run before any node is
/// created; `Validation` and `RemoteRejection` are per-record failures the
/// orchestrator counts and moves past.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("no response from {operation} after retries")]
    Transport { operation: String },

    #[error("Drupal authentication failed: {0}")]
    Authentication(String),

    #[error("record validation failed: {0}")]
    Validation(String),

    #[error("Drupal rejected the request with status {status}: {body}")]
    RemoteRejection { status: u16, body: String },
}
