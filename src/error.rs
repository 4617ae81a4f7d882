use thiserror::Error;

/// Failures at the persistent-settings boundary.
///
/// These never escape to the page: the controller recovers by applying
/// a neutral built-in configuration and logging the failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
