use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode value: {0}")]
    Json(#[from] serde_json::Error),

    /// The backing medium refused the write (quota, read-only, disabled).
    #[error("storage is not writable: {0}")]
    Unwritable(String),
}
