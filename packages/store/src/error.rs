/// Failure reading or writing persisted client state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}
