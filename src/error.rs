use thiserror::Error;

/// Terminal failure modes for a single download task.
///
/// Every variant ends its own task only; the pool records it and keeps
/// running siblings. `Http`, `Incomplete` and `Io` leave the `.part` file
/// behind as the resume checkpoint for the next run.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("remote did not report a content length")]
    SizeUnavailable,

    #[error("http transfer failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("byte count mismatch: expected {expected} bytes, received {received}")]
    Incomplete { expected: u64, received: u64 },

    #[error("failed to finalize download: {0}")]
    Finalize(#[source] std::io::Error),

    #[error("file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
