//! Backend error types.

/// Errors reported by a [`BufferService`](super::BufferService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The buffer pool has no room for the requested chunk.
    OutOfMemory,
    /// Failed to create the underlying device buffer.
    ResourceCreationFailed(String),
    /// The chunk handle is not (or no longer) known to the service.
    UnknownChunk(u64),
    /// Invalid parameter.
    InvalidParameter(String),
    /// Internal backend error.
    Internal(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "out of GPU buffer memory"),
            Self::ResourceCreationFailed(msg) => write!(f, "resource creation failed: {msg}"),
            Self::UnknownChunk(id) => write!(f, "unknown chunk {id}"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::Internal(msg) => write!(f, "internal backend error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}
