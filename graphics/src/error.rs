//! Vertex array error types.

use std::fmt;

use crate::backend::BackendError;
use crate::types::RawType;

/// Errors that can occur while laying out, accessing or uploading a vertex array.
///
/// Contract violations (wrong attribute parameters, incompatible views,
/// out-of-order calls) are always reported as errors rather than being
/// checked only in debug builds. Allocation failures leave the array with
/// no backing store and no GPU chunk, so the failing call can be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexArrayError {
    /// A GL type enum outside the supported raw type set.
    UnsupportedRawType(u32),
    /// An attribute element count outside `1..=4`.
    InvalidElementCount(u8),
    /// The attribute handle belongs to a different array.
    ForeignAttribute,
    /// The attribute handle does not name a registered attribute.
    UnknownAttribute(usize),
    /// The requested view type does not match the attribute's raw type or element count.
    IncompatibleView {
        /// Name of the requested logical type.
        requested: &'static str,
        /// Raw type of the attribute.
        raw_type: RawType,
        /// Element count of the attribute.
        elements: u8,
    },
    /// The operation needs a backing store, but none is allocated.
    NotLaidOut,
    /// The backing store of a streaming array cannot be freed on its own.
    StreamingBackingStore,
    /// The aligned backing store allocation failed.
    OutOfMemory {
        /// Requested size in bytes (saturated on overflow).
        size: usize,
    },
    /// The buffer service could not provide a GPU chunk.
    ChunkAllocationFailed(BackendError),
    /// The buffer service failed to upload or bind an existing chunk.
    Backend(BackendError),
}

impl fmt::Display for VertexArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedRawType(gl) => write!(f, "unsupported attribute type: {gl:#06x}"),
            Self::InvalidElementCount(n) => {
                write!(f, "attribute element count must be in 1..=4, got {n}")
            }
            Self::ForeignAttribute => write!(f, "attribute belongs to another vertex array"),
            Self::UnknownAttribute(slot) => write!(f, "no attribute registered at slot {slot}"),
            Self::IncompatibleView {
                requested,
                raw_type,
                elements,
            } => write!(
                f,
                "cannot view {raw_type:?}x{elements} attribute as {requested}"
            ),
            Self::NotLaidOut => write!(f, "vertex array has no backing store, call layout first"),
            Self::StreamingBackingStore => {
                write!(f, "backing store must be retained in streaming mode")
            }
            Self::OutOfMemory { size } => {
                write!(f, "failed to allocate {size} byte backing store")
            }
            Self::ChunkAllocationFailed(err) => write!(f, "failed to allocate GPU chunk: {err}"),
            Self::Backend(err) => write!(f, "buffer service error: {err}"),
        }
    }
}

impl std::error::Error for VertexArrayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ChunkAllocationFailed(err) | Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for VertexArrayError {
    fn from(err: BackendError) -> Self {
        Self::Backend(err)
    }
}
