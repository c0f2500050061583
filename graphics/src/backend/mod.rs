//! Buffer service abstraction layer.
//!
//! Vertex arrays do not manage GPU memory themselves. They request chunks
//! from a [`BufferService`], which owns the device buffers, sub-allocates
//! regions for each array, performs uploads and issues binds on a
//! [`CommandContext`].
//!
//! # Available Services
//!
//! - [`dummy`]: CPU-only service for testing and tools
//!
//! # Ownership
//!
//! The service owns every chunk. An array only holds a [`GpuChunk`], a
//! non-owning handle that asks the service to release the chunk when it is
//! dropped. The service may move or reuse chunks between arrays, so the
//! array queries the chunk start index at bind time rather than caching it.

pub mod dummy;
mod error;

use std::any::Any;
use std::sync::{Arc, Weak};

use crate::types::ChunkDescriptor;

pub use dummy::{DummyBufferService, DummyCommand, DummyCommandContext};
pub use error::BackendError;

/// Identifier of a chunk inside a [`BufferService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(u64);

impl ChunkId {
    /// Wrap a service-specific chunk identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the service-specific identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque device command context passed through to the buffer service.
///
/// Vertex arrays never inspect the context. Services downcast it to their
/// concrete type through [`as_any_mut`](Self::as_any_mut).
pub trait CommandContext: Any {
    /// Access the context as [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A service that allocates GPU chunks and uploads and binds them.
///
/// All calls are synchronous and are expected on the thread owning the
/// rendering context. Failures are returned, never panicked.
pub trait BufferService: Send + Sync {
    /// Get the service name.
    fn name(&self) -> &'static str;

    /// Allocate a chunk for `descriptor.vertex_count` records of
    /// `descriptor.stride` bytes, initialised with `initial_data`.
    fn allocate_chunk(
        &self,
        descriptor: &ChunkDescriptor,
        initial_data: &[u8],
    ) -> Result<ChunkId, BackendError>;

    /// Replace the chunk's contents. The device copy becomes stale until
    /// the next [`upload_if_needed`](Self::upload_if_needed).
    fn update_chunk_contents(&self, chunk: ChunkId, data: &[u8]) -> Result<(), BackendError>;

    /// Upload the chunk's contents to the device if they are stale.
    fn upload_if_needed(
        &self,
        chunk: ChunkId,
        context: &mut dyn CommandContext,
    ) -> Result<(), BackendError>;

    /// Bind the device buffer holding the chunk.
    fn bind(&self, chunk: ChunkId, context: &mut dyn CommandContext) -> Result<(), BackendError>;

    /// Mark the chunk as used by the frame being prepared.
    fn prepare_for_rendering(&self, chunk: ChunkId);

    /// Index of the chunk's first record within its device buffer.
    fn chunk_start_index(&self, chunk: ChunkId) -> Option<usize>;

    /// Return the chunk to the service.
    fn release_chunk(&self, chunk: ChunkId);
}

/// Non-owning handle to a chunk held by a [`BufferService`].
///
/// Dropping the handle releases the chunk back to its service, if the
/// service is still alive.
pub struct GpuChunk {
    service: Weak<dyn BufferService>,
    id: ChunkId,
}

impl GpuChunk {
    /// Wrap a chunk freshly allocated from `service`.
    pub(crate) fn new(service: &Arc<dyn BufferService>, id: ChunkId) -> Self {
        Self {
            service: Arc::downgrade(service),
            id,
        }
    }

    /// Get the chunk identifier.
    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// Get the owning service, if it still exists.
    pub fn service(&self) -> Option<Arc<dyn BufferService>> {
        self.service.upgrade()
    }
}

impl Drop for GpuChunk {
    fn drop(&mut self) {
        if let Some(service) = self.service.upgrade() {
            log::trace!("{}: releasing chunk {}", service.name(), self.id.raw());
            service.release_chunk(self.id);
        }
    }
}

impl std::fmt::Debug for GpuChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuChunk")
            .field("id", &self.id)
            .field("service_alive", &(self.service.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BufferKind;

    #[test]
    fn test_chunk_released_on_drop() {
        let service = Arc::new(DummyBufferService::new());
        let dyn_service: Arc<dyn BufferService> = service.clone();

        let desc = ChunkDescriptor::new(4, 4, BufferKind::Vertex, false);
        let id = dyn_service.allocate_chunk(&desc, &[0; 16]).unwrap();
        let chunk = GpuChunk::new(&dyn_service, id);
        assert_eq!(service.chunk_count(), 1);

        drop(chunk);
        assert_eq!(service.chunk_count(), 0);
    }

    #[test]
    fn test_chunk_outlives_service() {
        let service: Arc<dyn BufferService> = Arc::new(DummyBufferService::new());
        let desc = ChunkDescriptor::new(4, 1, BufferKind::Vertex, false);
        let id = service.allocate_chunk(&desc, &[0; 4]).unwrap();
        let chunk = GpuChunk::new(&service, id);

        drop(service);
        assert!(chunk.service().is_none());
        // Dropping after the service is gone must not panic
        drop(chunk);
    }
}
