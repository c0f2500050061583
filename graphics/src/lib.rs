//! # RedLilium Vertex Arrays
//!
//! CPU-side layout and lifecycle management for interleaved vertex and
//! index data that is uploaded to GPU buffers for rendering.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`VertexArray`] - Attribute packing, aligned backing store, upload and bind
//! - [`IndexArray`] - Tightly packed `u16` index arrays
//! - [`AttributeView`] / [`AttributeViewMut`] - Type-checked strided attribute access
//! - [`BufferService`] - Trait for the service that owns GPU buffer chunks
//! - [`DummyBufferService`] - CPU-only service for testing
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use glam::Vec3;
//! use redlilium_vertex_arrays::{
//!     Color4ub, DummyBufferService, DummyCommandContext, RawType, VertexArray,
//!     VertexArrayDescriptor,
//! };
//!
//! let service = Arc::new(DummyBufferService::new());
//! let mut array = VertexArray::new(service, VertexArrayDescriptor::vertex());
//! let position = array.add_attribute(RawType::Float32, 3)?;
//! let color = array.add_attribute(RawType::UInt8, 4)?;
//!
//! array.set_vertex_count(3);
//! array.layout()?;
//! assert_eq!(array.stride(), 16);
//!
//! array
//!     .view_mut::<Vec3>(position)?
//!     .copy_from([Vec3::X, Vec3::Y, Vec3::Z]);
//! array
//!     .view_mut::<Color4ub>(color)?
//!     .copy_from([Color4ub::new(255, 0, 0, 255); 3]);
//!
//! array.upload()?;
//! array.free_backing_store()?;
//!
//! let mut context = DummyCommandContext::new();
//! assert_eq!(array.bind(&mut context)?, Some(0));
//! # Ok::<(), redlilium_vertex_arrays::VertexArrayError>(())
//! ```

pub mod backend;
pub mod error;
pub mod resources;
pub mod types;
pub mod vertex;

// Re-export main types for convenience
pub use backend::{
    BackendError, BufferService, ChunkId, CommandContext, DummyBufferService, DummyCommand,
    DummyCommandContext, GpuChunk,
};
pub use error::VertexArrayError;
pub use resources::{BACKING_STORE_ALIGNMENT, BackingStore};
pub use types::{BufferKind, BufferUsage, ChunkDescriptor, RawType};
pub use vertex::{
    AttributeDescriptor, AttributeId, AttributeView, AttributeViewMut, Color3ub, Color4ub,
    ElementKind, IndexArray, VertexArray, VertexArrayDescriptor, ViewElement, round_stride,
};

/// Vertex arrays library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the vertex array subsystem.
///
/// Only logs the library version; arrays need no global state.
pub fn init() {
    log::info!("RedLilium Vertex Arrays v{} initialized", VERSION);
}
