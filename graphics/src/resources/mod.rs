//! CPU-side resources.
//!
//! This module contains the memory owned by vertex arrays:
//! - [`BackingStore`] - Aligned allocation holding interleaved records
//!
//! GPU-side memory is owned by a [`BufferService`] and only referenced
//! through [`GpuChunk`] handles.
//!
//! [`BufferService`]: crate::backend::BufferService
//! [`GpuChunk`]: crate::backend::GpuChunk

mod backing_store;

pub(crate) use backing_store::align_up;
pub use backing_store::{BACKING_STORE_ALIGNMENT, BackingStore};
