//! Common types and descriptors for vertex arrays.
//!
//! This module contains the raw element type enum, buffer kinds, usage flags
//! and the chunk descriptor handed to the buffer service.

mod buffer;
mod raw;

pub use buffer::{BufferKind, BufferUsage, ChunkDescriptor};
pub use raw::{RawType, gl};
