//! Buffer types and chunk descriptors.

use bitflags::bitflags;

/// The kind of GPU buffer an array is uploaded into.
///
/// The kind changes stride rounding: vertex records are padded to 4-byte
/// boundaries and a fixed size table, index records are tightly packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferKind {
    /// Per-vertex attribute data.
    #[default]
    Vertex,
    /// Element indices.
    Index,
}

impl BufferKind {
    /// Usage flags matching this buffer kind.
    pub fn usage(self) -> BufferUsage {
        match self {
            Self::Vertex => BufferUsage::VERTEX,
            Self::Index => BufferUsage::INDEX,
        }
    }
}

bitflags! {
    /// Usage flags for GPU chunks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Chunk is read as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Chunk is read as an index buffer.
        const INDEX = 1 << 1;
        /// Chunk contents are rewritten frequently (streaming).
        const DYNAMIC = 1 << 2;
        /// Chunk can be written from the CPU.
        const COPY_DST = 1 << 3;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Request for a GPU chunk, passed to a [`BufferService`](crate::backend::BufferService).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ChunkDescriptor {
    /// Debug label for the chunk.
    pub label: Option<String>,
    /// Bytes per record.
    pub stride: usize,
    /// Number of records.
    pub vertex_count: usize,
    /// Buffer kind the chunk is bound as.
    pub kind: BufferKind,
    /// Usage flags.
    pub usage: BufferUsage,
}

impl ChunkDescriptor {
    /// Create a new chunk descriptor.
    pub fn new(stride: usize, vertex_count: usize, kind: BufferKind, dynamic: bool) -> Self {
        let mut usage = kind.usage() | BufferUsage::COPY_DST;
        if dynamic {
            usage |= BufferUsage::DYNAMIC;
        }
        Self {
            label: None,
            stride,
            vertex_count,
            kind,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Total size of the chunk in bytes.
    pub fn size(&self) -> usize {
        self.stride * self.vertex_count
    }

    /// Whether the chunk is requested for streaming.
    pub fn is_dynamic(&self) -> bool {
        self.usage.contains(BufferUsage::DYNAMIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_descriptor_usage() {
        let desc = ChunkDescriptor::new(32, 10, BufferKind::Vertex, false);
        assert_eq!(desc.usage, BufferUsage::VERTEX | BufferUsage::COPY_DST);
        assert_eq!(desc.size(), 320);
        assert!(!desc.is_dynamic());

        let desc = ChunkDescriptor::new(2, 6, BufferKind::Index, true).with_label("indices");
        assert!(desc.usage.contains(BufferUsage::INDEX | BufferUsage::DYNAMIC));
        assert_eq!(desc.label.as_deref(), Some("indices"));
    }
}
