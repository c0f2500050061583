//! Interleaved vertex arrays with a CPU backing store and a GPU chunk.
//!
//! A [`VertexArray`] owns a list of attributes, computes their offsets and
//! the record stride, allocates an aligned [`BackingStore`] for
//! `stride * vertex_count` bytes, and hands the bytes to a
//! [`BufferService`] for upload.
//!
//! # Usage Cycle
//!
//! ```ignore
//! let mut array = VertexArray::new(service.clone(), VertexArrayDescriptor::vertex());
//! let position = array.add_attribute(RawType::Float32, 3)?;
//! let color = array.add_attribute(RawType::UInt8, 4)?;
//! array.set_vertex_count(vertices.len());
//! array.layout()?;
//!
//! array.view_mut::<Vec3>(position)?.copy_from(vertices.iter().copied());
//! array.view_mut::<Color4ub>(color)?.copy_from(colors.iter().copied());
//!
//! array.upload()?;
//! array.free_backing_store()?; // static arrays only
//!
//! let base = array.bind(&mut context)?;
//! ```
//!
//! # Layout
//!
//! Attributes are packed in **reverse** declaration order: the last
//! declared attribute gets offset 0. For vertex buffers each attribute end
//! is padded to 4 bytes and the final stride is rounded with
//! [`round_stride`]. Index buffers are packed tightly.
//!
//! Registering an attribute or changing the vertex count drops the backing
//! store and the GPU chunk; [`VertexArray::layout`] must run again.

use std::sync::Arc;

use crate::backend::{BackendError, BufferService, ChunkId, CommandContext, GpuChunk};
use crate::error::VertexArrayError;
use crate::resources::{BackingStore, align_up};
use crate::types::{BufferKind, ChunkDescriptor, RawType};

use super::attribute::{ArrayId, AttributeDescriptor, AttributeId};
use super::view::{AttributeView, AttributeViewMut, ViewElement};

/// Alignment of each attribute end within a vertex record.
pub const VERTEX_ATTRIBUTE_ALIGNMENT: usize = 4;

/// Round a vertex record stride up to 4, 8, 16 or the next multiple of 32.
///
/// A stride of 0 stays 0.
pub fn round_stride(stride: usize) -> usize {
    match stride {
        0 => 0,
        1..=4 => 4,
        5..=8 => 8,
        9..=16 => 16,
        _ => align_up(stride, 32),
    }
}

/// Descriptor for creating a vertex array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexArrayDescriptor {
    /// Debug label, forwarded to the chunk request.
    pub label: Option<String>,
    /// Buffer kind the array is uploaded as.
    pub kind: BufferKind,
    /// Streaming mode: contents are rewritten and re-uploaded frequently,
    /// so the backing store is never released on its own.
    pub dynamic: bool,
}

impl VertexArrayDescriptor {
    /// Create a descriptor for the given buffer kind.
    pub fn new(kind: BufferKind) -> Self {
        Self {
            label: None,
            kind,
            dynamic: false,
        }
    }

    /// Descriptor for a static vertex buffer array.
    pub fn vertex() -> Self {
        Self::new(BufferKind::Vertex)
    }

    /// Descriptor for a static index buffer array.
    pub fn index() -> Self {
        Self::new(BufferKind::Index)
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Enable streaming mode.
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }
}

/// A set of interleaved per-vertex attributes with CPU and GPU storage.
pub struct VertexArray {
    id: ArrayId,
    descriptor: VertexArrayDescriptor,
    service: Arc<dyn BufferService>,
    attributes: Vec<AttributeDescriptor>,
    vertex_count: usize,
    stride: usize,
    backing_store: Option<BackingStore>,
    chunk: Option<GpuChunk>,
}

impl VertexArray {
    /// Create an empty array that uploads through `service`.
    pub fn new(service: Arc<dyn BufferService>, descriptor: VertexArrayDescriptor) -> Self {
        Self {
            id: ArrayId::next(),
            descriptor,
            service,
            attributes: Vec::new(),
            vertex_count: 0,
            stride: 0,
            backing_store: None,
            chunk: None,
        }
    }

    /// Identity of this array, as recorded in its attribute handles.
    pub fn id(&self) -> ArrayId {
        self.id
    }

    /// Get the descriptor.
    pub fn descriptor(&self) -> &VertexArrayDescriptor {
        &self.descriptor
    }

    /// Get the debug label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    /// Buffer kind.
    pub fn kind(&self) -> BufferKind {
        self.descriptor.kind
    }

    /// Whether the array is in streaming mode.
    pub fn is_dynamic(&self) -> bool {
        self.descriptor.dynamic
    }

    /// Number of records the backing store is sized for.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Bytes per record, or 0 if the array is not laid out.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Registered attributes in declaration order.
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Whether a backing store is allocated.
    pub fn has_backing_store(&self) -> bool {
        self.backing_store.is_some()
    }

    /// The backing store contents, if allocated.
    pub fn backing_store(&self) -> Option<&[u8]> {
        self.backing_store.as_ref().map(BackingStore::as_slice)
    }

    /// Whether a GPU chunk is associated.
    pub fn has_chunk(&self) -> bool {
        self.chunk.is_some()
    }

    /// Identifier of the associated GPU chunk.
    pub fn chunk_id(&self) -> Option<ChunkId> {
        self.chunk.as_ref().map(GpuChunk::id)
    }

    /// Set the number of records. Changing it drops the backing store and
    /// GPU chunk.
    pub fn set_vertex_count(&mut self, vertex_count: usize) {
        if vertex_count == self.vertex_count {
            return;
        }
        self.free();
        self.vertex_count = vertex_count;
    }

    /// Register an attribute of `elements` values of `raw_type`.
    ///
    /// Drops the backing store and GPU chunk.
    pub fn add_attribute(
        &mut self,
        raw_type: RawType,
        elements: u8,
    ) -> Result<AttributeId, VertexArrayError> {
        let descriptor = AttributeDescriptor::new(raw_type, elements)?;
        Ok(self.push_attribute(descriptor))
    }

    /// Register an attribute whose type is given as an OpenGL type enum.
    pub fn add_gl_attribute(
        &mut self,
        gl_type: u32,
        elements: u8,
    ) -> Result<AttributeId, VertexArrayError> {
        self.add_attribute(RawType::try_from(gl_type)?, elements)
    }

    pub(crate) fn push_attribute(&mut self, descriptor: AttributeDescriptor) -> AttributeId {
        let id = AttributeId::new(self.id, self.attributes.len());
        self.attributes.push(descriptor);
        self.free();
        id
    }

    /// Get a registered attribute.
    pub fn attribute(&self, id: AttributeId) -> Result<&AttributeDescriptor, VertexArrayError> {
        if id.owner() != self.id {
            return Err(VertexArrayError::ForeignAttribute);
        }
        self.attributes
            .get(id.slot())
            .ok_or(VertexArrayError::UnknownAttribute(id.slot()))
    }

    /// Assign attribute offsets, compute the stride and allocate the
    /// backing store.
    ///
    /// On allocation failure the array is left without backing store, chunk
    /// or offsets, and the call can be retried.
    pub fn layout(&mut self) -> Result<(), VertexArrayError> {
        self.free();

        let kind = self.descriptor.kind;
        let mut stride = 0;
        for attribute in self.attributes.iter_mut().rev() {
            attribute.set_offset(Some(stride));
            stride += attribute.size();
            if kind == BufferKind::Vertex {
                stride = align_up(stride, VERTEX_ATTRIBUTE_ALIGNMENT);
            }
        }
        if kind == BufferKind::Vertex {
            stride = round_stride(stride);
        }
        self.stride = stride;

        if stride > 0 {
            let size = stride.checked_mul(self.vertex_count).unwrap_or(usize::MAX);
            match BackingStore::new(size) {
                Ok(store) => self.backing_store = Some(store),
                Err(err) => {
                    log::error!(
                        "Failed to allocate backing store for vertex array {:?}: {}",
                        self.descriptor.label,
                        err
                    );
                    self.free();
                    return Err(err);
                }
            }
        }

        log::trace!(
            "VertexArray {:?}: laid out {} attributes, stride {}, {} vertices",
            self.descriptor.label,
            self.attributes.len(),
            self.stride,
            self.vertex_count
        );
        Ok(())
    }

    /// Copy the backing store to the GPU chunk, allocating the chunk from
    /// the service on first use.
    ///
    /// A failed chunk allocation is logged and returned; no chunk is
    /// associated and the call can be retried.
    pub fn upload(&mut self) -> Result<(), VertexArrayError> {
        let store = self
            .backing_store
            .as_ref()
            .ok_or(VertexArrayError::NotLaidOut)?;

        if let Some(chunk) = &self.chunk {
            log::trace!(
                "VertexArray {:?}: updating chunk {} ({} bytes)",
                self.descriptor.label,
                chunk.id().raw(),
                store.len()
            );
            self.service.update_chunk_contents(chunk.id(), store.as_slice())?;
            return Ok(());
        }

        let mut request = ChunkDescriptor::new(
            self.stride,
            self.vertex_count,
            self.descriptor.kind,
            self.descriptor.dynamic,
        );
        if let Some(label) = &self.descriptor.label {
            request = request.with_label(label.clone());
        }

        match self.service.allocate_chunk(&request, store.as_slice()) {
            Ok(id) => {
                self.chunk = Some(GpuChunk::new(&self.service, id));
                Ok(())
            }
            Err(err) => {
                log::error!(
                    "Failed to allocate GPU chunk for vertex array {:?}: {}",
                    self.descriptor.label,
                    err
                );
                Err(VertexArrayError::ChunkAllocationFailed(err))
            }
        }
    }

    /// Upload the chunk contents if the service holds stale data.
    ///
    /// Does nothing if no chunk is associated.
    pub fn upload_if_needed(
        &self,
        context: &mut dyn CommandContext,
    ) -> Result<(), VertexArrayError> {
        if let Some(chunk) = &self.chunk {
            self.service.upload_if_needed(chunk.id(), context)?;
        }
        Ok(())
    }

    /// Bind the array for drawing.
    ///
    /// Returns the byte offset of the first record within the bound device
    /// buffer, to be added to attribute offsets when describing attribute
    /// pointers. Returns `Ok(None)` if the array was never uploaded.
    pub fn bind(
        &self,
        context: &mut dyn CommandContext,
    ) -> Result<Option<usize>, VertexArrayError> {
        let Some(chunk) = &self.chunk else {
            return Ok(None);
        };

        self.upload_if_needed(context)?;
        self.service.bind(chunk.id(), context)?;

        let start_index = self
            .service
            .chunk_start_index(chunk.id())
            .ok_or(BackendError::UnknownChunk(chunk.id().raw()))?;
        Ok(Some(start_index * self.stride))
    }

    /// Tell the service the chunk is used by the frame being prepared.
    pub fn prepare_for_rendering(&self) {
        if let Some(chunk) = &self.chunk {
            self.service.prepare_for_rendering(chunk.id());
        }
    }

    /// Release the backing store while keeping the GPU chunk.
    ///
    /// Refused for streaming arrays, whose CPU copy stays authoritative.
    pub fn free_backing_store(&mut self) -> Result<(), VertexArrayError> {
        if self.descriptor.dynamic {
            log::warn!(
                "VertexArray {:?}: backing store must be retained in streaming mode",
                self.descriptor.label
            );
            return Err(VertexArrayError::StreamingBackingStore);
        }
        self.backing_store = None;
        Ok(())
    }

    /// Read-only view of an attribute as `T`.
    pub fn view<T: ViewElement>(
        &self,
        id: AttributeId,
    ) -> Result<AttributeView<'_, T>, VertexArrayError> {
        let offset = self.view_offset::<T>(id)?;
        let store = self
            .backing_store
            .as_ref()
            .ok_or(VertexArrayError::NotLaidOut)?;
        let bytes = store.as_slice().get(offset..).unwrap_or_default();
        Ok(AttributeView::new(bytes, self.stride, self.vertex_count))
    }

    /// Mutable view of an attribute as `T`.
    pub fn view_mut<T: ViewElement>(
        &mut self,
        id: AttributeId,
    ) -> Result<AttributeViewMut<'_, T>, VertexArrayError> {
        let offset = self.view_offset::<T>(id)?;
        let store = self
            .backing_store
            .as_mut()
            .ok_or(VertexArrayError::NotLaidOut)?;
        let bytes = store.as_mut_slice().get_mut(offset..).unwrap_or_default();
        Ok(AttributeViewMut::new(bytes, self.stride, self.vertex_count))
    }

    fn view_offset<T: ViewElement>(&self, id: AttributeId) -> Result<usize, VertexArrayError> {
        let attribute = self.attribute(id)?;
        T::KIND.check(attribute)?;
        attribute.offset().ok_or(VertexArrayError::NotLaidOut)
    }

    // Drops all layout-dependent state. Runs on every mutation and on layout.
    fn free(&mut self) {
        if self.backing_store.is_some() || self.chunk.is_some() {
            log::debug!(
                "VertexArray {:?}: releasing backing store and chunk",
                self.descriptor.label
            );
        }
        self.backing_store = None;
        self.chunk = None;
        self.stride = 0;
        for attribute in &mut self.attributes {
            attribute.set_offset(None);
        }
    }
}

impl std::fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexArray")
            .field("label", &self.descriptor.label)
            .field("kind", &self.descriptor.kind)
            .field("dynamic", &self.descriptor.dynamic)
            .field("attributes", &self.attributes)
            .field("vertex_count", &self.vertex_count)
            .field("stride", &self.stride)
            .field("backing_store", &self.backing_store)
            .field("chunk", &self.chunk)
            .field("service", &self.service.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBufferService;

    fn vertex_array() -> VertexArray {
        VertexArray::new(
            Arc::new(DummyBufferService::new()),
            VertexArrayDescriptor::vertex(),
        )
    }

    #[test]
    fn test_round_stride_table() {
        let inputs = [0, 3, 4, 7, 8, 15, 16, 17, 33];
        let expected = [0, 4, 4, 8, 8, 16, 16, 32, 64];
        for (input, expected) in inputs.into_iter().zip(expected) {
            assert_eq!(round_stride(input), expected, "stride {input}");
        }
    }

    #[test]
    fn test_reverse_packing() {
        let mut array = vertex_array();
        let a = array.add_attribute(RawType::Float32, 3).unwrap();
        let b = array.add_attribute(RawType::UInt8, 4).unwrap();
        let c = array.add_attribute(RawType::Float32, 2).unwrap();
        array.set_vertex_count(10);
        array.layout().unwrap();

        assert_eq!(array.attribute(c).unwrap().offset(), Some(0));
        assert_eq!(array.attribute(b).unwrap().offset(), Some(8));
        assert_eq!(array.attribute(a).unwrap().offset(), Some(12));
        assert_eq!(array.stride(), 32);
        assert_eq!(array.backing_store().map(<[u8]>::len), Some(320));
    }

    #[test]
    fn test_attribute_end_padded_to_four() {
        let mut array = vertex_array();
        let a = array.add_attribute(RawType::Float32, 1).unwrap();
        let b = array.add_attribute(RawType::UInt8, 3).unwrap();
        array.set_vertex_count(1);
        array.layout().unwrap();

        // 3 bytes padded to 4 before the float
        assert_eq!(array.attribute(b).unwrap().offset(), Some(0));
        assert_eq!(array.attribute(a).unwrap().offset(), Some(4));
        assert_eq!(array.stride(), 8);
    }

    #[test]
    fn test_empty_array_has_no_backing_store() {
        let mut array = vertex_array();
        array.set_vertex_count(16);
        array.layout().unwrap();
        assert_eq!(array.stride(), 0);
        assert!(!array.has_backing_store());
    }

    #[test]
    fn test_invalid_attribute_rejected() {
        let mut array = vertex_array();
        assert_eq!(
            array.add_attribute(RawType::Int16, 0),
            Err(VertexArrayError::InvalidElementCount(0))
        );
        assert_eq!(
            array.add_gl_attribute(0x1405, 1),
            Err(VertexArrayError::UnsupportedRawType(0x1405))
        );
        assert!(array.attributes().is_empty());
    }

    #[test]
    fn test_foreign_attribute_rejected() {
        let mut first = vertex_array();
        let mut second = vertex_array();
        let id = first.add_attribute(RawType::Float32, 3).unwrap();
        second.add_attribute(RawType::Float32, 3).unwrap();

        assert_eq!(
            second.attribute(id).unwrap_err(),
            VertexArrayError::ForeignAttribute
        );
    }

    #[test]
    fn test_stride_overflow_reports_out_of_memory() {
        let mut array = vertex_array();
        let id = array.add_attribute(RawType::Float32, 4).unwrap();
        array.set_vertex_count(usize::MAX / 8);

        assert!(matches!(
            array.layout(),
            Err(VertexArrayError::OutOfMemory { .. })
        ));
        assert!(!array.has_backing_store());
        assert_eq!(array.attribute(id).unwrap().offset(), None);
    }

    #[test]
    fn test_same_vertex_count_keeps_backing_store() {
        let mut array = vertex_array();
        array.add_attribute(RawType::UInt16, 2).unwrap();
        array.set_vertex_count(4);
        array.layout().unwrap();

        array.set_vertex_count(4);
        assert!(array.has_backing_store());
    }
}
