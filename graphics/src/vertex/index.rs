//! Index arrays: vertex arrays holding a single `u16` index per record.

use std::ops::Deref;
use std::sync::Arc;

use crate::backend::{BufferService, CommandContext};
use crate::error::VertexArrayError;
use crate::types::{BufferKind, RawType};

use super::array::{VertexArray, VertexArrayDescriptor};
use super::attribute::{AttributeDescriptor, AttributeId};
use super::view::{AttributeView, AttributeViewMut};

/// A [`VertexArray`] of kind [`Index`](crate::types::BufferKind::Index)
/// with exactly one `UInt16`x1 attribute.
///
/// Records are packed tightly, so the backing store of an `N` index array
/// is `2 * N` bytes. Attribute registration is not exposed; read access to
/// the underlying array goes through `Deref`.
#[derive(Debug)]
pub struct IndexArray {
    array: VertexArray,
    indices: AttributeId,
}

impl IndexArray {
    /// Create an index array. `dynamic` enables streaming mode.
    pub fn new(service: Arc<dyn BufferService>, dynamic: bool) -> Self {
        let mut descriptor = VertexArrayDescriptor::index();
        descriptor.dynamic = dynamic;
        Self::with_descriptor(service, descriptor)
    }

    /// Create an index array from a descriptor, forcing its kind to `Index`.
    pub fn with_descriptor(
        service: Arc<dyn BufferService>,
        descriptor: VertexArrayDescriptor,
    ) -> Self {
        let descriptor = VertexArrayDescriptor {
            kind: BufferKind::Index,
            ..descriptor
        };
        let mut array = VertexArray::new(service, descriptor);
        let indices = array.push_attribute(AttributeDescriptor::new_unchecked(RawType::UInt16, 1));
        Self { array, indices }
    }

    /// Handle of the index attribute.
    pub fn attribute_id(&self) -> AttributeId {
        self.indices
    }

    /// Read-only view of the indices.
    pub fn indices(&self) -> Result<AttributeView<'_, u16>, VertexArrayError> {
        self.array.view(self.indices)
    }

    /// Mutable view of the indices.
    pub fn indices_mut(&mut self) -> Result<AttributeViewMut<'_, u16>, VertexArrayError> {
        self.array.view_mut(self.indices)
    }

    /// See [`VertexArray::set_vertex_count`].
    pub fn set_index_count(&mut self, count: usize) {
        self.array.set_vertex_count(count);
    }

    /// See [`VertexArray::layout`].
    pub fn layout(&mut self) -> Result<(), VertexArrayError> {
        self.array.layout()
    }

    /// See [`VertexArray::upload`].
    pub fn upload(&mut self) -> Result<(), VertexArrayError> {
        self.array.upload()
    }

    /// See [`VertexArray::free_backing_store`].
    pub fn free_backing_store(&mut self) -> Result<(), VertexArrayError> {
        self.array.free_backing_store()
    }

    /// See [`VertexArray::bind`].
    pub fn bind(
        &self,
        context: &mut dyn CommandContext,
    ) -> Result<Option<usize>, VertexArrayError> {
        self.array.bind(context)
    }
}

impl Deref for IndexArray {
    type Target = VertexArray;

    fn deref(&self) -> &Self::Target {
        &self.array
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBufferService;

    #[test]
    fn test_single_u16_attribute() {
        let indices = IndexArray::new(Arc::new(DummyBufferService::new()), false);
        assert_eq!(indices.kind(), BufferKind::Index);
        assert_eq!(indices.attributes().len(), 1);

        let attribute = &indices.attributes()[0];
        assert_eq!(attribute.raw_type(), RawType::UInt16);
        assert_eq!(attribute.elements(), 1);
    }

    #[test]
    fn test_backing_store_is_two_bytes_per_index() {
        let mut indices = IndexArray::new(Arc::new(DummyBufferService::new()), false);
        for count in [1, 3, 7, 100] {
            indices.set_index_count(count);
            indices.layout().unwrap();
            assert_eq!(indices.stride(), 2);
            assert_eq!(indices.backing_store().map(<[u8]>::len), Some(2 * count));
        }
    }

    #[test]
    fn test_kind_forced_to_index() {
        let descriptor = VertexArrayDescriptor::vertex().with_label("quad_indices");
        let indices = IndexArray::with_descriptor(Arc::new(DummyBufferService::new()), descriptor);
        assert_eq!(indices.kind(), BufferKind::Index);
        assert_eq!(indices.label(), Some("quad_indices"));
    }

    #[test]
    fn test_indices_roundtrip() {
        let mut indices = IndexArray::new(Arc::new(DummyBufferService::new()), true);
        indices.set_index_count(6);
        indices.layout().unwrap();
        indices.indices_mut().unwrap().copy_from([0, 1, 2, 2, 1, 3]);

        let read: Vec<u16> = indices.indices().unwrap().iter().collect();
        assert_eq!(read, vec![0, 1, 2, 2, 1, 3]);
    }
}
