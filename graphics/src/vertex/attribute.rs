//! Attribute descriptors and handles.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::VertexArrayError;
use crate::types::RawType;

static NEXT_ARRAY_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a vertex array, used as the owner of its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayId(u64);

impl ArrayId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ARRAY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to an attribute registered on a [`VertexArray`](super::VertexArray).
///
/// The handle remembers its owning array. Passing it to another array is
/// rejected with [`VertexArrayError::ForeignAttribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeId {
    owner: ArrayId,
    slot: usize,
}

impl AttributeId {
    pub(crate) fn new(owner: ArrayId, slot: usize) -> Self {
        Self { owner, slot }
    }

    /// The array this attribute was registered on.
    pub fn owner(&self) -> ArrayId {
        self.owner
    }

    /// Position of the attribute in declaration order.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// One per-vertex field: raw element type, element count and the byte
/// offset assigned by the last layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeDescriptor {
    raw_type: RawType,
    elements: u8,
    offset: Option<usize>,
}

impl AttributeDescriptor {
    /// Create a descriptor, checking that `elements` is in `1..=4`.
    pub fn new(raw_type: RawType, elements: u8) -> Result<Self, VertexArrayError> {
        if !(1..=4).contains(&elements) {
            return Err(VertexArrayError::InvalidElementCount(elements));
        }
        Ok(Self::new_unchecked(raw_type, elements))
    }

    pub(crate) const fn new_unchecked(raw_type: RawType, elements: u8) -> Self {
        Self {
            raw_type,
            elements,
            offset: None,
        }
    }

    /// Raw element type.
    pub fn raw_type(&self) -> RawType {
        self.raw_type
    }

    /// Number of elements per vertex.
    pub fn elements(&self) -> u8 {
        self.elements
    }

    /// Size of the attribute in bytes.
    pub fn size(&self) -> usize {
        self.raw_type.size() * self.elements as usize
    }

    /// Byte offset within a record, or `None` if the owning array has not
    /// been laid out since the last change.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub(crate) fn set_offset(&mut self, offset: Option<usize>) {
        self.offset = offset;
    }
}
