//! Aligned CPU-side storage for interleaved vertex data.
//!
//! A [`BackingStore`] is the authoritative CPU copy of a vertex array's
//! records. It is a single zero-initialised allocation aligned to
//! [`BACKING_STORE_ALIGNMENT`] bytes, exclusively owned by one array and
//! released when dropped.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::error::VertexArrayError;

/// Alignment of every backing store allocation in bytes.
pub const BACKING_STORE_ALIGNMENT: usize = 16;

/// A zero-initialised, 16-byte aligned byte buffer.
pub struct BackingStore {
    ptr: NonNull<u8>,
    len: usize,
    layout: Layout,
}

impl BackingStore {
    /// Allocate a backing store of `size` bytes.
    ///
    /// Returns [`VertexArrayError::OutOfMemory`] if the size is not a valid
    /// allocation size or the allocator reports failure.
    pub fn new(size: usize) -> Result<Self, VertexArrayError> {
        // Zero-sized allocations are not allowed by the global allocator.
        let layout = Layout::from_size_align(size.max(1), BACKING_STORE_ALIGNMENT)
            .map_err(|_| VertexArrayError::OutOfMemory { size })?;

        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).ok_or(VertexArrayError::OutOfMemory { size })?;

        Ok(Self {
            ptr,
            len: size,
            layout,
        })
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the store holds zero bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Base address of the allocation.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// The stored bytes.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` points to at least `len` initialised bytes owned by `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The stored bytes, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for BackingStore {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed` with this exact layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

impl std::fmt::Debug for BackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackingStore")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

// SAFETY: the allocation is uniquely owned, like a `Box<[u8]>`.
unsafe impl Send for BackingStore {}
unsafe impl Sync for BackingStore {}

static_assertions::assert_impl_all!(BackingStore: Send, Sync);

/// Align a value up to the given power-of-two alignment.
#[inline]
pub(crate) fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}
