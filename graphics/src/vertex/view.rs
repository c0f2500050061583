//! Typed, strided access to one attribute of a vertex array.
//!
//! A view is requested with a logical element type such as [`Vec3`] or
//! [`Color4ub`]. Only a fixed set of logical types is supported, each
//! tied to one raw type and a minimum element count:
//!
//! | Logical type | Raw type | Min. elements |
//! |---|---|---|
//! | [`Vec3`] | `Float32` | 3 |
//! | [`Vec4`] | `Float32` | 4 |
//! | `[f32; 2]` | `Float32` | 2 |
//! | [`Color3ub`] | `UInt8` | 3 |
//! | [`Color4ub`] | `UInt8` | 4 |
//! | `u16` | `UInt16` | 1 |
//! | `[u16; 2]` | `UInt16` | 2 |
//! | `u8` | `UInt8` | 1 |
//! | `[u8; 4]` | `UInt8` | 4 |
//! | `i16` | `Int16` | 1 |
//! | `[i16; 2]` | `Int16` | 2 |
//!
//! Views borrow the array, so the layout cannot change while one is alive.

use std::marker::PhantomData;

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::error::VertexArrayError;
use crate::types::RawType;

use super::attribute::AttributeDescriptor;

/// The closed set of logical view types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Vec3,
    Vec4,
    Float2,
    Color3ub,
    Color4ub,
    U16,
    U16x2,
    U8,
    U8x4,
    I16,
    I16x2,
}

/// Compatibility requirement for one [`ElementKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRule {
    /// Logical type the rule applies to.
    pub kind: ElementKind,
    /// Required raw type of the attribute.
    pub raw_type: RawType,
    /// Minimum element count of the attribute.
    pub min_elements: u8,
    /// Display name of the logical type.
    pub name: &'static str,
}

/// Compatibility table, indexed by `ElementKind as usize`.
pub static VIEW_RULES: [ViewRule; 11] = [
    rule(ElementKind::Vec3, RawType::Float32, 3, "Vec3"),
    rule(ElementKind::Vec4, RawType::Float32, 4, "Vec4"),
    rule(ElementKind::Float2, RawType::Float32, 2, "[f32; 2]"),
    rule(ElementKind::Color3ub, RawType::UInt8, 3, "Color3ub"),
    rule(ElementKind::Color4ub, RawType::UInt8, 4, "Color4ub"),
    rule(ElementKind::U16, RawType::UInt16, 1, "u16"),
    rule(ElementKind::U16x2, RawType::UInt16, 2, "[u16; 2]"),
    rule(ElementKind::U8, RawType::UInt8, 1, "u8"),
    rule(ElementKind::U8x4, RawType::UInt8, 4, "[u8; 4]"),
    rule(ElementKind::I16, RawType::Int16, 1, "i16"),
    rule(ElementKind::I16x2, RawType::Int16, 2, "[i16; 2]"),
];

const fn rule(
    kind: ElementKind,
    raw_type: RawType,
    min_elements: u8,
    name: &'static str,
) -> ViewRule {
    ViewRule {
        kind,
        raw_type,
        min_elements,
        name,
    }
}

impl ElementKind {
    /// Look up the compatibility rule for this kind.
    pub fn rule(self) -> &'static ViewRule {
        &VIEW_RULES[self as usize]
    }

    /// Check that an attribute can be viewed as this kind.
    pub fn check(self, attribute: &AttributeDescriptor) -> Result<(), VertexArrayError> {
        let rule = self.rule();
        if attribute.raw_type() == rule.raw_type && attribute.elements() >= rule.min_elements {
            Ok(())
        } else {
            Err(VertexArrayError::IncompatibleView {
                requested: rule.name,
                raw_type: attribute.raw_type(),
                elements: attribute.elements(),
            })
        }
    }
}

/// Packed RGB color, one byte per channel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Color3ub {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color3ub {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Packed RGBA color, one byte per channel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Color4ub {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color4ub {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A logical type an attribute can be viewed as.
///
/// Sealed: implemented exactly for the types in the module table.
pub trait ViewElement: Pod + sealed::Sealed {
    /// Entry in [`VIEW_RULES`] for this type.
    const KIND: ElementKind;
}

macro_rules! view_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}
            impl ViewElement for $ty {
                const KIND: ElementKind = ElementKind::$kind;
            }
        )*
    };
}

view_element! {
    Vec3 => Vec3,
    Vec4 => Vec4,
    [f32; 2] => Float2,
    Color3ub => Color3ub,
    Color4ub => Color4ub,
    u16 => U16,
    [u16; 2] => U16x2,
    u8 => U8,
    [u8; 4] => U8x4,
    i16 => I16,
    [i16; 2] => I16x2,
}

fn element_range<T>(index: usize, stride: usize) -> std::ops::Range<usize> {
    let start = index * stride;
    start..start + std::mem::size_of::<T>()
}

/// Read-only strided view of one attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttributeView<'a, T> {
    bytes: &'a [u8],
    stride: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: ViewElement> AttributeView<'a, T> {
    /// `bytes` starts at the attribute's offset in the first record.
    pub(crate) fn new(bytes: &'a [u8], stride: usize, len: usize) -> Self {
        Self {
            bytes,
            stride,
            len,
            _marker: PhantomData,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view covers no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance in bytes between consecutive elements.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Read the element of record `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        (index < self.len).then(|| self.read(index))
    }

    /// Iterate over all elements in record order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(|i| self.read(i))
    }

    fn read(&self, index: usize) -> T {
        bytemuck::pod_read_unaligned(&self.bytes[element_range::<T>(index, self.stride)])
    }
}

/// Mutable strided view of one attribute.
#[derive(Debug)]
pub struct AttributeViewMut<'a, T> {
    bytes: &'a mut [u8],
    stride: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: ViewElement> AttributeViewMut<'a, T> {
    pub(crate) fn new(bytes: &'a mut [u8], stride: usize, len: usize) -> Self {
        Self {
            bytes,
            stride,
            len,
            _marker: PhantomData,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view covers no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance in bytes between consecutive elements.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Read the element of record `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.as_view().get(index)
    }

    /// Write the element of record `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set(&mut self, index: usize, value: T) {
        assert!(
            index < self.len,
            "index {index} out of range for attribute view of length {}",
            self.len
        );
        self.bytes[element_range::<T>(index, self.stride)]
            .copy_from_slice(bytemuck::bytes_of(&value));
    }

    /// Write consecutive elements from the first record on.
    ///
    /// Stops at the end of the view. Returns the number of elements written.
    pub fn copy_from(&mut self, values: impl IntoIterator<Item = T>) -> usize {
        let mut written = 0;
        for (index, value) in values.into_iter().take(self.len).enumerate() {
            self.set(index, value);
            written += 1;
        }
        written
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> AttributeView<'_, T> {
        AttributeView::new(&*self.bytes, self.stride, self.len)
    }
}
