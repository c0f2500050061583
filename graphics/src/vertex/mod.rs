//! Vertex and index arrays.
//!
//! This module provides the CPU-side layout engine:
//!
//! - [`VertexArray`] - Attribute list, packing, backing store and chunk lifecycle
//! - [`IndexArray`] - Vertex array holding one `u16` per record
//! - [`AttributeView`] / [`AttributeViewMut`] - Typed strided access to one attribute

mod array;
mod attribute;
mod index;
mod view;

pub use array::{VERTEX_ATTRIBUTE_ALIGNMENT, VertexArray, VertexArrayDescriptor, round_stride};
pub use attribute::{ArrayId, AttributeDescriptor, AttributeId};
pub use index::IndexArray;
pub use view::{
    AttributeView, AttributeViewMut, Color3ub, Color4ub, ElementKind, VIEW_RULES, ViewElement,
    ViewRule,
};
