//! Common utilities for vertex array integration tests.

use std::sync::Arc;

use redlilium_vertex_arrays::{
    AttributeId, BufferService, DummyBufferService, RawType, VertexArray, VertexArrayDescriptor,
};

/// Initialize logging once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

/// A dummy service and a handle usable as `Arc<dyn BufferService>`.
pub fn dummy_service() -> (Arc<DummyBufferService>, Arc<dyn BufferService>) {
    let service = Arc::new(DummyBufferService::new());
    let shared: Arc<dyn BufferService> = service.clone();
    (service, shared)
}

/// Attributes of the mesh built by [`mesh_array`], in declaration order.
#[allow(dead_code)]
pub struct MeshAttributes {
    pub position: AttributeId,
    pub color: AttributeId,
    pub uv: AttributeId,
}

/// Vertex array with position (F32x3), color (U8x4) and uv (F32x2),
/// laid out for `vertex_count` vertices.
pub fn mesh_array(
    service: Arc<dyn BufferService>,
    descriptor: VertexArrayDescriptor,
    vertex_count: usize,
) -> (VertexArray, MeshAttributes) {
    let mut array = VertexArray::new(service, descriptor);
    let position = array.add_attribute(RawType::Float32, 3).unwrap();
    let color = array.add_attribute(RawType::UInt8, 4).unwrap();
    let uv = array.add_attribute(RawType::Float32, 2).unwrap();
    array.set_vertex_count(vertex_count);
    array.layout().unwrap();
    (
        array,
        MeshAttributes {
            position,
            color,
            uv,
        },
    )
}
