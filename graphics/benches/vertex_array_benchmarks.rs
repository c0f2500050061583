use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::Vec3;

use redlilium_vertex_arrays::{
    BufferService, Color4ub, DummyBufferService, DummyCommandContext, IndexArray, RawType,
    VertexArray, VertexArrayDescriptor,
};

fn service() -> Arc<dyn BufferService> {
    Arc::new(DummyBufferService::new())
}

fn mesh(service: Arc<dyn BufferService>, vertex_count: usize) -> VertexArray {
    let mut array = VertexArray::new(service, VertexArrayDescriptor::vertex());
    array.add_attribute(RawType::Float32, 3).unwrap();
    array.add_attribute(RawType::Float32, 3).unwrap();
    array.add_attribute(RawType::UInt8, 4).unwrap();
    array.add_attribute(RawType::Float32, 2).unwrap();
    array.set_vertex_count(vertex_count);
    array
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn bench_layout_small(c: &mut Criterion) {
    let service = service();
    c.bench_function("vertex_array_layout_64_vertices", |b| {
        b.iter_with_setup(
            || mesh(service.clone(), 64),
            |mut array| {
                array.layout().unwrap();
                black_box(&array);
            },
        );
    });
}

fn bench_layout_large(c: &mut Criterion) {
    let service = service();
    c.bench_function("vertex_array_layout_65536_vertices", |b| {
        b.iter_with_setup(
            || mesh(service.clone(), 65_536),
            |mut array| {
                array.layout().unwrap();
                black_box(&array);
            },
        );
    });
}

// ---------------------------------------------------------------------------
// Strided access
// ---------------------------------------------------------------------------

fn bench_strided_write(c: &mut Criterion) {
    let service = service();
    let mut array = VertexArray::new(service, VertexArrayDescriptor::vertex());
    let position = array.add_attribute(RawType::Float32, 3).unwrap();
    let color = array.add_attribute(RawType::UInt8, 4).unwrap();
    array.set_vertex_count(16_384);
    array.layout().unwrap();

    c.bench_function("vertex_array_write_16384_vertices", |b| {
        b.iter(|| {
            array
                .view_mut::<Vec3>(position)
                .unwrap()
                .copy_from((0..16_384).map(|i| Vec3::splat(i as f32)));
            array
                .view_mut::<Color4ub>(color)
                .unwrap()
                .copy_from(std::iter::repeat_n(Color4ub::new(255, 128, 0, 255), 16_384));
            black_box(array.backing_store());
        });
    });
}

fn bench_strided_read(c: &mut Criterion) {
    let service = service();
    let mut array = VertexArray::new(service, VertexArrayDescriptor::vertex());
    let position = array.add_attribute(RawType::Float32, 3).unwrap();
    array.add_attribute(RawType::Float32, 2).unwrap();
    array.set_vertex_count(16_384);
    array.layout().unwrap();

    c.bench_function("vertex_array_read_16384_vertices", |b| {
        b.iter(|| {
            let view = array.view::<Vec3>(position).unwrap();
            let sum = view.iter().fold(Vec3::ZERO, |acc, v| acc + v);
            black_box(sum);
        });
    });
}

// ---------------------------------------------------------------------------
// Upload and bind
// ---------------------------------------------------------------------------

fn bench_upload_bind(c: &mut Criterion) {
    let service = service();
    c.bench_function("vertex_array_upload_bind_4096_vertices", |b| {
        b.iter_with_setup(
            || {
                let mut array = mesh(service.clone(), 4096);
                array.layout().unwrap();
                array
            },
            |mut array| {
                let mut context = DummyCommandContext::new();
                array.upload().unwrap();
                black_box(array.bind(&mut context).unwrap());
            },
        );
    });
}

fn bench_index_array(c: &mut Criterion) {
    let service = service();
    c.bench_function("index_array_fill_upload_6144_indices", |b| {
        b.iter_with_setup(
            || {
                let mut indices = IndexArray::new(service.clone(), false);
                indices.set_index_count(6144);
                indices.layout().unwrap();
                indices
            },
            |mut indices| {
                indices
                    .indices_mut()
                    .unwrap()
                    .copy_from((0..6144u32).map(|i| (i % 4096) as u16));
                indices.upload().unwrap();
                black_box(&indices);
            },
        );
    });
}

criterion_group!(
    benches,
    bench_layout_small,
    bench_layout_large,
    bench_strided_write,
    bench_strided_read,
    bench_upload_bind,
    bench_index_array,
);
criterion_main!(benches);
