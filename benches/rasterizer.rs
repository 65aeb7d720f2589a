use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use softras::math::Vec3;
use softras::render::renderer::Renderer;
use softras::render::state::RenderState;
use softras::shaders::{ColorVertex, VertexColorShader};

const BUFFER_WIDTH: i32 = 800;
const BUFFER_HEIGHT: i32 = 600;

fn triangle(scale: f32) -> [ColorVertex; 3] {
    [
        ColorVertex::new(
            Vec3::new(-scale, -scale, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ),
        ColorVertex::new(Vec3::new(scale, -scale, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        ColorVertex::new(Vec3::new(0.0, scale, 0.0), Vec3::new(0.0, 0.0, 1.0)),
    ]
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");

    for (name, scale) in [("small", 0.05), ("medium", 0.3), ("large", 0.9)] {
        let verts = triangle(scale);
        group.bench_with_input(BenchmarkId::new("process", name), &verts, |b, verts| {
            let mut renderer = Renderer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
            let mut shader = VertexColorShader::new();
            b.iter(|| {
                renderer.process_triangle(
                    &mut shader,
                    black_box(&verts[0]),
                    black_box(&verts[1]),
                    black_box(&verts[2]),
                );
            });
        });
    }

    group.finish();
}

fn benchmark_many_triangles(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_triangles");

    // A 20x20 grid of small triangles spread across the viewport.
    let triangles: Vec<[ColorVertex; 3]> = (0..20)
        .flat_map(|row| {
            (0..20).map(move |col| {
                let x = col as f32 / 10.0 - 1.0;
                let y = row as f32 / 10.0 - 1.0;
                [
                    ColorVertex::new(Vec3::new(x, y, 0.0), Vec3::new(1.0, 0.0, 0.0)),
                    ColorVertex::new(Vec3::new(x + 0.09, y, 0.0), Vec3::new(0.0, 1.0, 0.0)),
                    ColorVertex::new(Vec3::new(x + 0.045, y + 0.08, 0.0), Vec3::new(0.0, 0.0, 1.0)),
                ]
            })
        })
        .collect();

    group.bench_function("process_400_triangles", |b| {
        let mut renderer = Renderer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
        let mut shader = VertexColorShader::new();
        b.iter(|| {
            for verts in &triangles {
                renderer.process_triangle(
                    &mut shader,
                    black_box(&verts[0]),
                    &verts[1],
                    &verts[2],
                );
            }
        });
    });

    group.bench_function("process_400_triangles_depth_tested", |b| {
        let mut renderer = Renderer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
        renderer.enable(RenderState::DEPTH_TEST);
        let mut shader = VertexColorShader::new();
        b.iter(|| {
            renderer.clear(0.0, 0.0, 0.0, 1.0);
            for verts in &triangles {
                renderer.process_triangle(
                    &mut shader,
                    black_box(&verts[0]),
                    &verts[1],
                    &verts[2],
                );
            }
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_single_triangle, benchmark_many_triangles);
criterion_main!(benches);
