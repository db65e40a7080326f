use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use section::{
    builder::MeshBuilder,
    mesh::Mesh,
    mesh_set::MeshSet,
    plane::{Axis, Plane},
    slicer::{slice, SliceCache},
    Pos,
};

/// A `size` × `size` grid of unit cubes, 12 triangles each.
fn cube_grid(size: usize) -> Mesh {
    let mut builder = MeshBuilder::new();
    for x in 0..size {
        for z in 0..size {
            let min = Pos::new(x as f64 * 1.5, -0.5, z as f64 * 1.5);
            builder = builder.cuboid(min, min + Pos::repeat(1.0));
        }
    }
    builder.build()
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Plane Slicing");
    let plane = Plane::from_axis(Axis::Y);

    for size in [10, 50, 100] {
        let mut meshes = MeshSet::new();
        meshes.add("grid", cube_grid(size));
        let triangles = meshes.stats().triangles;

        group.bench_with_input(BenchmarkId::new("Linear", triangles), &meshes, |b, i| {
            b.iter(|| slice(&plane, i.world_triangles()))
        });

        group.bench_with_input(BenchmarkId::new("Cached", triangles), &meshes, |b, i| {
            let mut cache = SliceCache::new();
            b.iter(|| cache.refresh(&plane, i))
        });

        // Chaining is quadratic, the larger grids take far too long
        if size <= 10 {
            group.bench_with_input(BenchmarkId::new("Polylines", triangles), &meshes, |b, i| {
                let contour = slice(&plane, i.world_triangles());
                b.iter(|| contour.polylines(1e-6))
            });
        }
    }
}

criterion_group!(benches, bench);
criterion_main!(benches);
