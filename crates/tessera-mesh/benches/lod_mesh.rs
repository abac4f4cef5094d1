use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tessera_mesh::{MeshSettings, NUM_SUPPORTED_LODS, build_terrain_mesh};
use tessera_terrain::Heightfield;

fn bench_build_mesh(c: &mut Criterion) {
    let settings = MeshSettings::new(4, 1.0).expect("valid settings");
    let n = settings.num_vertices_per_line();
    let field = Heightfield::from_fn(n, n, |x, y| ((x as f32) * 0.1).sin() * ((y as f32) * 0.07).cos() * 20.0);

    let mut group = c.benchmark_group("build_terrain_mesh");
    for lod in 0..NUM_SUPPORTED_LODS {
        group.bench_with_input(BenchmarkId::from_parameter(lod), &lod, |b, &lod| {
            b.iter(|| build_terrain_mesh(black_box(&field), settings.mesh_world_size(), lod))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_mesh);
criterion_main!(benches);
