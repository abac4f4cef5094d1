//! End-to-end: blended generation with mixed biomes followed by stitching
//! leaves no height discontinuity on any internal border.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_terrain::{
    BiomeTable, BiomeType, CornerStatistic, Heightfield, Neighbor, NeighborhoodSettings,
    StitchSettings, TileCoord, TileSet, generate_blended, stitch_tiles,
};

const CORE: usize = 33;

fn border_diffs(tiles: &TileSet) -> Vec<f32> {
    let mut diffs = Vec::new();
    for (&coord, field) in tiles {
        if let Some(east) = tiles.get(&coord.neighbor(Neighbor::East)) {
            for y in 0..CORE {
                diffs.push((field.get(CORE - 1, y) - east.get(0, y)).abs());
            }
        }
        if let Some(south) = tiles.get(&coord.neighbor(Neighbor::South)) {
            for x in 0..CORE {
                diffs.push((field.get(x, CORE - 1) - south.get(x, 0)).abs());
            }
        }
    }
    diffs
}

fn generate_block(seed: u64) -> TileSet {
    let table = BiomeTable::standard(seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    // Assign biomes to the 5x5 ring so every tile of the 3x3 block knows its neighbours.
    let mut biomes = std::collections::HashMap::new();
    for y in -1..4 {
        for x in -1..4 {
            let biome = BiomeType::ALL[rng.random_range(0..BiomeType::COUNT)];
            biomes.insert(TileCoord::new(x, y), biome);
        }
    }

    let stride = (CORE - 1) as f32;
    let mut tiles = TileSet::new();
    for y in 0..3 {
        for x in 0..3 {
            let coord = TileCoord::new(x, y);
            let settings = NeighborhoodSettings {
                center: table.heightmap(biomes[&coord]),
                neighbors: Neighbor::ALL.map(|n| table.heightmap(biomes[&coord.neighbor(n)])),
            };
            let field = generate_blended(
                CORE,
                CORE,
                &settings,
                Vec2::new(x as f32, y as f32) * stride,
                6,
            )
            .unwrap();
            tiles.insert(coord, field);
        }
    }
    tiles
}

#[test]
fn test_mixed_biome_block_is_seamless_after_stitching() {
    for seed in [1, 7, 42] {
        let mut tiles = generate_block(seed);
        let touched = stitch_tiles(
            &mut tiles,
            &StitchSettings {
                blend_width: 4,
                corner: CornerStatistic::Max,
            },
        );
        assert_eq!(touched.len(), 9);

        let worst = border_diffs(&tiles).into_iter().fold(0.0f32, f32::max);
        assert!(worst < 1e-5, "seed {seed}: max border difference {worst}");
        assert!(tiles.values().all(Heightfield::bounds_hold));
    }
}

#[test]
fn test_blending_alone_matches_shared_borders() {
    let tiles = generate_block(3);
    let worst = border_diffs(&tiles).into_iter().fold(0.0f32, f32::max);
    assert_eq!(worst, 0.0, "blended tiles already share their border lines");
}

#[test]
fn test_stitching_leaves_interior_alone() {
    let original = generate_block(5);
    let mut stitched = original.clone();
    stitch_tiles(&mut stitched, &StitchSettings::default());

    let center = TileCoord::new(1, 1);
    let blend = StitchSettings::default().blend_width;
    for y in blend + 1..CORE - blend - 1 {
        for x in blend + 1..CORE - blend - 1 {
            assert_eq!(stitched[&center].get(x, y), original[&center].get(x, y));
        }
    }
}
