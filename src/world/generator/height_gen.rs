use crate::utils::error::Result;
use crate::world::biome::Biome;
use crate::world::chunk::{BiomeMap, HeightMap, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::world::chunk_coord::ChunkCoord;
use crate::world::generator::strategy::{BiomeStrategy, HeightStrategy};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

const BASE_TERRAIN_HEIGHT: f64 = 64.0;
const TERRAIN_SEED_OFFSET: u32 = 0;
const DETAIL_SEED_OFFSET: u32 = 1;

/// Uniform height for every column.
pub struct FlatHeightGen {
    height: i32,
}

impl FlatHeightGen {
    pub fn new(height: i32) -> Self {
        Self {
            height: height.clamp(0, CHUNK_HEIGHT as i32 - 1),
        }
    }
}

impl HeightStrategy for FlatHeightGen {
    fn generate(&self, _coord: ChunkCoord, heights: &mut HeightMap) -> Result<()> {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                heights.set(x, z, self.height);
            }
        }
        Ok(())
    }
}

/// Fbm terrain heights shaped by the biome of the surrounding columns.
///
/// Biome modifiers are averaged over a small neighborhood so heights blend
/// across biome borders; the neighborhood may fall into adjacent chunks,
/// which is why this strategy holds the shared biome strategy.
pub struct NoiseHeightGen {
    terrain: Fbm<Perlin>,
    detail: Fbm<Perlin>,
    biome_gen: Arc<dyn BiomeStrategy>,
    amplitude: f64,
    world_scale: f64,
    sea_level: i32,
    biome_cache: RwLock<HashMap<ChunkCoord, BiomeMap>>,
}

impl NoiseHeightGen {
    pub fn new(
        seed: i64,
        biome_gen: Arc<dyn BiomeStrategy>,
        amplitude: f64,
        world_scale: f64,
        sea_level: i32,
    ) -> Self {
        Self {
            terrain: Fbm::<Perlin>::new((seed as u32).wrapping_add(TERRAIN_SEED_OFFSET))
                .set_octaves(6)
                .set_frequency(0.01)
                .set_persistence(0.5)
                .set_lacunarity(2.0),
            detail: Fbm::<Perlin>::new((seed as u32).wrapping_add(DETAIL_SEED_OFFSET))
                .set_octaves(3)
                .set_frequency(0.05)
                .set_persistence(0.8)
                .set_lacunarity(2.0),
            biome_gen,
            amplitude,
            world_scale,
            sea_level,
            biome_cache: RwLock::new(HashMap::new()),
        }
    }

    fn biome_at(&self, world_x: i32, world_z: i32) -> Result<Biome> {
        let coord = ChunkCoord::from_block_pos(world_x, world_z);
        let local_x = world_x.rem_euclid(CHUNK_SIZE as i32) as usize;
        let local_z = world_z.rem_euclid(CHUNK_SIZE as i32) as usize;

        {
            let cache = self.biome_cache.read();
            if let Some(biomes) = cache.get(&coord) {
                return Ok(biomes.get(local_x, local_z));
            }
        }

        let mut biomes = BiomeMap::new();
        self.biome_gen.generate(coord, &mut biomes)?;
        let biome = biomes.get(local_x, local_z);
        self.biome_cache.write().insert(coord, biomes);
        Ok(biome)
    }

    fn biome_modifier(biome: Biome) -> f64 {
        match biome {
            Biome::Mountains => 15.0,
            Biome::Plains => 2.0,
            Biome::Desert => -3.0,
            Biome::Forest => 4.0,
            Biome::Ocean => -8.0,
            Biome::Tundra => 6.0,
            Biome::Swamp => -2.0,
        }
    }

    fn sample(&self, layer: &Fbm<Perlin>, x: i32, z: i32) -> f64 {
        layer.get([x as f64 * self.world_scale, z as f64 * self.world_scale])
    }

    fn column_height(&self, world_x: i32, world_z: i32) -> Result<i32> {
        // Average the biome modifier over a 3x3 sample cross spanning up to
        // one chunk border in each direction.
        let mut modifier = 0.0;
        let mut samples = 0;
        for dz in [-4i32, 0, 4] {
            for dx in [-4i32, 0, 4] {
                modifier += Self::biome_modifier(self.biome_at(world_x + dx, world_z + dz)?);
                samples += 1;
            }
        }
        modifier /= f64::from(samples);

        let base = self.sample(&self.terrain, world_x, world_z);
        let detail = self.sample(&self.detail, world_x, world_z);
        let height =
            BASE_TERRAIN_HEIGHT + (base * self.amplitude).abs() + detail * 6.0 + modifier;

        Ok(height.clamp(f64::from(self.sea_level) - 8.0, (CHUNK_HEIGHT - 1) as f64) as i32)
    }
}

impl HeightStrategy for NoiseHeightGen {
    fn generate(&self, coord: ChunkCoord, heights: &mut HeightMap) -> Result<()> {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let world_x = coord.block_x() + x as i32;
                let world_z = coord.block_z() + z as i32;
                heights.set(x, z, self.column_height(world_x, world_z)?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::generator::biome_gen::{ConstantBiomeGen, NoiseBiomeGen};

    #[test]
    fn test_flat_heights() {
        let gen = FlatHeightGen::new(72);
        let mut heights = HeightMap::new();
        gen.generate(ChunkCoord::new(0, 0), &mut heights).unwrap();
        assert!(heights.as_slice().iter().all(|h| *h == 72));
    }

    #[test]
    fn test_flat_clamps_out_of_range() {
        let gen = FlatHeightGen::new(4096);
        let mut heights = HeightMap::new();
        gen.generate(ChunkCoord::new(0, 0), &mut heights).unwrap();
        assert!(heights.as_slice().iter().all(|h| *h == 255));
    }

    #[test]
    fn test_noise_heights_within_bounds() {
        let biome_gen: Arc<dyn BiomeStrategy> = Arc::new(NoiseBiomeGen::new(99, 0.01));
        let gen = NoiseHeightGen::new(99, biome_gen, 32.0, 0.01, 64);
        let mut heights = HeightMap::new();
        gen.generate(ChunkCoord::new(5, 5), &mut heights).unwrap();
        for h in heights.as_slice() {
            assert!(*h >= 56 && *h < 256, "height {h} out of range");
        }
    }

    #[test]
    fn test_noise_deterministic() {
        let coord = ChunkCoord::new(-3, 8);
        let make = || {
            let biome_gen: Arc<dyn BiomeStrategy> = Arc::new(NoiseBiomeGen::new(7, 0.01));
            NoiseHeightGen::new(7, biome_gen, 32.0, 0.01, 64)
        };
        let mut a = HeightMap::new();
        let mut b = HeightMap::new();
        make().generate(coord, &mut a).unwrap();
        make().generate(coord, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mountains_rise_above_ocean() {
        let make = |biome| {
            let biome_gen: Arc<dyn BiomeStrategy> = Arc::new(ConstantBiomeGen::new(biome));
            NoiseHeightGen::new(11, biome_gen, 32.0, 0.01, 64)
        };
        let coord = ChunkCoord::new(2, 2);
        let mut mountains = HeightMap::new();
        let mut ocean = HeightMap::new();
        make(Biome::Mountains).generate(coord, &mut mountains).unwrap();
        make(Biome::Ocean).generate(coord, &mut ocean).unwrap();
        // Same noise, different biome modifier: mountains must be higher
        // wherever neither column is clamped.
        assert!(mountains.get(8, 8) >= ocean.get(8, 8));
    }
}
