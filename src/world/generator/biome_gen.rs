use crate::utils::error::Result;
use crate::world::biome::Biome;
use crate::world::chunk::{BiomeMap, CHUNK_SIZE};
use crate::world::chunk_coord::ChunkCoord;
use crate::world::generator::strategy::BiomeStrategy;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use parking_lot::RwLock;
use std::collections::HashMap;

const BIOME_SEED_OFFSET: u32 = 2;

/// Fills every column with one configured biome.
pub struct ConstantBiomeGen {
    biome: Biome,
}

impl ConstantBiomeGen {
    pub fn new(biome: Biome) -> Self {
        Self { biome }
    }
}

impl BiomeStrategy for ConstantBiomeGen {
    fn generate(&self, _coord: ChunkCoord, biomes: &mut BiomeMap) -> Result<()> {
        biomes.fill(self.biome);
        Ok(())
    }
}

/// Cycles through all biomes by chunk parity. Debugging generator: makes
/// biome borders and their effect on downstream stages easy to eyeball.
pub struct CheckerboardBiomeGen;

impl CheckerboardBiomeGen {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CheckerboardBiomeGen {
    fn default() -> Self {
        Self::new()
    }
}

impl BiomeStrategy for CheckerboardBiomeGen {
    fn generate(&self, coord: ChunkCoord, biomes: &mut BiomeMap) -> Result<()> {
        let index = (coord.x() + coord.z()).rem_euclid(Biome::ALL.len() as i32);
        biomes.fill(Biome::ALL[index as usize]);
        Ok(())
    }
}

/// Classifies columns by temperature/moisture noise.
pub struct NoiseBiomeGen {
    climate: Fbm<Perlin>,
    world_scale: f64,
    cache: RwLock<HashMap<ChunkCoord, BiomeMap>>,
}

impl NoiseBiomeGen {
    pub fn new(seed: i64, world_scale: f64) -> Self {
        Self {
            climate: Fbm::<Perlin>::new((seed as u32).wrapping_add(BIOME_SEED_OFFSET))
                .set_octaves(1)
                .set_frequency(0.001)
                .set_persistence(1.0)
                .set_lacunarity(2.0),
            world_scale,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn sample(&self, x: i32, z: i32) -> f64 {
        self.climate
            .get([x as f64 * self.world_scale, z as f64 * self.world_scale])
    }

    fn classify(&self, x: i32, z: i32) -> Biome {
        let temp = self.sample(x, z);
        let moisture = self.sample(x + 1000, z + 1000);

        match (temp, moisture) {
            (t, _) if t < -0.5 => Biome::Mountains,
            (t, m) if t > 0.5 && m < 0.0 => Biome::Desert,
            (t, m) if t > 0.3 && m > 0.4 => Biome::Forest,
            (_, m) if m > 0.7 => Biome::Ocean,
            (t, _) if t < -0.3 => Biome::Tundra,
            (_, m) if m > 0.5 => Biome::Swamp,
            _ => Biome::Plains,
        }
    }
}

impl BiomeStrategy for NoiseBiomeGen {
    fn generate(&self, coord: ChunkCoord, biomes: &mut BiomeMap) -> Result<()> {
        {
            let cache = self.cache.read();
            if let Some(cached) = cache.get(&coord) {
                *biomes = cached.clone();
                return Ok(());
            }
        }

        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let world_x = coord.block_x() + x as i32;
                let world_z = coord.block_z() + z as i32;
                biomes.set(x, z, self.classify(world_x, world_z));
            }
        }

        self.cache.write().insert(coord, biomes.clone());
        Ok(())
    }
}
