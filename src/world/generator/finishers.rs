use crate::utils::error::Result;
use crate::world::biome::Biome;
use crate::world::block_id::BlockId;
use crate::world::chunk::{
    BiomeMap, BlockEntitySeed, BlockMetaGrid, BlockTypeGrid, HeightMap, SpawnedEntity,
    CHUNK_HEIGHT, CHUNK_SIZE,
};
use crate::world::chunk_coord::ChunkCoord;
use crate::world::generator::strategy::FinisherStrategy;
use crate::world::generator::structures::chunk_rng;
use rand::Rng;

const FOLIAGE_SALT: u64 = 0x464f_4c49;

/// Caps cold-biome surfaces with a snow layer.
pub struct SnowFinisher;

impl SnowFinisher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SnowFinisher {
    fn default() -> Self {
        Self::new()
    }
}

impl FinisherStrategy for SnowFinisher {
    fn finish(
        &self,
        _coord: ChunkCoord,
        blocks: &mut BlockTypeGrid,
        _meta: &mut BlockMetaGrid,
        heights: &mut HeightMap,
        biomes: &BiomeMap,
        _entities: &mut Vec<SpawnedEntity>,
        _block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()> {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                if !matches!(biomes.get(x, z), Biome::Tundra | Biome::Mountains) {
                    continue;
                }
                let top = heights.get(x, z);
                if top < 0 || top as usize + 1 >= CHUNK_HEIGHT {
                    continue;
                }
                let top = top as usize;
                if blocks.get(x, top, z).is_solid() && blocks.get(x, top + 1, z).is_air() {
                    blocks.set(x, top + 1, z, BlockId::SNOW_LAYER);
                }
            }
        }
        Ok(())
    }
}

/// Scatters grass tufts on grassy surfaces.
pub struct TallGrassFinisher {
    seed: i64,
    chance: u32,
}

impl TallGrassFinisher {
    pub fn new(seed: i64, chance: u32) -> Self {
        Self { seed, chance }
    }
}

impl FinisherStrategy for TallGrassFinisher {
    fn finish(
        &self,
        coord: ChunkCoord,
        blocks: &mut BlockTypeGrid,
        meta: &mut BlockMetaGrid,
        heights: &mut HeightMap,
        biomes: &BiomeMap,
        _entities: &mut Vec<SpawnedEntity>,
        _block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()> {
        let mut rng = chunk_rng(self.seed, coord, FOLIAGE_SALT);
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let roll = rng.gen_ratio(1, self.chance);
                if !roll || !matches!(biomes.get(x, z), Biome::Plains | Biome::Forest) {
                    continue;
                }
                let top = heights.get(x, z);
                if top < 0 || top as usize + 1 >= CHUNK_HEIGHT {
                    continue;
                }
                let top = top as usize;
                if blocks.get(x, top, z) == BlockId::GRASS && blocks.get(x, top + 1, z).is_air() {
                    blocks.set(x, top + 1, z, BlockId::TALL_GRASS);
                    meta.set(x, top + 1, z, 1);
                }
            }
        }
        Ok(())
    }
}

/// Floods air pockets near the chunk floor with lava.
pub struct BottomLavaFinisher {
    level: i32,
}

impl BottomLavaFinisher {
    pub fn new(level: i32) -> Self {
        Self {
            level: level.clamp(0, CHUNK_HEIGHT as i32),
        }
    }
}

impl FinisherStrategy for BottomLavaFinisher {
    fn finish(
        &self,
        _coord: ChunkCoord,
        blocks: &mut BlockTypeGrid,
        _meta: &mut BlockMetaGrid,
        _heights: &mut HeightMap,
        _biomes: &BiomeMap,
        _entities: &mut Vec<SpawnedEntity>,
        _block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()> {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                for y in 0..self.level as usize {
                    if blocks.get(x, y, z).is_air() {
                        blocks.set(x, y, z, BlockId::LAVA);
                    }
                }
            }
        }
        Ok(())
    }
}
