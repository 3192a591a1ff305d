use crate::utils::error::Result;
use crate::world::biome::Biome;
use crate::world::block_id::BlockId;
use crate::world::chunk::{
    BiomeMap, BlockEntitySeed, BlockMetaGrid, BlockTypeGrid, HeightMap, SpawnedEntity,
    CHUNK_HEIGHT, CHUNK_SIZE,
};
use crate::world::chunk_coord::ChunkCoord;
use crate::world::generator::strategy::{BiomeStrategy, CompositionStrategy};
use std::sync::Arc;

/// Stacks configured block layers bottom-up, identical in every chunk.
pub struct FlatCompositionGen {
    layers: Vec<(BlockId, u32)>,
}

impl FlatCompositionGen {
    pub fn new(layers: Vec<(BlockId, u32)>) -> Self {
        Self { layers }
    }
}

impl CompositionStrategy for FlatCompositionGen {
    fn compose(
        &self,
        _coord: ChunkCoord,
        _heights: &HeightMap,
        blocks: &mut BlockTypeGrid,
        _meta: &mut BlockMetaGrid,
        _entities: &mut Vec<SpawnedEntity>,
        _block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()> {
        blocks.fill(BlockId::AIR);
        let mut y = 0usize;
        for (block, thickness) in &self.layers {
            for _ in 0..*thickness {
                if y >= CHUNK_HEIGHT {
                    break;
                }
                for z in 0..CHUNK_SIZE {
                    for x in 0..CHUNK_SIZE {
                        blocks.set(x, y, z, *block);
                    }
                }
                y += 1;
            }
        }
        Ok(())
    }
}

/// Fits biome-dependent surface blocks to the height map: stone body, a few
/// blocks of sub-surface filler, a biome top block, water fill in ocean
/// columns and a bedrock floor.
pub struct BiomalCompositionGen {
    biome_gen: Arc<dyn BiomeStrategy>,
    sea_level: i32,
}

impl BiomalCompositionGen {
    pub fn new(biome_gen: Arc<dyn BiomeStrategy>, sea_level: i32) -> Self {
        Self {
            biome_gen,
            sea_level,
        }
    }

    fn surface_blocks(biome: Biome) -> (BlockId, BlockId) {
        match biome {
            Biome::Plains | Biome::Swamp | Biome::Forest => (BlockId::DIRT, BlockId::GRASS),
            Biome::Mountains | Biome::Tundra => (BlockId::STONE, BlockId::STONE),
            Biome::Desert => (BlockId::SAND, BlockId::SAND),
            Biome::Ocean => (BlockId::SAND, BlockId::GRAVEL),
        }
    }

    fn block_for_depth(&self, y: i32, height: i32, biome: Biome) -> BlockId {
        let (base, top) = Self::surface_blocks(biome);
        match biome {
            Biome::Ocean if y <= self.sea_level - 8 => BlockId::STONE,
            _ if y == height => top,
            _ if y > height - 4 => base,
            _ => BlockId::STONE,
        }
    }
}

impl CompositionStrategy for BiomalCompositionGen {
    fn compose(
        &self,
        coord: ChunkCoord,
        heights: &HeightMap,
        blocks: &mut BlockTypeGrid,
        _meta: &mut BlockMetaGrid,
        _entities: &mut Vec<SpawnedEntity>,
        _block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()> {
        let mut biomes = BiomeMap::new();
        self.biome_gen.generate(coord, &mut biomes)?;

        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let height = heights.get(x, z);
                let biome = biomes.get(x, z);
                for y in 0..CHUNK_HEIGHT {
                    let world_y = y as i32;
                    let id = if world_y == 0 {
                        BlockId::BEDROCK
                    } else if world_y <= height {
                        self.block_for_depth(world_y, height, biome)
                    } else if biome == Biome::Ocean && world_y <= self.sea_level {
                        BlockId::WATER
                    } else {
                        BlockId::AIR
                    };
                    blocks.set(x, y, z, id);
                }
            }
        }
        Ok(())
    }
}
