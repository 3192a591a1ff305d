use crate::utils::error::Result;
use crate::world::biome::Biome;
use crate::world::block_id::BlockId;
use crate::world::chunk::{
    BlockEntitySeed, BlockMetaGrid, BlockTypeGrid, HeightMap, SpawnedEntity, CHUNK_HEIGHT,
    CHUNK_SIZE,
};
use crate::world::chunk_coord::ChunkCoord;
use crate::world::generator::strategy::{BiomeStrategy, StructureStrategy};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use std::sync::Arc;

const CAVE_SEED_OFFSET: u32 = 3;
const ORE_SALT: u64 = 0x4f52_4553;
const TREE_SALT: u64 = 0x5452_4545;

/// Derives a chunk-local RNG from the world seed. The same coordinate always
/// yields the same stream, independent of generation order.
pub(crate) fn chunk_rng(seed: i64, coord: ChunkCoord, salt: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(
        (seed as u64)
            .wrapping_add((coord.x() as u64).wrapping_mul(341_873_128_712))
            .wrapping_add((coord.z() as u64).wrapping_mul(132_897_987_541))
            .wrapping_add(salt),
    )
}

/// Carves caves where layered noise exceeds a threshold, weighted toward
/// lower elevations. Re-derives the height map for carved-open columns.
pub struct CaveGen {
    noise: Fbm<Perlin>,
    threshold: f64,
    world_scale: f64,
}

impl CaveGen {
    pub fn new(seed: i64, threshold: f64, world_scale: f64) -> Self {
        Self {
            noise: Fbm::<Perlin>::new((seed as u32).wrapping_add(CAVE_SEED_OFFSET))
                .set_octaves(4)
                .set_frequency(0.03)
                .set_persistence(0.7)
                .set_lacunarity(2.0),
            threshold,
            world_scale,
        }
    }
}

impl StructureStrategy for CaveGen {
    fn apply(
        &self,
        coord: ChunkCoord,
        blocks: &mut BlockTypeGrid,
        _meta: &mut BlockMetaGrid,
        heights: &mut HeightMap,
        _entities: &mut Vec<SpawnedEntity>,
        _block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()> {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let world_x = coord.block_x() + x as i32;
                let world_z = coord.block_z() + z as i32;
                let cave_noise = self.noise.get([
                    f64::from(world_x) * self.world_scale,
                    f64::from(world_z) * self.world_scale,
                ]);

                let top = heights.get(x, z);
                let mut carved = false;
                for y in 1..=top.max(0) as usize {
                    if y >= CHUNK_HEIGHT {
                        break;
                    }
                    let y_factor = 1.0 - (y as f64 / 128.0).abs();
                    if (cave_noise * y_factor).abs() > self.threshold {
                        let id = blocks.get(x, y, z);
                        if id.is_solid() && id != BlockId::BEDROCK {
                            blocks.set(x, y, z, BlockId::AIR);
                            carved = true;
                        }
                    }
                }
                if carved {
                    heights.set(x, z, blocks.top_solid_y(x, z));
                }
            }
        }
        Ok(())
    }
}

/// Scatters small ore veins through stone below a depth limit.
pub struct OreVeinGen {
    seed: i64,
    attempts: u32,
    max_y: i32,
}

impl OreVeinGen {
    pub fn new(seed: i64, attempts: u32, max_y: i32) -> Self {
        Self {
            seed,
            attempts,
            max_y: max_y.clamp(2, CHUNK_HEIGHT as i32 - 1),
        }
    }

    fn pick_ore(rng: &mut ChaCha12Rng) -> Option<BlockId> {
        match rng.gen_range(0..100) {
            0..=5 => Some(BlockId::COAL_ORE),
            6..=8 => Some(BlockId::IRON_ORE),
            9..=10 => Some(BlockId::GOLD_ORE),
            11..=12 => Some(BlockId::DIAMOND_ORE),
            _ => None,
        }
    }
}

impl StructureStrategy for OreVeinGen {
    fn apply(
        &self,
        coord: ChunkCoord,
        blocks: &mut BlockTypeGrid,
        _meta: &mut BlockMetaGrid,
        _heights: &mut HeightMap,
        _entities: &mut Vec<SpawnedEntity>,
        _block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()> {
        let mut rng = chunk_rng(self.seed, coord, ORE_SALT);
        for _ in 0..self.attempts {
            let Some(ore) = Self::pick_ore(&mut rng) else {
                continue;
            };
            let mut x = rng.gen_range(0..CHUNK_SIZE as i32);
            let mut y = rng.gen_range(1..self.max_y);
            let mut z = rng.gen_range(0..CHUNK_SIZE as i32);
            let vein_size = rng.gen_range(1..=8);

            // Random walk, replacing stone only
            for _ in 0..vein_size {
                if x < 0
                    || x >= CHUNK_SIZE as i32
                    || z < 0
                    || z >= CHUNK_SIZE as i32
                    || y < 1
                    || y >= self.max_y
                {
                    break;
                }
                if blocks.get(x as usize, y as usize, z as usize) == BlockId::STONE {
                    blocks.set(x as usize, y as usize, z as usize, ore);
                }
                x += rng.gen_range(-1..=1);
                y += rng.gen_range(-1..=1);
                z += rng.gen_range(-1..=1);
            }
        }
        Ok(())
    }
}

/// Plants trees on grassy forest columns. Consults the shared biome strategy
/// the same way the height stage does.
pub struct TreeGen {
    seed: i64,
    biome_gen: Arc<dyn BiomeStrategy>,
    chance: u32,
}

impl TreeGen {
    pub fn new(seed: i64, biome_gen: Arc<dyn BiomeStrategy>, chance: u32) -> Self {
        Self {
            seed,
            biome_gen,
            chance,
        }
    }

    fn place_tree(
        blocks: &mut BlockTypeGrid,
        x: usize,
        surface: usize,
        z: usize,
        trunk_height: usize,
    ) {
        for dy in 1..=trunk_height {
            blocks.set(x, surface + dy, z, BlockId::LOG);
        }

        let center_y = surface + trunk_height - 1;
        for dy in -1i32..=1 {
            for dz in -2i32..=2 {
                for dx in -2i32..=2 {
                    if dx * dx + dy * dy + dz * dz > 4 {
                        continue;
                    }
                    let lx = x as i32 + dx;
                    let ly = center_y as i32 + dy;
                    let lz = z as i32 + dz;
                    if lx < 0
                        || lx >= CHUNK_SIZE as i32
                        || lz < 0
                        || lz >= CHUNK_SIZE as i32
                        || ly < 0
                        || ly >= CHUNK_HEIGHT as i32
                    {
                        continue;
                    }
                    if blocks.get(lx as usize, ly as usize, lz as usize).is_air() {
                        blocks.set(lx as usize, ly as usize, lz as usize, BlockId::LEAVES);
                    }
                }
            }
        }
    }
}

impl StructureStrategy for TreeGen {
    fn apply(
        &self,
        coord: ChunkCoord,
        blocks: &mut BlockTypeGrid,
        _meta: &mut BlockMetaGrid,
        heights: &mut HeightMap,
        _entities: &mut Vec<SpawnedEntity>,
        _block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()> {
        let mut biomes = crate::world::chunk::BiomeMap::new();
        self.biome_gen.generate(coord, &mut biomes)?;

        let mut rng = chunk_rng(self.seed, coord, TREE_SALT);
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                // Draw for every column so the stream does not depend on
                // what earlier stages left behind.
                let roll = rng.gen_ratio(1, self.chance);
                if !roll || biomes.get(x, z) != Biome::Forest {
                    continue;
                }
                // Keep the canopy inside this chunk
                if !(2..CHUNK_SIZE - 2).contains(&x) || !(2..CHUNK_SIZE - 2).contains(&z) {
                    continue;
                }
                let surface = heights.get(x, z);
                if surface < 1 || surface as usize + 8 >= CHUNK_HEIGHT {
                    continue;
                }
                let surface = surface as usize;
                if blocks.get(x, surface, z) != BlockId::GRASS {
                    continue;
                }
                let trunk_height = 4 + rng.gen_range(0..3);
                Self::place_tree(blocks, x, surface, z, trunk_height);
                heights.set(x, z, blocks.top_solid_y(x, z));
            }
        }
        Ok(())
    }
}
