use crate::utils::error::Result;
use crate::world::chunk::{
    BiomeMap, BlockEntitySeed, BlockMetaGrid, BlockTypeGrid, ChunkData, HeightMap, SpawnedEntity,
};
use crate::world::chunk_coord::ChunkCoord;
use std::sync::Arc;

/// Classifies every horizontal column of a chunk into a biome.
///
/// Pure with respect to world state: output depends only on the coordinate
/// and the strategy's seed/parameters.
pub trait BiomeStrategy: Send + Sync {
    fn generate(&self, coord: ChunkCoord, biomes: &mut BiomeMap) -> Result<()>;
}

/// Computes the terrain height of every column of a chunk.
///
/// Implementations may consult a [`BiomeStrategy`], including for neighboring
/// chunks (e.g. for averaging across biome borders).
pub trait HeightStrategy: Send + Sync {
    fn generate(&self, coord: ChunkCoord, heights: &mut HeightMap) -> Result<()>;
}

/// Produces the initial block data of a chunk from its height map.
///
/// Must write every voxel of the volume, air included.
pub trait CompositionStrategy: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn compose(
        &self,
        coord: ChunkCoord,
        heights: &HeightMap,
        blocks: &mut BlockTypeGrid,
        meta: &mut BlockMetaGrid,
        entities: &mut Vec<SpawnedEntity>,
        block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()>;
}

/// Carves or places one class of structure (ore veins count as structures).
///
/// Applied in configured order after composition; later strategies observe
/// the mutations of earlier ones.
pub trait StructureStrategy: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn apply(
        &self,
        coord: ChunkCoord,
        blocks: &mut BlockTypeGrid,
        meta: &mut BlockMetaGrid,
        heights: &mut HeightMap,
        entities: &mut Vec<SpawnedEntity>,
        block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()>;
}

/// Small cosmetic/functional pass applied after all structures. The biome
/// map is read-only input at this stage.
pub trait FinisherStrategy: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        coord: ChunkCoord,
        blocks: &mut BlockTypeGrid,
        meta: &mut BlockMetaGrid,
        heights: &mut HeightMap,
        biomes: &BiomeMap,
        entities: &mut Vec<SpawnedEntity>,
        block_entities: &mut Vec<BlockEntitySeed>,
    ) -> Result<()>;
}

/// The generation composition: one biome, height and composition strategy
/// plus ordered structure and finisher lists, fixed for a generator's
/// lifetime. Reordering structures or finishers changes output.
pub struct Pipeline {
    biome: Arc<dyn BiomeStrategy>,
    height: Box<dyn HeightStrategy>,
    composition: Box<dyn CompositionStrategy>,
    structures: Vec<Box<dyn StructureStrategy>>,
    finishers: Vec<Box<dyn FinisherStrategy>>,
}

impl Pipeline {
    pub fn new(
        biome: Arc<dyn BiomeStrategy>,
        height: Box<dyn HeightStrategy>,
        composition: Box<dyn CompositionStrategy>,
    ) -> Self {
        Self {
            biome,
            height,
            composition,
            structures: Vec::new(),
            finishers: Vec::new(),
        }
    }

    pub fn with_structure(mut self, structure: Box<dyn StructureStrategy>) -> Self {
        self.structures.push(structure);
        self
    }

    pub fn with_finisher(mut self, finisher: Box<dyn FinisherStrategy>) -> Self {
        self.finishers.push(finisher);
        self
    }

    /// The biome strategy, shared with callers that need biome-only queries.
    pub fn biome_gen(&self) -> &Arc<dyn BiomeStrategy> {
        &self.biome
    }

    /// Runs all stages in order and assembles the completed chunk.
    pub fn run(&self, coord: ChunkCoord) -> Result<ChunkData> {
        let mut biomes = BiomeMap::new();
        self.biome.generate(coord, &mut biomes)?;

        let mut heights = HeightMap::new();
        self.height.generate(coord, &mut heights)?;

        let mut blocks = BlockTypeGrid::new();
        let mut meta = BlockMetaGrid::new();
        let mut entities = Vec::new();
        let mut block_entities = Vec::new();
        self.composition.compose(
            coord,
            &heights,
            &mut blocks,
            &mut meta,
            &mut entities,
            &mut block_entities,
        )?;

        for structure in &self.structures {
            structure.apply(
                coord,
                &mut blocks,
                &mut meta,
                &mut heights,
                &mut entities,
                &mut block_entities,
            )?;
        }

        for finisher in &self.finishers {
            finisher.finish(
                coord,
                &mut blocks,
                &mut meta,
                &mut heights,
                &biomes,
                &mut entities,
                &mut block_entities,
            )?;
        }

        Ok(ChunkData {
            coord,
            blocks,
            meta,
            biomes,
            heights,
            entities,
            block_entities,
        })
    }
}
