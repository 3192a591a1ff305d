pub mod biome;
pub mod block_id;
pub mod chunk;
pub mod chunk_coord;
pub mod generator;
pub mod sink;

// Re-export commonly used types
pub use biome::Biome;
pub use block_id::BlockId;
pub use chunk::{
    BiomeMap, BlockEntitySeed, BlockMetaGrid, BlockTypeGrid, ChunkData, HeightMap, SpawnedEntity,
    CHUNK_AREA, CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME,
};
pub use chunk_coord::ChunkCoord;
pub use generator::{ChunkGenerator, GenerationRequest, Pipeline, QueueLimits};
pub use sink::WorldSink;
