pub mod config;
pub mod utils;
pub mod world;

// Re-export commonly used types
pub use config::worldgen::{FlatLayer, WorldGenConfig};
pub use utils::error::{GenError, Result};
pub use world::biome::Biome;
pub use world::block_id::BlockId;
pub use world::chunk::{BiomeMap, BlockMetaGrid, BlockTypeGrid, ChunkData, HeightMap};
pub use world::chunk_coord::ChunkCoord;
pub use world::generator::{
    build_pipeline, BiomeStrategy, ChunkGenerator, CompositionStrategy, FinisherStrategy,
    HeightStrategy, Pipeline, QueueLimits, StructureStrategy,
};
pub use world::sink::WorldSink;
