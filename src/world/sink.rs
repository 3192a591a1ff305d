use crate::world::chunk::ChunkData;
use crate::world::chunk_coord::ChunkCoord;

/// The world-side collaborator the generator publishes chunks to.
///
/// Implementations are queried from the generator's worker thread and from
/// caller threads, so they must be internally synchronized.
pub trait WorldSink: Send + Sync {
    /// Whether the chunk is already materialized. Checked again right before
    /// a pipeline run, not only at enqueue time.
    fn is_chunk_generated(&self, coord: ChunkCoord) -> bool;

    /// Whether anything (e.g. a connected client) currently needs this chunk.
    /// Drives the overload skip policy; skipped chunks are dropped silently.
    fn has_interested_observer(&self, coord: ChunkCoord) -> bool;

    /// Takes ownership of a completed chunk.
    fn store_chunk(&self, coord: ChunkCoord, chunk: ChunkData);
}
