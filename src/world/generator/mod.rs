pub mod biome_gen;
pub mod builder;
pub mod composition;
pub mod finishers;
pub mod height_gen;
pub mod strategy;
pub mod structures;

pub use builder::build_pipeline;
pub use strategy::{
    BiomeStrategy, CompositionStrategy, FinisherStrategy, HeightStrategy, Pipeline,
    StructureStrategy,
};

use crate::config::WorldGenConfig;
use crate::utils::error::Result;
use crate::world::biome::Biome;
use crate::world::chunk::{BiomeMap, CHUNK_SIZE};
use crate::world::chunk_coord::ChunkCoord;
use crate::world::sink::WorldSink;
use log::{debug, error, warn};
use parking_lot::{Condvar, Mutex};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Queue thresholds for the overload policy.
#[derive(Debug, Clone, Copy)]
pub struct QueueLimits {
    /// Above this many pending requests, unobserved chunks are dropped.
    pub skip_limit: usize,
    /// Above this many pending requests, enqueueing logs a warning.
    pub warn_limit: usize,
}

impl Default for QueueLimits {
    fn default() -> Self {
        Self {
            skip_limit: 500,
            warn_limit: 1000,
        }
    }
}

/// A queued ask to materialize one chunk. Identity for deduplication is the
/// coordinate alone; the arrival time is diagnostic metadata.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub coord: ChunkCoord,
    pub queued_at: Instant,
}

impl GenerationRequest {
    fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            queued_at: Instant::now(),
        }
    }
}

struct QueueState {
    queue: VecDeque<GenerationRequest>,
    pending: HashSet<ChunkCoord>,
    in_flight: bool,
    stop: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    /// Signaled when the queue becomes non-empty or a stop is requested.
    wake: Condvar,
    /// Signaled when the worker finishes (or drops) a dequeued request.
    removed: Condvar,
}

/// The chunk generation worker.
///
/// Accepts requests from any thread, deduplicates them by coordinate, and
/// drains them on one dedicated background thread through the configured
/// pipeline, publishing each finished chunk to the world sink.
///
/// Running more than one generator against the same world sink may generate
/// the same chunk twice; nothing prevents that race. Deploy one instance per
/// world.
pub struct ChunkGenerator {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    biome_gen: Arc<dyn BiomeStrategy>,
    seed: i64,
    limits: QueueLimits,
}

impl ChunkGenerator {
    /// Builds the pipeline from config and starts the worker thread.
    /// Fails fatally on unknown strategy names or invalid parameters.
    pub fn start(config: &WorldGenConfig, world: Arc<dyn WorldSink>) -> Result<Self> {
        let pipeline = build_pipeline(config)?;
        let limits = QueueLimits {
            skip_limit: config.queue_skip_limit,
            warn_limit: config.queue_warn_limit,
        };
        Self::with_pipeline(config.seed, pipeline, limits, world)
    }

    /// Starts the worker with an already-assembled pipeline.
    pub fn with_pipeline(
        seed: i64,
        pipeline: Pipeline,
        limits: QueueLimits,
        world: Arc<dyn WorldSink>,
    ) -> Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                queue: VecDeque::new(),
                pending: HashSet::new(),
                in_flight: false,
                stop: false,
            }),
            wake: Condvar::new(),
            removed: Condvar::new(),
        });

        let biome_gen = Arc::clone(pipeline.biome_gen());
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("chunk-generator".into())
            .spawn(move || worker_loop(worker_shared, pipeline, world, limits.skip_limit))?;

        Ok(Self {
            shared,
            worker: Some(worker),
            biome_gen,
            seed,
            limits,
        })
    }

    /// Queues a chunk for generation. A coordinate already waiting in the
    /// queue is not queued twice.
    pub fn enqueue(&self, coord: ChunkCoord) {
        let mut state = self.shared.state.lock();
        if !state.pending.insert(coord) {
            return;
        }
        state.queue.push_back(GenerationRequest::new(coord));
        if state.queue.len() >= self.limits.warn_limit {
            warn!(
                "Chunk generator queue is overloaded ({} chunks pending)",
                state.queue.len()
            );
        }
        drop(state);
        self.shared.wake.notify_one();
    }

    /// Number of requests currently waiting (not counting one in flight).
    pub fn queue_len(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Blocks until every queued request has been generated or dropped.
    /// Returns immediately once the generator is stopped.
    pub fn wait_until_empty(&self) {
        let mut state = self.shared.state.lock();
        while (!state.queue.is_empty() || state.in_flight) && !state.stop {
            self.shared.removed.wait(&mut state);
        }
    }

    /// Runs only the biome stage for a chunk, synchronously on the calling
    /// thread. Output matches what the full pipeline would produce.
    pub fn generate_biomes(&self, coord: ChunkCoord) -> Result<BiomeMap> {
        let mut biomes = BiomeMap::new();
        self.biome_gen.generate(coord, &mut biomes)?;
        Ok(biomes)
    }

    /// Biome of the column containing the given world position.
    pub fn biome_at(&self, world_x: i32, world_z: i32) -> Result<Biome> {
        let biomes = self.generate_biomes(ChunkCoord::from_block_pos(world_x, world_z))?;
        let local_x = world_x.rem_euclid(CHUNK_SIZE as i32) as usize;
        let local_z = world_z.rem_euclid(CHUNK_SIZE as i32) as usize;
        Ok(biomes.get(local_x, local_z))
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Stops the worker and joins it. An in-flight run completes and stores
    /// its chunk; remaining queued requests are left untouched.
    pub fn stop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            if state.stop {
                return;
            }
            state.stop = true;
        }
        self.shared.wake.notify_all();
        self.shared.removed.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Chunk generator worker panicked during shutdown");
            }
        }
    }
}

impl Drop for ChunkGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    shared: Arc<Shared>,
    pipeline: Pipeline,
    world: Arc<dyn WorldSink>,
    skip_limit: usize,
) {
    loop {
        let (request, remaining) = {
            let mut state = shared.state.lock();
            loop {
                if state.stop {
                    return;
                }
                if let Some(request) = state.queue.pop_front() {
                    state.pending.remove(&request.coord);
                    state.in_flight = true;
                    break (request, state.queue.len());
                }
                shared.wake.wait(&mut state);
            }
        };

        // Generation runs outside the queue lock so producers never block on
        // a long pipeline run.
        process_request(&request, remaining, &pipeline, &world, skip_limit);

        let mut state = shared.state.lock();
        state.in_flight = false;
        shared.removed.notify_all();
    }
}

fn process_request(
    request: &GenerationRequest,
    remaining: usize,
    pipeline: &Pipeline,
    world: &Arc<dyn WorldSink>,
    skip_limit: usize,
) {
    let coord = request.coord;

    if world.is_chunk_generated(coord) {
        debug!("Chunk {coord} is already generated, skipping");
        return;
    }
    if remaining > skip_limit && !world.has_interested_observer(coord) {
        warn!("Generator overloaded ({remaining} pending), dropping unobserved chunk {coord}");
        return;
    }

    debug!(
        "Generating chunk {coord} (queued {:?} ago)",
        request.queued_at.elapsed()
    );
    match pipeline.run(coord) {
        Ok(chunk) => world.store_chunk(coord, chunk),
        Err(e) => error!("Chunk generation failed for {coord}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GenError;
    use crate::world::block_id::BlockId;
    use crate::world::chunk::{
        BlockEntitySeed, BlockMetaGrid, BlockTypeGrid, ChunkData, HeightMap, SpawnedEntity,
    };
    use crate::world::generator::biome_gen::ConstantBiomeGen;
    use crate::world::generator::composition::FlatCompositionGen;
    use crate::world::generator::height_gen::FlatHeightGen;
    use glam::Vec3;
    use std::collections::HashMap;
    use std::time::Duration;

    struct MemoryWorld {
        stored: Mutex<HashMap<ChunkCoord, ChunkData>>,
        store_counts: Mutex<HashMap<ChunkCoord, usize>>,
        pregenerated: Mutex<HashSet<ChunkCoord>>,
        observer: bool,
    }

    impl MemoryWorld {
        fn new(observer: bool) -> Self {
            Self {
                stored: Mutex::new(HashMap::new()),
                store_counts: Mutex::new(HashMap::new()),
                pregenerated: Mutex::new(HashSet::new()),
                observer,
            }
        }

        fn mark_generated(&self, coord: ChunkCoord) {
            self.pregenerated.lock().insert(coord);
        }

        fn store_count(&self, coord: ChunkCoord) -> usize {
            self.store_counts.lock().get(&coord).copied().unwrap_or(0)
        }

        fn stored_chunk(&self, coord: ChunkCoord) -> Option<ChunkData> {
            self.stored.lock().get(&coord).cloned()
        }
    }

    impl WorldSink for MemoryWorld {
        fn is_chunk_generated(&self, coord: ChunkCoord) -> bool {
            self.pregenerated.lock().contains(&coord) || self.stored.lock().contains_key(&coord)
        }

        fn has_interested_observer(&self, _coord: ChunkCoord) -> bool {
            self.observer
        }

        fn store_chunk(&self, coord: ChunkCoord, chunk: ChunkData) {
            *self.store_counts.lock().entry(coord).or_insert(0) += 1;
            self.stored.lock().insert(coord, chunk);
        }
    }

    /// World sink that parks the worker inside the generated-check of one
    /// designated chunk until the test releases it, so tests can stage the
    /// queue deterministically while the worker is busy.
    struct GateWorld {
        inner: MemoryWorld,
        gate_coord: ChunkCoord,
        gate: Mutex<(bool, bool)>, // (worker entered, gate open)
        cond: Condvar,
    }

    impl GateWorld {
        fn new(gate_coord: ChunkCoord, observer: bool) -> Self {
            Self {
                inner: MemoryWorld::new(observer),
                gate_coord,
                gate: Mutex::new((false, false)),
                cond: Condvar::new(),
            }
        }

        fn wait_for_worker(&self) {
            let mut gate = self.gate.lock();
            while !gate.0 {
                self.cond.wait(&mut gate);
            }
        }

        fn open(&self) {
            let mut gate = self.gate.lock();
            gate.1 = true;
            self.cond.notify_all();
        }
    }

    impl WorldSink for GateWorld {
        fn is_chunk_generated(&self, coord: ChunkCoord) -> bool {
            if coord == self.gate_coord {
                let mut gate = self.gate.lock();
                gate.0 = true;
                self.cond.notify_all();
                while !gate.1 {
                    self.cond.wait(&mut gate);
                }
            }
            self.inner.is_chunk_generated(coord)
        }

        fn has_interested_observer(&self, coord: ChunkCoord) -> bool {
            self.inner.has_interested_observer(coord)
        }

        fn store_chunk(&self, coord: ChunkCoord, chunk: ChunkData) {
            self.inner.store_chunk(coord, chunk);
        }
    }

    fn test_pipeline() -> Pipeline {
        Pipeline::new(
            Arc::new(ConstantBiomeGen::new(Biome::Plains)),
            Box::new(FlatHeightGen::new(4)),
            Box::new(FlatCompositionGen::new(vec![
                (BlockId::BEDROCK, 1),
                (BlockId::STONE, 4),
            ])),
        )
    }

    /// Unconditionally sets one voxel; used to probe stage ordering.
    struct VoxelSetter {
        id: BlockId,
    }

    impl StructureStrategy for VoxelSetter {
        fn apply(
            &self,
            _coord: ChunkCoord,
            blocks: &mut BlockTypeGrid,
            _meta: &mut BlockMetaGrid,
            _heights: &mut HeightMap,
            _entities: &mut Vec<SpawnedEntity>,
            _block_entities: &mut Vec<BlockEntitySeed>,
        ) -> crate::utils::error::Result<()> {
            blocks.set(1, 1, 1, self.id);
            Ok(())
        }
    }

    struct FaultyGen {
        fail_at: ChunkCoord,
    }

    impl StructureStrategy for FaultyGen {
        fn apply(
            &self,
            coord: ChunkCoord,
            _blocks: &mut BlockTypeGrid,
            _meta: &mut BlockMetaGrid,
            _heights: &mut HeightMap,
            _entities: &mut Vec<SpawnedEntity>,
            _block_entities: &mut Vec<BlockEntitySeed>,
        ) -> crate::utils::error::Result<()> {
            if coord == self.fail_at {
                return Err(GenError::StrategyFault {
                    stage: "structures",
                    x: coord.x(),
                    z: coord.z(),
                    message: "scripted failure".into(),
                });
            }
            Ok(())
        }
    }

    struct EntitySpawner;

    impl StructureStrategy for EntitySpawner {
        fn apply(
            &self,
            _coord: ChunkCoord,
            _blocks: &mut BlockTypeGrid,
            _meta: &mut BlockMetaGrid,
            _heights: &mut HeightMap,
            entities: &mut Vec<SpawnedEntity>,
            block_entities: &mut Vec<BlockEntitySeed>,
        ) -> crate::utils::error::Result<()> {
            entities.push(SpawnedEntity {
                kind: "pig".into(),
                pos: Vec3::new(8.0, 5.0, 8.0),
            });
            block_entities.push(BlockEntitySeed {
                kind: "chest".into(),
                pos: glam::IVec3::new(1, 2, 3),
            });
            Ok(())
        }
    }

    #[test]
    fn test_dedup_collapses_requests() {
        let gate = ChunkCoord::new(100, 100);
        let world = Arc::new(GateWorld::new(gate, true));
        let mut gen = ChunkGenerator::with_pipeline(
            1,
            test_pipeline(),
            QueueLimits::default(),
            world.clone(),
        )
        .unwrap();

        gen.enqueue(gate);
        world.wait_for_worker();

        let coord = ChunkCoord::new(3, 3);
        for _ in 0..5 {
            gen.enqueue(coord);
        }
        assert_eq!(gen.queue_len(), 1);

        world.open();
        gen.wait_until_empty();
        assert_eq!(world.inner.store_count(coord), 1);
        gen.stop();
    }

    #[test]
    fn test_no_double_generation() {
        let world = Arc::new(MemoryWorld::new(true));
        let coord = ChunkCoord::new(7, -7);
        world.mark_generated(coord);

        let mut gen = ChunkGenerator::with_pipeline(
            1,
            test_pipeline(),
            QueueLimits::default(),
            world.clone(),
        )
        .unwrap();
        gen.enqueue(coord);
        gen.wait_until_empty();
        gen.stop();

        assert_eq!(world.store_count(coord), 0);
    }

    #[test]
    fn test_drain_generates_every_coordinate() {
        let world = Arc::new(MemoryWorld::new(true));
        let mut gen = ChunkGenerator::with_pipeline(
            1,
            test_pipeline(),
            QueueLimits::default(),
            world.clone(),
        )
        .unwrap();

        let coords: Vec<_> = (0..6).map(|i| ChunkCoord::new(i, -i)).collect();
        for coord in &coords {
            gen.enqueue(*coord);
        }
        gen.wait_until_empty();
        assert_eq!(gen.queue_len(), 0);
        for coord in &coords {
            assert_eq!(world.store_count(*coord), 1, "missing chunk {coord}");
        }
        gen.stop();
    }

    #[test]
    fn test_overload_drops_unobserved_chunks() {
        let gate = ChunkCoord::new(100, 100);
        let world = Arc::new(GateWorld::new(gate, false));
        let limits = QueueLimits {
            skip_limit: 0,
            warn_limit: 1000,
        };
        let mut gen =
            ChunkGenerator::with_pipeline(1, test_pipeline(), limits, world.clone()).unwrap();

        gen.enqueue(gate);
        world.wait_for_worker();

        let coords = [
            ChunkCoord::new(1, 0),
            ChunkCoord::new(2, 0),
            ChunkCoord::new(3, 0),
        ];
        for coord in &coords {
            gen.enqueue(*coord);
        }
        world.open();
        gen.wait_until_empty();
        gen.stop();

        // FIFO: the first two are dropped while the queue is backed up; the
        // last one runs against an empty queue and generates normally.
        assert_eq!(world.inner.store_count(coords[0]), 0);
        assert_eq!(world.inner.store_count(coords[1]), 0);
        assert_eq!(world.inner.store_count(coords[2]), 1);
        assert_eq!(world.inner.store_count(gate), 1);
    }

    #[test]
    fn test_overload_never_drops_observed_chunks() {
        let gate = ChunkCoord::new(100, 100);
        let world = Arc::new(GateWorld::new(gate, true));
        let limits = QueueLimits {
            skip_limit: 0,
            warn_limit: 1000,
        };
        let mut gen =
            ChunkGenerator::with_pipeline(1, test_pipeline(), limits, world.clone()).unwrap();

        gen.enqueue(gate);
        world.wait_for_worker();
        let coords = [ChunkCoord::new(1, 0), ChunkCoord::new(2, 0)];
        for coord in &coords {
            gen.enqueue(*coord);
        }
        world.open();
        gen.wait_until_empty();
        gen.stop();

        for coord in &coords {
            assert_eq!(world.inner.store_count(*coord), 1);
        }
    }

    #[test]
    fn test_stop_finishes_in_flight_run_only() {
        let gate = ChunkCoord::new(100, 100);
        let world = Arc::new(GateWorld::new(gate, true));
        let mut gen = ChunkGenerator::with_pipeline(
            1,
            test_pipeline(),
            QueueLimits::default(),
            world.clone(),
        )
        .unwrap();

        gen.enqueue(gate);
        world.wait_for_worker();
        let leftovers = [
            ChunkCoord::new(1, 1),
            ChunkCoord::new(2, 2),
            ChunkCoord::new(3, 3),
        ];
        for coord in &leftovers {
            gen.enqueue(*coord);
        }

        // Request the stop while the worker is parked mid-run, then release
        // it; the in-flight chunk must complete, the leftovers must not.
        let stopper = thread::spawn(move || {
            gen.stop();
            gen
        });
        thread::sleep(Duration::from_millis(150));
        world.open();
        let gen = stopper.join().unwrap();

        assert_eq!(world.inner.store_count(gate), 1);
        assert_eq!(gen.queue_len(), 3);
        for coord in &leftovers {
            assert_eq!(world.inner.store_count(*coord), 0);
        }
    }

    #[test]
    fn test_strategy_fault_drops_chunk_and_worker_continues() {
        let world = Arc::new(MemoryWorld::new(true));
        let bad = ChunkCoord::new(13, 13);
        let good = ChunkCoord::new(14, 14);
        let pipeline = test_pipeline().with_structure(Box::new(FaultyGen { fail_at: bad }));
        let mut gen =
            ChunkGenerator::with_pipeline(1, pipeline, QueueLimits::default(), world.clone())
                .unwrap();

        gen.enqueue(bad);
        gen.enqueue(good);
        gen.wait_until_empty();
        gen.stop();

        assert_eq!(world.store_count(bad), 0);
        assert_eq!(world.store_count(good), 1);
    }

    #[test]
    fn test_structure_order_changes_output() {
        let run_with = |first: BlockId, second: BlockId| {
            let pipeline = test_pipeline()
                .with_structure(Box::new(VoxelSetter { id: first }))
                .with_structure(Box::new(VoxelSetter { id: second }));
            pipeline.run(ChunkCoord::new(0, 0)).unwrap()
        };

        let stone_then_air = run_with(BlockId::STONE, BlockId::AIR);
        assert_eq!(stone_then_air.blocks.get(1, 1, 1), BlockId::AIR);

        let air_then_stone = run_with(BlockId::AIR, BlockId::STONE);
        assert_eq!(air_then_stone.blocks.get(1, 1, 1), BlockId::STONE);
    }

    #[test]
    fn test_seeded_entities_reach_the_sink() {
        let world = Arc::new(MemoryWorld::new(true));
        let pipeline = test_pipeline().with_structure(Box::new(EntitySpawner));
        let coord = ChunkCoord::new(5, 5);
        let mut gen =
            ChunkGenerator::with_pipeline(1, pipeline, QueueLimits::default(), world.clone())
                .unwrap();
        gen.enqueue(coord);
        gen.wait_until_empty();
        gen.stop();

        let chunk = world.stored_chunk(coord).unwrap();
        assert_eq!(chunk.entities.len(), 1);
        assert_eq!(chunk.entities[0].kind, "pig");
        assert_eq!(chunk.block_entities[0].kind, "chest");
    }

    #[test]
    fn test_determinism_across_instances_and_orders() {
        let config = WorldGenConfig {
            seed: 777,
            ..Default::default()
        };
        let coord = ChunkCoord::new(4, -9);

        let p1 = build_pipeline(&config).unwrap();
        let _ = p1.run(ChunkCoord::new(0, 0)).unwrap();
        let _ = p1.run(ChunkCoord::new(-4, 2)).unwrap();
        let a = p1.run(coord).unwrap();

        let p2 = build_pipeline(&config).unwrap();
        let b = p2.run(coord).unwrap();
        let _ = p2.run(ChunkCoord::new(9, 9)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_biomes_matches_pipeline_stage() {
        let config = WorldGenConfig {
            seed: 321,
            ..Default::default()
        };
        let world = Arc::new(MemoryWorld::new(true));
        let mut gen = ChunkGenerator::start(&config, world.clone()).unwrap();
        let coord = ChunkCoord::new(2, 3);

        gen.enqueue(coord);
        gen.wait_until_empty();
        let direct = gen.generate_biomes(coord).unwrap();
        let stored = world.stored_chunk(coord).unwrap();
        assert_eq!(direct, stored.biomes);
        gen.stop();
    }

    #[test]
    fn test_biome_at_matches_generate_biomes() {
        let config = WorldGenConfig {
            seed: 555,
            ..Default::default()
        };
        let world = Arc::new(MemoryWorld::new(true));
        let gen = ChunkGenerator::start(&config, world).unwrap();

        for (world_x, world_z) in [(0, 0), (17, 42), (-1, -1), (-100, 250)] {
            let coord = ChunkCoord::from_block_pos(world_x, world_z);
            let biomes = gen.generate_biomes(coord).unwrap();
            let local_x = world_x.rem_euclid(CHUNK_SIZE as i32) as usize;
            let local_z = world_z.rem_euclid(CHUNK_SIZE as i32) as usize;
            assert_eq!(
                gen.biome_at(world_x, world_z).unwrap(),
                biomes.get(local_x, local_z)
            );
        }
    }

    #[test]
    fn test_seed_accessor() {
        let world = Arc::new(MemoryWorld::new(true));
        let gen = ChunkGenerator::with_pipeline(
            424_242,
            test_pipeline(),
            QueueLimits::default(),
            world,
        )
        .unwrap();
        assert_eq!(gen.seed(), 424_242);
    }
}
