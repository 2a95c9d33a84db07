//! The background chunk generator.
//!
//! Takes requests for generating chunks and processes them one by one on a dedicated worker
//! thread. Requests are deduplicated by coordinate, already stored chunks are not regenerated,
//! and under overload the worker skips chunks no client is watching. Generation itself composes
//! pluggable algorithm stages (biome, terrain height, terrain composition, structures and
//! finishers) selected by the world's configuration; see [`pipeline`].
//!
//! One generator owns one worker and one queue. Running several generators over the same world
//! is unsupported: the same chunk could get generated twice.

pub mod biome;
pub mod composition;
pub mod finishers;
pub mod height;
pub mod pipeline;
mod queue;
pub mod structures;

use std::thread::JoinHandle;

use cb_schemas::coordinates::AbsChunkPos;
use cb_schemas::voxel::biome::{Biome, BiomeMap};
use cb_schemas::voxel::chunk::GeneratedChunkData;
use tracing::{debug, info, warn};

use crate::config::{ConfigSection, GeneratorConfig};
use crate::prelude::*;
use pipeline::ChunkPipeline;
use queue::GenQueue;

/// Number of pending requests above which the worker skips chunks that no client is watching.
pub const QUEUE_SKIP_THRESHOLD: usize = 500;

/// The world-side collaborator of the generator.
///
/// All operations must be callable from the worker thread concurrently with game threads.
pub trait GeneratorWorld: Send + Sync {
    /// Returns whether the chunk is already loaded in memory or persisted in storage.
    /// Such chunks are never generated again.
    fn is_chunk_available(&self, pos: AbsChunkPos) -> bool;

    /// Returns whether any connected client can currently see the given chunk.
    fn any_client_within_view(&self, pos: AbsChunkPos) -> bool;

    /// Accepts a finished chunk. Called on the worker thread; must not block for long, any
    /// queuing for persistence is the callee's responsibility. An error abandons the chunk.
    fn deliver_chunk(&self, pos: AbsChunkPos, data: GeneratedChunkData) -> Result<()>;
}

/// The chunk generator: owns the assembled pipeline, the request queue and the background
/// worker draining it. One instance belongs to exactly one world.
pub struct ChunkGenerator {
    pipeline: Arc<ChunkPipeline>,
    queue: Arc<GenQueue>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ChunkGenerator {
    /// Assembles the pipeline from the world's generator configuration section and spawns the
    /// worker thread. Unknown selectors and malformed options fail the start.
    pub fn start(world: Arc<dyn GeneratorWorld>, section: &ConfigSection) -> Result<Self> {
        Self::start_with_threshold(world, section, QUEUE_SKIP_THRESHOLD)
    }

    pub(crate) fn start_with_threshold(
        world: Arc<dyn GeneratorWorld>,
        section: &ConfigSection,
        skip_threshold: usize,
    ) -> Result<Self> {
        let config = GeneratorConfig::from_section(section)?;
        let pipeline = Arc::new(ChunkPipeline::from_config(&config)?);
        let queue = Arc::new(GenQueue::new());

        let worker = {
            let pipeline = Arc::clone(&pipeline);
            let queue = Arc::clone(&queue);
            std::thread::Builder::new()
                .name("Cuboria Chunk Generator".to_string())
                .spawn(move || worker_main(&queue, &pipeline, &*world, skip_threshold))
                .context("Could not spawn the chunk generator worker thread")?
        };

        info!(seed = config.seed, "chunk generator started");
        Ok(Self {
            pipeline,
            queue,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Stops the generator: releases the worker, joins it and discards any pending requests.
    /// Idempotent; callable from any thread except the worker itself.
    pub fn stop(&self) {
        self.queue.signal_stop();
        let handle = self.worker.lock().unwrap().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("chunk generator worker panicked before shutdown");
            }
            info!("chunk generator stopped");
        }
    }

    /// Queues the chunk for generation, dropping duplicate requests.
    /// The `chunk_y` parameter is accepted for compatibility with older callers and ignored;
    /// generation is columnar.
    pub fn queue_generate_chunk(&self, chunk_x: i32, _chunk_y: i32, chunk_z: i32) {
        self.queue.enqueue(AbsChunkPos::new(chunk_x, chunk_z));
    }

    /// Generates the biomes for the specified chunk directly on the caller's thread, bypassing
    /// the queue. Safe to call concurrently with the worker.
    pub fn generate_biomes(&self, chunk_x: i32, chunk_z: i32, biomes: &mut BiomeMap) -> Result<()> {
        self.pipeline.generate_biomes(AbsChunkPos::new(chunk_x, chunk_z), biomes)
    }

    /// Blocks until the request queue is empty (or the generator is stopped).
    pub fn wait_for_queue_empty(&self) {
        self.queue.wait_until_empty();
    }

    /// The number of pending generation requests.
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    /// The world seed the pipeline was built with.
    pub fn seed(&self) -> i32 {
        self.pipeline.seed()
    }

    /// Returns the biome at the given world block coordinates.
    pub fn biome_at(&self, block_x: i32, block_z: i32) -> Result<Biome> {
        self.pipeline.biome_at(block_x, block_z)
    }
}

impl Drop for ChunkGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_main(queue: &GenQueue, pipeline: &ChunkPipeline, world: &dyn GeneratorWorld, skip_threshold: usize) {
    let _span = tracing::info_span!("chunk-generator").entered();
    while let Some(pos) = queue.dequeue_blocking() {
        if world.is_chunk_available(pos) {
            debug!(%pos, "chunk already present, not generating");
            queue.mark_removed();
            continue;
        }
        if queue.len() > skip_threshold && !world.any_client_within_view(pos) {
            warn!(%pos, pending = queue.len(), "generator overloaded, skipping unwatched chunk");
            queue.mark_removed();
            continue;
        }

        match pipeline.generate_chunk(pos) {
            Ok(data) => {
                if let Err(error) = world.deliver_chunk(pos, data) {
                    warn!(%pos, ?error, "chunk sink rejected the generated chunk");
                }
            }
            Err(error) => {
                warn!(%pos, ?error, "chunk generation failed");
            }
        }
        queue.mark_removed();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    /// World stub recording every interaction. `hold` lets tests stall the worker inside its
    /// first availability query until the test finished staging the queue.
    #[derive(Default)]
    struct TestWorld {
        available: HashSet<AbsChunkPos>,
        has_clients: bool,
        hold: Mutex<()>,
        delivered: Mutex<Vec<AbsChunkPos>>,
        client_queries: Mutex<Vec<AbsChunkPos>>,
    }

    impl GeneratorWorld for TestWorld {
        fn is_chunk_available(&self, pos: AbsChunkPos) -> bool {
            drop(self.hold.lock().unwrap());
            self.available.contains(&pos)
        }

        fn any_client_within_view(&self, pos: AbsChunkPos) -> bool {
            self.client_queries.lock().unwrap().push(pos);
            self.has_clients
        }

        fn deliver_chunk(&self, pos: AbsChunkPos, _data: GeneratedChunkData) -> Result<()> {
            self.delivered.lock().unwrap().push(pos);
            Ok(())
        }
    }

    fn fast_section() -> ConfigSection {
        ConfigSection::from_pairs([
            ("seed", "1"),
            ("biome_gen", "constant:plains"),
            ("height_gen", "flat:64"),
            ("composition_gen", "debug"),
            ("structures", ""),
            ("finishers", ""),
        ])
    }

    #[test]
    fn duplicate_requests_are_generated_once() {
        let world = Arc::new(TestWorld::default());
        let generator = ChunkGenerator::start(world.clone(), &fast_section()).unwrap();

        {
            let _staging = world.hold.lock().unwrap();
            // decoy request parks the worker inside the availability query
            generator.queue_generate_chunk(9, 0, 9);
            thread::sleep(Duration::from_millis(20));
            generator.queue_generate_chunk(5, 0, 5);
            generator.queue_generate_chunk(5, 64, 5);
            generator.queue_generate_chunk(5, 128, 5);
            assert_eq!(generator.queue_length(), 1);
        }
        generator.wait_for_queue_empty();
        generator.stop();

        let delivered = world.delivered.lock().unwrap();
        assert_eq!(&*delivered, &[AbsChunkPos::new(9, 9), AbsChunkPos::new(5, 5)]);
    }

    #[test]
    fn available_chunks_are_not_regenerated() {
        let mut world = TestWorld::default();
        world.available.insert(AbsChunkPos::ZERO);
        let world = Arc::new(world);
        let generator = ChunkGenerator::start(world.clone(), &fast_section()).unwrap();

        generator.queue_generate_chunk(0, 0, 0);
        generator.wait_for_queue_empty();
        generator.stop();

        assert!(world.delivered.lock().unwrap().is_empty());
    }

    #[test]
    fn overloaded_queue_skips_unwatched_chunks() {
        let world = Arc::new(TestWorld::default());
        let generator = ChunkGenerator::start_with_threshold(world.clone(), &fast_section(), 5).unwrap();

        {
            let _staging = world.hold.lock().unwrap();
            for x in 0..25 {
                generator.queue_generate_chunk(x, 0, 0);
            }
        }
        generator.wait_for_queue_empty();
        generator.stop();

        let delivered = world.delivered.lock().unwrap();
        let client_queries = world.client_queries.lock().unwrap();
        // everything dequeued above the high-water mark was skipped; only the tail of the
        // queue (the first dequeue that left at most 5 pending) was generated
        let expected_tail: Vec<AbsChunkPos> = (19..25).map(|x| AbsChunkPos::new(x, 0)).collect();
        assert_eq!(&*delivered, &expected_tail);
        // and each skip first verified that nobody was watching
        assert_eq!(client_queries.len(), 25 - delivered.len());
        for pos in client_queries.iter() {
            assert!(!delivered.contains(pos));
        }
    }

    #[test]
    fn watched_chunks_are_generated_even_under_overload() {
        let mut world = TestWorld::default();
        world.has_clients = true;
        let world = Arc::new(world);
        let generator = ChunkGenerator::start_with_threshold(world.clone(), &fast_section(), 5).unwrap();

        {
            let _staging = world.hold.lock().unwrap();
            for x in 0..25 {
                generator.queue_generate_chunk(x, 0, 0);
            }
        }
        generator.wait_for_queue_empty();
        generator.stop();

        assert_eq!(world.delivered.lock().unwrap().len(), 25);
    }

    #[test]
    fn stop_abandons_pending_requests() {
        let world = Arc::new(TestWorld::default());
        let generator = Arc::new(ChunkGenerator::start(world.clone(), &fast_section()).unwrap());

        let stopper = {
            let staging = world.hold.lock().unwrap();
            for x in 0..10 {
                generator.queue_generate_chunk(x, 0, 0);
            }
            let stopper = {
                let generator = Arc::clone(&generator);
                thread::spawn(move || generator.stop())
            };
            // let the stop signal land while the worker is parked on its current request
            thread::sleep(Duration::from_millis(20));
            drop(staging);
            stopper
        };
        stopper.join().unwrap();

        assert_eq!(generator.queue_length(), 0);
        let delivered_after_join = world.delivered.lock().unwrap().len();
        assert!(delivered_after_join <= 1, "delivered {delivered_after_join} chunks");
        thread::sleep(Duration::from_millis(30));
        assert_eq!(world.delivered.lock().unwrap().len(), delivered_after_join);
    }

    #[test]
    fn stop_is_idempotent() {
        let world = Arc::new(TestWorld::default());
        let generator = ChunkGenerator::start(world, &fast_section()).unwrap();
        generator.queue_generate_chunk(1, 0, 1);
        generator.stop();
        generator.stop();
        generator.stop();
        // and Drop stops once more
    }

    #[test]
    fn distinct_coords_are_delivered_in_request_order() {
        let world = Arc::new(TestWorld::default());
        let generator = ChunkGenerator::start(world.clone(), &fast_section()).unwrap();

        let expected: Vec<AbsChunkPos> = (0..6).map(|x| AbsChunkPos::new(x, -x)).collect();
        {
            let _staging = world.hold.lock().unwrap();
            for pos in &expected {
                generator.queue_generate_chunk(pos.x, 0, pos.z);
            }
        }
        generator.wait_for_queue_empty();
        generator.stop();

        assert_eq!(&*world.delivered.lock().unwrap(), &expected);
    }

    #[test]
    fn concurrent_biome_queries_agree() {
        let world = Arc::new(TestWorld::default());
        let section = ConfigSection::from_pairs([("seed", "404"), ("biome_gen", "multinoise")]);
        let generator = Arc::new(ChunkGenerator::start(world, &section).unwrap());

        // keep the worker busy while the direct queries run
        for x in 0..8 {
            generator.queue_generate_chunk(x, 0, x);
        }

        let mut reference = BiomeMap::default();
        generator.generate_biomes(3, 7, &mut reference).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                thread::spawn(move || {
                    let mut biomes = BiomeMap::default();
                    generator.generate_biomes(3, 7, &mut biomes).unwrap();
                    biomes
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), reference);
        }

        generator.wait_for_queue_empty();
        generator.stop();
    }

    #[test]
    fn start_surfaces_invalid_config() {
        let world = Arc::new(TestWorld::default());
        let section = ConfigSection::from_pairs([("biome_gen", "volcanic")]);
        assert!(ChunkGenerator::start(world.clone(), &section).is_err());
        let section = ConfigSection::from_pairs([("seed", "twelve")]);
        assert!(ChunkGenerator::start(world, &section).is_err());
    }

    #[test]
    fn seed_and_biome_queries_pass_through() {
        let world = Arc::new(TestWorld::default());
        let section = ConfigSection::from_pairs([("seed", "1234"), ("biome_gen", "constant:desert")]);
        let generator = ChunkGenerator::start(world, &section).unwrap();
        assert_eq!(generator.seed(), 1234);
        assert_eq!(generator.biome_at(-5, 33).unwrap(), Biome::Desert);
        generator.stop();
    }

    #[test]
    fn requests_after_stop_are_ignored() {
        let world = Arc::new(TestWorld::default());
        let generator = ChunkGenerator::start(world.clone(), &fast_section()).unwrap();
        generator.stop();
        generator.queue_generate_chunk(1, 0, 1);
        assert_eq!(generator.queue_length(), 0);
        // liveness: returns immediately after stop
        generator.wait_for_queue_empty();
        assert!(world.delivered.lock().unwrap().is_empty());
    }
}
