// THEORY:
// The `parallel_pipeline` module carries the region finder into a concurrent setting.
// A `RegionFinder` is single-writer state: one analysis (set_image, find_regions,
// recolor_image) must run start to finish without anyone else touching it. Two ways
// are offered to honor that:
//
// 1.  `SharedFinder`: one finder behind an async mutex. The lock is held for a whole
//     analysis, so readers never observe a half-built region collection.
// 2.  `WorkerPool`: a dispatcher round-robins frames to N worker tasks. Each worker
//     owns its own finder and rng outright, so no locking is needed at all. Results
//     come back over oneshot channels. The analysis itself is CPU-bound, so each one
//     runs on the blocking thread pool and the async workers only shuttle state.

use crate::core_modules::pixel::pixel::Color;
use crate::core_modules::region::{Region, largest_region};
use crate::core_modules::region_finder::{FinderConfig, RegionFinder};
use crate::error::{FinderError, Result};
use futures::future::join_all;
use image::RgbaImage;
use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};

/// A snapshot of one completed analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnalysis {
    pub frame_id: u64,
    pub target_color: Color,
    /// Regions in collection order (most recently found first).
    pub regions: Vec<Region>,
    pub recolored: RgbaImage,
}

impl FrameAnalysis {
    /// The region with the most points, first one wins ties.
    pub fn largest_region(&self) -> Result<&Region> {
        largest_region(&self.regions)
    }
}

fn analyze_with(
    finder: &mut RegionFinder,
    rng: &mut StdRng,
    frame_id: u64,
    frame: RgbaImage,
    target_color: Color,
) -> Result<FrameAnalysis> {
    finder.set_image(frame);
    let regions = finder.find_regions(target_color)?.to_vec();
    let recolored = finder.recolor_image(rng)?.clone();
    Ok(FrameAnalysis {
        frame_id,
        target_color,
        regions,
        recolored,
    })
}

struct SharedState {
    finder: RegionFinder,
    rng: StdRng,
    frame_counter: u64,
}

/// A region finder that can be handed to many tasks.
#[derive(Clone)]
pub struct SharedFinder {
    inner: Arc<Mutex<SharedState>>,
}

impl SharedFinder {
    pub fn new(config: FinderConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    pub fn with_seed(config: FinderConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: FinderConfig, rng: StdRng) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SharedState {
                finder: RegionFinder::new(config),
                rng,
                frame_counter: 0,
            })),
        }
    }

    /// Runs a full analysis under the lock.
    pub async fn analyze(&self, frame: RgbaImage, target_color: Color) -> Result<FrameAnalysis> {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        let frame_id = state.frame_counter;
        state.frame_counter += 1;
        analyze_with(&mut state.finder, &mut state.rng, frame_id, frame, target_color)
    }

    /// The region count of the last completed analysis.
    pub async fn region_count(&self) -> usize {
        self.inner.lock().await.finder.region_count()
    }
}

struct FrameTask {
    frame_id: u64,
    frame: RgbaImage,
    target_color: Color,
    result_sender: oneshot::Sender<Result<FrameAnalysis>>,
}

/// A pool of tasks, each owning one `RegionFinder`.
pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<FrameTask>,
    workers: Vec<tokio::task::JoinHandle<()>>,
    frame_counter: std::sync::atomic::AtomicU64,
}

impl WorkerPool {
    /// One worker per logical CPU.
    pub fn new(config: FinderConfig, seed: Option<u64>) -> Self {
        Self::with_workers(config, num_cpus::get(), seed)
    }

    /// Must be called from within a tokio runtime. A `seed` makes every worker's
    /// recolor colors reproducible.
    pub fn with_workers(config: FinderConfig, worker_count: usize, seed: Option<u64>) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<FrameTask>();
        let mut workers = Vec::with_capacity(worker_count + 1);

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<FrameTask>())
            .unzip();

        // Dispatcher
        workers.push(tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                // A closed worker drops the task, and with it the reply sender.
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_count;
            }
        }));

        for (index, mut worker_receiver) in worker_receivers.into_iter().enumerate() {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
                None => StdRng::from_os_rng(),
            };

            workers.push(tokio::spawn(async move {
                let mut finder = RegionFinder::new(config);
                while let Some(task) = worker_receiver.recv().await {
                    let FrameTask {
                        frame_id,
                        frame,
                        target_color,
                        result_sender,
                    } = task;

                    let job = tokio::task::spawn_blocking(move || {
                        let analysis =
                            analyze_with(&mut finder, &mut rng, frame_id, frame, target_color);
                        (finder, rng, analysis)
                    });
                    match job.await {
                        Ok((returned_finder, returned_rng, analysis)) => {
                            finder = returned_finder;
                            rng = returned_rng;
                            let _ = result_sender.send(analysis);
                        }
                        Err(err) => {
                            // The finder went down with the job. Dropping `result_sender`
                            // reports the frame as unavailable.
                            warn!("region finder worker {index} lost frame {frame_id}: {err}");
                            break;
                        }
                    }
                }
                debug!("region finder worker {index} stopped");
            }));
        }

        Self {
            task_sender,
            workers,
            frame_counter: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len() - 1
    }

    pub async fn process_frame(&self, frame: RgbaImage, target_color: Color) -> Result<FrameAnalysis> {
        let frame_id = self
            .frame_counter
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let (result_sender, result_receiver) = oneshot::channel();

        self.task_sender
            .send(FrameTask {
                frame_id,
                frame,
                target_color,
                result_sender,
            })
            .map_err(|_| FinderError::WorkerUnavailable)?;

        result_receiver
            .await
            .map_err(|_| FinderError::WorkerUnavailable)?
    }

    /// Analyzes many frames concurrently. Results keep the input order.
    pub async fn process_batch(
        &self,
        frames: Vec<RgbaImage>,
        target_color: Color,
    ) -> Vec<Result<FrameAnalysis>> {
        join_all(
            frames
                .into_iter()
                .map(|frame| self.process_frame(frame, target_color)),
        )
        .await
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const GREEN: Rgba<u8> = Rgba([20, 200, 20, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    /// `blocks` separate 2x2 green squares on a black strip.
    fn frame(blocks: u32) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(blocks * 3, 2, BLACK);
        for b in 0..blocks {
            for dx in 0..2 {
                for y in 0..2 {
                    image.put_pixel(b * 3 + dx, y, GREEN);
                }
            }
        }
        image
    }

    fn config() -> FinderConfig {
        FinderConfig {
            min_region_size: 4,
            ..FinderConfig::default()
        }
    }

    #[tokio::test]
    async fn shared_finder_counts_frames() {
        let finder = SharedFinder::with_seed(config(), 9);

        let first = finder.analyze(frame(2), GREEN.into()).await.unwrap();
        let second = finder.analyze(frame(3), GREEN.into()).await.unwrap();

        assert_eq!((first.frame_id, first.regions.len()), (0, 2));
        assert_eq!((second.frame_id, second.regions.len()), (1, 3));
        assert_eq!(finder.region_count().await, 3);
    }

    #[tokio::test]
    async fn shared_finder_from_many_tasks() {
        let finder = SharedFinder::with_seed(config(), 1);
        let handles: Vec<_> = (1..=4)
            .map(|blocks| {
                let finder = finder.clone();
                tokio::spawn(async move { finder.analyze(frame(blocks), GREEN.into()).await })
            })
            .collect();

        let mut counts = Vec::new();
        for handle in handles {
            counts.push(handle.await.unwrap().unwrap().regions.len());
        }
        assert_eq!(counts, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn pool_keeps_batch_order() {
        let pool = WorkerPool::with_workers(config(), 3, Some(7));
        assert_eq!(pool.worker_count(), 3);

        let frames: Vec<RgbaImage> = (1..=6).map(frame).collect();
        let results = pool.process_batch(frames, GREEN.into()).await;

        let counts: Vec<usize> = results
            .into_iter()
            .map(|r| r.unwrap().regions.len())
            .collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn pool_runs_on_a_single_threaded_runtime() {
        // Analyses run off the async threads, so the dispatcher and workers still make
        // progress while frames are being processed.
        let pool = WorkerPool::with_workers(config(), 2, Some(3));

        let frames: Vec<RgbaImage> = (1..=4).map(frame).collect();
        let results = pool.process_batch(frames, GREEN.into()).await;

        let ids: Vec<(u64, usize)> = results
            .into_iter()
            .map(|r| r.unwrap())
            .map(|a| (a.frame_id, a.regions.len()))
            .collect();
        assert_eq!(ids, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
    }

    #[tokio::test]
    async fn worker_state_survives_across_frames() {
        let seeded = WorkerPool::with_workers(config(), 1, Some(11));
        let first = seeded.process_frame(frame(1), GREEN.into()).await.unwrap();
        let second = seeded.process_frame(frame(1), GREEN.into()).await.unwrap();

        // Same rng stream carried between jobs: the second frame draws the next color.
        let mut rng = StdRng::seed_from_u64(11);
        let expected_first = Color::random(&mut rng).to_rgba();
        let expected_second = Color::random(&mut rng).to_rgba();
        assert_eq!(*first.recolored.get_pixel(0, 0), expected_first);
        assert_eq!(*second.recolored.get_pixel(0, 0), expected_second);
    }

    #[tokio::test]
    async fn empty_analysis_has_no_largest_region() {
        let pool = WorkerPool::with_workers(config(), 1, Some(0));
        let analysis = pool
            .process_frame(RgbaImage::from_pixel(4, 4, BLACK), GREEN.into())
            .await
            .unwrap();

        assert!(analysis.regions.is_empty());
        assert_eq!(analysis.largest_region().unwrap_err(), FinderError::EmptyResult);
        assert_eq!(analysis.recolored, RgbaImage::from_pixel(4, 4, BLACK));
    }
}
