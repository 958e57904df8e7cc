//! Sequence loader: fans slot resolution out to the worker pool and hands
//! results back to the player over a channel.
//!
//! **Generation guard**: every `load_sequence` bumps a shared epoch counter.
//! The pool skips queued jobs of older generations, and results that were
//! already in flight carry their generation so the player can drop them
//! (`SequenceReplaced` is silent, never an error).
//!
//! **Single writer**: workers never touch sequence state. They send one
//! `SlotResolved` per slot; only the player's thread applies them.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::entities::{AssetPolicy, ImageSource, SlotOutcome, WorkerPool, resolve_slot};

/// Terminal outcome of one slot, tagged with the load that produced it
#[derive(Debug, Clone)]
pub struct SlotResolved {
    pub generation: u64,
    pub index: usize,
    pub outcome: SlotOutcome,
}

/// Ticket for one `load_sequence` call
#[derive(Debug, Clone)]
pub struct LoadHandle {
    generation: u64,
    product: String,
    total: usize,
    epoch: Arc<AtomicU64>,
}

impl LoadHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// No newer load has started and this one was not cancelled
    pub fn is_current(&self) -> bool {
        self.epoch.load(Ordering::Relaxed) == self.generation
    }

    /// Drop this load's remaining jobs. No-op if already superseded.
    pub fn cancel(&self) {
        if self
            .epoch
            .compare_exchange(self.generation, self.generation + 1, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            debug!("Load {} ({}) cancelled", self.generation, self.product);
        }
    }
}

pub struct SequenceLoader {
    pool: Arc<dyn WorkerPool>,
    source: Arc<dyn ImageSource>,
    policy: Arc<AssetPolicy>,
    epoch: Arc<AtomicU64>,
    tx: Sender<SlotResolved>,
    rx: Receiver<SlotResolved>,
}

impl SequenceLoader {
    /// `epoch` must be the counter the pool checks in `execute_with_epoch`
    pub fn new(
        pool: Arc<dyn WorkerPool>,
        source: Arc<dyn ImageSource>,
        policy: AssetPolicy,
        epoch: Arc<AtomicU64>,
    ) -> Self {
        let (tx, rx) = unbounded();
        Self {
            pool,
            source,
            policy: Arc::new(policy),
            epoch,
            tx,
            rx,
        }
    }

    pub fn policy(&self) -> &AssetPolicy {
        &self.policy
    }

    pub fn current_generation(&self) -> u64 {
        self.epoch.load(Ordering::Relaxed)
    }

    /// Start resolving `total` slots for `product`, superseding any load in flight.
    pub fn load_sequence(&self, product: &str, total: usize) -> LoadHandle {
        let total = total.max(1);
        let generation = self.epoch.fetch_add(1, Ordering::Relaxed) + 1;
        info!("Loading sequence '{}' ({} frames, generation {})", product, total, generation);

        for index in 0..total {
            let source = Arc::clone(&self.source);
            let policy = Arc::clone(&self.policy);
            let tx = self.tx.clone();
            let product = product.to_string();

            self.pool.execute_with_epoch(
                generation,
                Box::new(move || {
                    let outcome = resolve_slot(source.as_ref(), &policy, &product, index, total);
                    // Receiver lives in the loader; a send error means it was dropped
                    let _ = tx.send(SlotResolved { generation, index, outcome });
                }),
            );
        }

        LoadHandle {
            generation,
            product: product.to_string(),
            total,
            epoch: Arc::clone(&self.epoch),
        }
    }

    /// All results received so far, without blocking
    pub fn drain(&self) -> Vec<SlotResolved> {
        self.rx.try_iter().collect()
    }

    /// Block up to `timeout` for the next result
    pub fn wait(&self, timeout: Duration) -> Option<SlotResolved> {
        match self.rx.recv_timeout(timeout) {
            Ok(resolved) => Some(resolved),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::workers::Workers;
    use crate::entities::image_source::tests::MapSource;
    use crate::entities::{Frame, FrameOrigin};
    use std::sync::Mutex;

    /// Deterministic pool: queues jobs, runs them when the test says so.
    /// Honors the epoch like `Workers` does.
    #[derive(Default)]
    pub(crate) struct ManualPool {
        jobs: Mutex<Vec<(u64, Box<dyn FnOnce() + Send>)>>,
        epoch: Mutex<Option<Arc<AtomicU64>>>,
    }

    impl ManualPool {
        pub fn bind_epoch(&self, epoch: Arc<AtomicU64>) {
            *self.epoch.lock().unwrap() = Some(epoch);
        }

        pub fn pending(&self) -> usize {
            self.jobs.lock().unwrap().len()
        }

        /// Run queued jobs of `generation` only, ignoring the epoch check
        pub fn run_generation_unchecked(&self, generation: u64) {
            let jobs: Vec<_> = {
                let mut all = self.jobs.lock().unwrap();
                let (run, keep): (Vec<_>, Vec<_>) = all.drain(..).partition(|(g, _)| *g == generation);
                *all = keep;
                run
            };
            for (_, job) in jobs {
                job();
            }
        }

        /// Run every queued job, skipping stale ones
        pub fn run_all(&self) {
            let jobs: Vec<_> = self.jobs.lock().unwrap().drain(..).collect();
            let current = self.epoch.lock().unwrap().as_ref().map(|e| e.load(Ordering::Relaxed));
            for (generation, job) in jobs {
                if current.is_none_or(|c| c == generation) {
                    job();
                }
            }
        }
    }

    impl WorkerPool for ManualPool {
        fn execute_with_epoch(&self, epoch: u64, f: Box<dyn FnOnce() + Send + 'static>) {
            self.jobs.lock().unwrap().push((epoch, f));
        }
    }

    pub(crate) fn manual_loader(source: MapSource) -> (SequenceLoader, Arc<ManualPool>) {
        let epoch = Arc::new(AtomicU64::new(0));
        let pool = Arc::new(ManualPool::default());
        pool.bind_epoch(Arc::clone(&epoch));
        let policy = AssetPolicy { placeholder_size: 8, ..AssetPolicy::default() };
        let loader = SequenceLoader::new(pool.clone(), Arc::new(source), policy, epoch);
        (loader, pool)
    }

    #[test]
    fn test_one_result_per_slot() {
        let (loader, pool) = manual_loader(MapSource::default());
        let handle = loader.load_sequence("ring", 5);
        assert_eq!(pool.pending(), 5);
        assert!(handle.is_current());

        pool.run_all();
        let mut indices: Vec<usize> = loader.drain().iter().map(|r| r.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_new_load_supersedes_previous() {
        let (loader, pool) = manual_loader(MapSource::default());
        let a = loader.load_sequence("ring", 3);
        let b = loader.load_sequence("necklace", 3);
        assert!(!a.is_current());
        assert!(b.is_current());
        assert_eq!(b.generation(), a.generation() + 1);

        pool.run_all();
        let results = loader.drain();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.generation == b.generation()));
    }

    #[test]
    fn test_cancel_skips_jobs() {
        let (loader, pool) = manual_loader(MapSource::default());
        let handle = loader.load_sequence("ring", 4);
        handle.cancel();
        assert!(!handle.is_current());
        pool.run_all();
        assert!(loader.drain().is_empty());
    }

    #[test]
    fn test_cancel_after_supersede_is_noop() {
        let (loader, _pool) = manual_loader(MapSource::default());
        let a = loader.load_sequence("ring", 1);
        let b = loader.load_sequence("ring", 1);
        a.cancel();
        assert!(b.is_current());
    }

    #[test]
    fn test_with_thread_pool() {
        let epoch = Arc::new(AtomicU64::new(0));
        let workers = Arc::new(Workers::new(2, Arc::clone(&epoch)).unwrap());
        let source = MapSource::default().with("images/ring.jpg", Frame::solid(4, 4, [1, 2, 3, 255]));
        let loader = SequenceLoader::new(workers, Arc::new(source), AssetPolicy::default(), epoch);

        loader.load_sequence("ring", 6);
        let mut got = Vec::new();
        while got.len() < 6 {
            let r = loader.wait(Duration::from_secs(5)).expect("slot result");
            got.push(r);
        }
        assert!(got.iter().all(|r| r.outcome.origin == FrameOrigin::Generic));
    }
}
