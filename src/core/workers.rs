//! Background thread pool for frame resolution.
//!
//! Work-stealing deques (crossbeam): jobs enter a global injector, idle
//! workers drain their own deque, then the injector, then steal from peers.
//!
//! The pool shares the loader's epoch counter. A job submitted with
//! `execute_with_epoch` is dropped at execution time if a newer sequence load
//! has bumped the epoch, so superseded loads stop consuming decode time.

use crossbeam::deque::{Injector, Worker};
use log::trace;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::entities::WorkerPool;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Idle poll interval when no work is queued
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// Upper bound for waiting on threads in `Drop`
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

pub struct Workers {
    injector: Arc<Injector<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    current_epoch: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
}

impl Workers {
    /// Spawn `num_threads` workers (at least one) sharing `epoch`.
    ///
    /// Recommended: `Workers::default_threads()`.
    pub fn new(num_threads: usize, epoch: Arc<AtomicU64>) -> io::Result<Self> {
        let num_threads = num_threads.max(1);
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let locals: Vec<Worker<Job>> = (0..num_threads).map(|_| Worker::new_fifo()).collect();
        let stealers: Vec<_> = locals.iter().map(|w| w.stealer()).collect();

        let mut handles = Vec::with_capacity(num_threads);
        for (worker_id, local) in locals.into_iter().enumerate() {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);
            let stealers = stealers.clone();

            let handle = thread::Builder::new()
                .name(format!("turntable-loader-{}", worker_id))
                .spawn(move || {
                    trace!("Worker {} started", worker_id);
                    loop {
                        let job = local
                            .pop()
                            .or_else(|| injector.steal_batch_and_pop(&local).success())
                            .or_else(|| stealers.iter().find_map(|s| s.steal().success()));

                        if let Some(job) = job {
                            job();
                            continue;
                        }
                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }
                        thread::sleep(IDLE_SLEEP);
                    }
                    trace!("Worker {} stopped", worker_id);
                })?;
            handles.push(handle);
        }

        trace!("Workers initialized: {} threads", num_threads);

        Ok(Self {
            injector,
            handles,
            current_epoch: epoch,
            shutdown,
        })
    }

    /// 75% of CPU cores for loaders, 25% for the UI thread
    pub fn default_threads() -> usize {
        (num_cpus::get() * 3 / 4).max(1)
    }

    pub fn num_threads(&self) -> usize {
        self.handles.len()
    }

    /// Run closure only if `epoch` is still current when a worker picks it up
    pub fn execute_with_epoch<F>(&self, epoch: u64, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let current_epoch = Arc::clone(&self.current_epoch);
        self.injector.push(Box::new(move || {
            if current_epoch.load(Ordering::Relaxed) == epoch {
                f();
            } else {
                trace!("Skipping stale job (epoch {})", epoch);
            }
        }));
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);
        self.shutdown.store(true, Ordering::SeqCst);

        let deadline = Instant::now() + SHUTDOWN_TIMEOUT;
        for handle in std::mem::take(&mut self.handles) {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, detaching remaining workers");
                    return;
                }
                thread::sleep(IDLE_SLEEP);
            }
            let _ = handle.join();
        }
        trace!("All {} workers stopped", num_threads);
    }
}

impl WorkerPool for Workers {
    fn execute_with_epoch(&self, epoch: u64, f: Box<dyn FnOnce() + Send + 'static>) {
        Workers::execute_with_epoch(self, epoch, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn wait_for(counter: &AtomicUsize, expected: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if counter.load(Ordering::SeqCst) == expected {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn test_current_epoch_runs_all_jobs() {
        let workers = Workers::new(3, Arc::new(AtomicU64::new(0))).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..50 {
            let c = Arc::clone(&counter);
            workers.execute_with_epoch(0, move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(wait_for(&counter, 50));
    }

    #[test]
    fn test_stale_epoch_skipped() {
        let epoch = Arc::new(AtomicU64::new(7));
        let workers = Workers::new(1, Arc::clone(&epoch)).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        // Stale: epoch 6 != 7
        let c = Arc::clone(&counter);
        workers.execute_with_epoch(6, move || {
            c.fetch_add(100, Ordering::SeqCst);
        });
        // Current
        let c = Arc::clone(&counter);
        workers.execute_with_epoch(7, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(wait_for(&counter, 1));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_threads_clamped() {
        let workers = Workers::new(0, Arc::new(AtomicU64::new(0))).unwrap();
        assert_eq!(workers.num_threads(), 1);
    }

    #[test]
    fn test_default_threads_leaves_headroom() {
        let threads = Workers::default_threads();
        assert!(threads >= 1);
        assert!(threads <= num_cpus::get().max(1));
    }
}
