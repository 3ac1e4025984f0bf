//! Fixed-size worker pool for pixel-range tasks.
//!
//! Wraps a dedicated `rayon` thread pool. A batch runs as a scope, so
//! [`WorkerPool::run_batch`] returns only once every task has finished.
//! A task that panics is logged and does not take the batch down.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{RenderError, RenderResult};

pub struct WorkerPool {
    pool: rayon::ThreadPool,
    thread_count: usize,
    pending: AtomicUsize,
}

impl WorkerPool {
    pub fn new(thread_count: usize) -> RenderResult<Self> {
        if thread_count == 0 {
            return Err(RenderError::InvalidThreadCount);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(|i| format!("glint-worker-{i}"))
            .build()?;

        log::debug!("Worker pool started with {} threads", thread_count);
        Ok(Self {
            pool,
            thread_count,
            pending: AtomicUsize::new(0),
        })
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Tasks dispatched but not yet finished.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Run `f` once per task on the pool and block until all complete.
    ///
    /// Returns the number of tasks that panicked.
    pub fn run_batch<T, F>(&self, tasks: Vec<T>, f: F) -> usize
    where
        T: Send,
        F: Fn(T) + Sync,
    {
        let failed = AtomicUsize::new(0);
        self.pending.fetch_add(tasks.len(), Ordering::AcqRel);

        let f = &f;
        let failed_count = &failed;
        let pending = &self.pending;
        self.pool.scope(move |scope| {
            for (index, task) in tasks.into_iter().enumerate() {
                scope.spawn(move |_| {
                    if panic::catch_unwind(AssertUnwindSafe(|| f(task))).is_err() {
                        log::error!("Worker task {} panicked; its pixel range keeps old samples", index);
                        failed_count.fetch_add(1, Ordering::Relaxed);
                    }
                    pending.fetch_sub(1, Ordering::AcqRel);
                });
            }
        });

        failed.into_inner()
    }

    /// Yield until no dispatched task is outstanding.
    pub fn wait(&self) {
        while self.pending() > 0 {
            std::thread::yield_now();
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("thread_count", &self.thread_count)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(RenderError::InvalidThreadCount)));
    }

    #[test]
    fn test_batch_writes_disjoint_chunks() {
        let pool = WorkerPool::new(4).unwrap();
        let mut data = vec![0u32; 100];

        let tasks: Vec<(usize, &mut [u32])> = data.chunks_mut(25).enumerate().collect();
        let failed = pool.run_batch(tasks, |(i, chunk)| {
            for v in chunk.iter_mut() {
                *v = i as u32 + 1;
            }
        });

        assert_eq!(failed, 0);
        assert_eq!(pool.pending(), 0);
        for (i, v) in data.iter().enumerate() {
            assert_eq!(*v, (i / 25) as u32 + 1);
        }
    }

    #[test]
    fn test_panicking_task_is_contained() {
        let pool = WorkerPool::new(2).unwrap();
        let mut data = vec![0u32; 4];

        let tasks: Vec<(usize, &mut [u32])> = data.chunks_mut(1).enumerate().collect();
        let failed = pool.run_batch(tasks, |(i, chunk)| {
            if i == 2 {
                panic!("boom");
            }
            chunk[0] = 7;
        });

        assert_eq!(failed, 1);
        pool.wait();
        assert_eq!(data, vec![7, 7, 0, 7]);
    }
}
