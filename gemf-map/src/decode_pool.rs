//! Worker pool running tile decoding in parallel.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::MapError;

/// Runs batches of independent jobs on worker threads.
///
/// Every batch is joined before [`DecodePool::run`] returns, the results keep the order of the
/// submitted jobs.
#[derive(Debug, Default)]
pub struct DecodePool {
    pool: Option<ThreadPool>,
}

impl DecodePool {
    /// Pool backed by the global rayon thread pool.
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Pool with its own `threads` worker threads. Zero lets rayon choose the number.
    pub fn with_threads(threads: usize) -> Result<Self, MapError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("tile-decode-{index}"))
            .build()?;

        Ok(Self { pool: Some(pool) })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Applies `f` to every job in parallel and waits for all of them.
    pub fn run<J, R, F>(&self, jobs: Vec<J>, f: F) -> Vec<R>
    where
        J: Send,
        R: Send,
        F: Fn(J) -> R + Send + Sync,
    {
        if jobs.is_empty() {
            return vec![];
        }

        match &self.pool {
            Some(pool) => pool.install(|| jobs.into_par_iter().map(f).collect()),
            None => jobs.into_par_iter().map(f).collect(),
        }
    }
}
