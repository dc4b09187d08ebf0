// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bounded-parallelism execution of independent blocking tasks.
//!
//! Submit N closures, run at most `pool_size` of them at once on Tokio's
//! blocking pool, and get one result per closure back in submission order.
//! There is no shared state between tasks and no retry.
//!
//! # Example
//!
//! ```
//! use rivulet_exec::run_all;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), rivulet_core::RivuletError> {
//! let tasks: Vec<_> = (0..4u64)
//!     .map(|i| move || Ok::<_, std::io::Error>(i * i))
//!     .collect();
//!
//! let squares: Vec<u64> = run_all(tasks, 2)
//!     .await?
//!     .into_iter()
//!     .collect::<Result<_, _>>()?;
//!
//! assert_eq!(squares, vec![0, 1, 4, 9]);
//! # Ok(())
//! # }
//! ```

use rivulet_core::{BoxError, Result, RivuletError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs blocking tasks with a fixed concurrency cap and an optional deadline.
#[derive(Debug, Clone)]
pub struct BoundedExecutor {
    pool_size: usize,
    timeout: Option<Duration>,
}

impl BoundedExecutor {
    /// # Errors
    ///
    /// Returns [`RivuletError::InvalidConfig`] when `pool_size` is zero.
    pub fn new(pool_size: usize) -> Result<Self> {
        if pool_size == 0 {
            return Err(RivuletError::invalid_config("pool size must be greater than zero"));
        }
        Ok(Self {
            pool_size,
            timeout: None,
        })
    }

    /// Fails the whole batch with [`RivuletError::Timeout`] if it has not
    /// finished within `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Runs every task and waits for all of them.
    ///
    /// The returned vector has one entry per task, in submission order. A task
    /// returning `Err` yields [`RivuletError::UserError`]; a panicking task
    /// yields [`RivuletError::Task`]. One failure never affects the others.
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::Timeout`] when the deadline elapses first.
    /// Tasks still queued are abandoned; tasks already running on the blocking
    /// pool finish in the background.
    pub async fn run_all<T, E, F>(&self, tasks: Vec<F>) -> Result<Vec<Result<T>>>
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let total = tasks.len();
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let mut set = JoinSet::new();

        for (index, task) in tasks.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(permit) => {
                        let outcome = run_blocking(task).await;
                        drop(permit);
                        outcome
                    }
                    Err(_) => Err(RivuletError::Cancelled),
                };
                (index, outcome)
            });
        }
        debug!("run_all started {} tasks on a pool of {}", total, self.pool_size);

        let collect = async {
            let mut results: Vec<Option<Result<T>>> = (0..total).map(|_| None).collect();
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((index, outcome)) => results[index] = Some(outcome),
                    Err(e) => warn!("run_all task did not complete: {}", e),
                }
            }
            results
        };

        let results = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, collect)
                .await
                .map_err(|_| RivuletError::timeout_error(format!("run_all exceeded {limit:?}")))?,
            None => collect.await,
        };

        Ok(results
            .into_iter()
            .map(|outcome| outcome.unwrap_or_else(|| Err(RivuletError::task_error("task aborted"))))
            .collect())
    }
}

async fn run_blocking<T, E, F>(task: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(RivuletError::UserError(e.into())),
        Err(e) => Err(RivuletError::task_error(format!("task panicked: {e}"))),
    }
}

/// Runs `tasks` with at most `pool_size` in flight and no deadline.
///
/// # Errors
///
/// Returns [`RivuletError::InvalidConfig`] when `pool_size` is zero.
pub async fn run_all<T, E, F>(tasks: Vec<F>, pool_size: usize) -> Result<Vec<Result<T>>>
where
    F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    BoundedExecutor::new(pool_size)?.run_all(tasks).await
}
