// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rivulet_exec::{run_all, BoundedExecutor};
use rivulet_test_utils::InjectedError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_results_come_back_in_submission_order() -> anyhow::Result<()> {
    // Arrange
    let tasks: Vec<_> = (0..8u64)
        .map(|i| {
            move || {
                // Later tasks finish first
                std::thread::sleep(Duration::from_millis(40 - i * 5));
                Ok::<_, InjectedError>(i * 10)
            }
        })
        .collect();

    // Act
    let results = run_all(tasks, 8).await?;

    // Assert
    let values: Vec<u64> = results.into_iter().collect::<Result<_, _>>()?;
    assert_eq!(values, vec![0, 10, 20, 30, 40, 50, 60, 70]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pool_size_caps_concurrency() -> anyhow::Result<()> {
    // Arrange
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<_> = (0..12)
        .map(|_| {
            let (running, peak) = (running.clone(), peak.clone());
            move || {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(10));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, InjectedError>(())
            }
        })
        .collect();
    let executor = BoundedExecutor::new(3)?;

    // Act
    let results = executor.run_all(tasks).await?;

    // Assert
    assert_eq!(results.len(), 12);
    assert!(results.iter().all(Result::is_ok));
    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert!(peak.load(Ordering::SeqCst) >= 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_batch_returns_no_results() -> anyhow::Result<()> {
    // Arrange
    let tasks: Vec<fn() -> Result<u8, InjectedError>> = Vec::new();

    // Act
    let results = run_all(tasks, 4).await?;

    // Assert
    assert!(results.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_pool_larger_than_batch() -> anyhow::Result<()> {
    // Arrange
    let executor = BoundedExecutor::new(16)?.with_timeout(Duration::from_secs(5));
    let tasks: Vec<_> = (1..=3u32).map(|i| move || Ok::<_, InjectedError>(i)).collect();

    // Act
    let results = executor.run_all(tasks).await?;

    // Assert
    assert_eq!(executor.pool_size(), 16);
    assert_eq!(executor.timeout(), Some(Duration::from_secs(5)));
    let values: Vec<u32> = results.into_iter().collect::<Result<_, _>>()?;
    assert_eq!(values, vec![1, 2, 3]);
    Ok(())
}
