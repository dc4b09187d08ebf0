// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Failure tests for the bounded executor.

use rivulet_core::RivuletError;
use rivulet_exec::{run_all, BoundedExecutor};
use rivulet_test_utils::InjectedError;
use std::time::Duration;

#[tokio::test]
async fn test_task_error_does_not_affect_others() -> anyhow::Result<()> {
    // Arrange
    let tasks: Vec<_> = (0..4u32)
        .map(|i| {
            move || {
                if i == 2 {
                    Err(InjectedError::new("task 2"))
                } else {
                    Ok(i)
                }
            }
        })
        .collect();

    // Act
    let results = run_all(tasks, 2).await?;

    // Assert
    assert!(matches!(results[0], Ok(0)));
    assert!(matches!(results[1], Ok(1)));
    assert!(matches!(
        &results[2],
        Err(RivuletError::UserError(e)) if e.to_string() == "injected failure: task 2"
    ));
    assert!(matches!(results[3], Ok(3)));
    Ok(())
}

#[tokio::test]
async fn test_panicking_task_reported_as_task_error() -> anyhow::Result<()> {
    // Arrange
    let tasks: Vec<Box<dyn FnOnce() -> Result<u32, InjectedError> + Send>> = vec![
        Box::new(|| -> Result<u32, InjectedError> { Ok(1) }),
        Box::new(|| -> Result<u32, InjectedError> { panic!("worker crashed") }),
        Box::new(|| -> Result<u32, InjectedError> { Ok(3) }),
    ];

    // Act
    let results = run_all(tasks, 1).await?;

    // Assert
    assert!(matches!(results[0], Ok(1)));
    assert!(matches!(results[1], Err(RivuletError::Task { .. })));
    assert!(matches!(results[2], Ok(3)));
    Ok(())
}

#[test]
fn test_zero_pool_size_is_invalid() {
    // Act
    let result = BoundedExecutor::new(0);

    // Assert
    assert!(matches!(result, Err(RivuletError::InvalidConfig { .. })));
}

#[tokio::test]
async fn test_zero_pool_size_via_free_function() {
    // Arrange
    let tasks = vec![|| Ok::<_, InjectedError>(1)];

    // Act
    let result = run_all(tasks, 0).await;

    // Assert
    assert!(matches!(result, Err(RivuletError::InvalidConfig { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_deadline_elapsed_returns_timeout() -> anyhow::Result<()> {
    // Arrange
    let executor = BoundedExecutor::new(1)?.with_timeout(Duration::from_millis(50));
    let tasks: Vec<_> = (0..3)
        .map(|_| {
            || {
                std::thread::sleep(Duration::from_millis(100));
                Ok::<_, InjectedError>(())
            }
        })
        .collect();

    // Act
    let result = executor.run_all(tasks).await;

    // Assert
    assert!(matches!(result, Err(RivuletError::Timeout { .. })));
    Ok(())
}
