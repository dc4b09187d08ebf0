// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rivulet::RivuletError;
use rivulet_demo::parallel_sum::{checked_total, parallel_sum, partition};

#[test]
fn test_partition_covers_every_element_once() -> anyhow::Result<()> {
    // Act
    let ranges = partition(10, 4)?;

    // Assert
    assert_eq!(ranges, vec![0..2, 2..4, 4..6, 6..10]);
    Ok(())
}

#[test]
fn test_partition_even_split() -> anyhow::Result<()> {
    // Act
    let ranges = partition(12, 3)?;

    // Assert
    assert_eq!(ranges, vec![0..4, 4..8, 8..12]);
    Ok(())
}

#[test]
fn test_partition_more_parts_than_elements() -> anyhow::Result<()> {
    // Act
    let ranges = partition(3, 5)?;

    // Assert
    assert_eq!(ranges.len(), 5);
    assert!(ranges[..4].iter().all(|range| range.is_empty()));
    assert_eq!(ranges[4], 0..3);
    Ok(())
}

#[test]
fn test_partition_rejects_zero_parts() {
    // Act
    let result = partition(10, 0);

    // Assert
    assert!(matches!(result, Err(RivuletError::InvalidConfig { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parallel_sum_default_arguments() -> anyhow::Result<()> {
    // Act
    let total = parallel_sum(10, 4).await?;

    // Assert
    assert_eq!(total, 45);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parallel_sum_matches_closed_form() -> anyhow::Result<()> {
    // Arrange
    let count = 100_003u64;

    // Act
    let total = parallel_sum(count, 7).await?;

    // Assert
    assert_eq!(total, count * (count - 1) / 2);
    Ok(())
}

#[tokio::test]
async fn test_parallel_sum_of_empty_range() -> anyhow::Result<()> {
    // Act
    let total = parallel_sum(0, 3).await?;

    // Assert
    assert_eq!(total, 0);
    Ok(())
}

#[test]
fn test_checked_total_detects_u64_overflow() {
    // Largest count whose sum still fits: n * (n - 1) / 2 <= u64::MAX
    let largest = 6_074_001_000u64;

    assert_eq!(checked_total(10), Some(45));
    assert_eq!(checked_total(0), Some(0));
    assert!(checked_total(largest).is_some());
    assert!(checked_total(largest + 1).is_none());
    assert!(checked_total(u64::MAX).is_none());
}

#[tokio::test]
async fn test_parallel_sum_rejects_overflowing_count() {
    // Act
    let result = parallel_sum(u64::MAX, 4).await;

    // Assert
    assert!(matches!(result, Err(RivuletError::InvalidConfig { .. })));
}
