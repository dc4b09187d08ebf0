// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Generator failure tests for the clock source.

use futures::StreamExt;
use rivulet_core::{CancellationToken, RivuletError, StreamItem};
use rivulet_stream::ClockSource;
use rivulet_test_utils::InjectedError;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_generator_failure_is_last_item() -> anyhow::Result<()> {
    // Arrange
    let source = ClockSource::try_new(Duration::from_millis(100), |tick| {
        if tick == 2 {
            Err(InjectedError::new("generator"))
        } else {
            Ok(tick * 150)
        }
    });

    // Act
    let items: Vec<StreamItem<u64>> = source.ticks(CancellationToken::new()).collect().await;

    // Assert
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], StreamItem::Value(0));
    assert_eq!(items[1], StreamItem::Value(150));
    assert!(matches!(
        &items[2],
        StreamItem::Error(RivuletError::Source { tick: 2, .. })
    ));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_source_error_is_fatal_and_names_tick() {
    // Arrange
    let source = ClockSource::<u64>::try_new(Duration::from_millis(10), |_| {
        Err(InjectedError::new("always"))
    });

    // Act
    let mut ticks = Box::pin(source.ticks(CancellationToken::new()));
    let first = ticks.next().await;

    // Assert
    let err = first
        .and_then(|item| match item {
            StreamItem::Error(e) => Some(e),
            StreamItem::Value(_) => None,
        })
        .expect("generator error expected");
    assert!(err.is_fatal());
    assert_eq!(
        err.to_string(),
        "Source error at tick 0: injected failure: always"
    );
}
