// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Concurrency tests on a multi-threaded runtime.

use rivulet_core::{Event, LifecycleState};
use rivulet_exec::Pipeline;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_on_next_is_never_invoked_concurrently() -> anyhow::Result<()> {
    // Arrange
    let in_call = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let delivered = Arc::new(AtomicUsize::new(0));
    let flag = in_call.clone();
    let overlap_counter = overlaps.clone();
    let delivered_counter = delivered.clone();

    let pipeline = Pipeline::builder(Duration::from_millis(1), |tick| {
        Event::new(tick, tick as f64, format!("Bank{}", tick % 8))
    })
    .limit(200)
    .group_by(|event: &Event| event.origin().to_string())
    .process(|_: &String, event: Event| {
        std::thread::sleep(Duration::from_micros(200));
        event
    })?;

    // Act
    let subscription = pipeline.subscribe(
        move |_: Event| {
            if flag.swap(true, Ordering::SeqCst) {
                overlap_counter.fetch_add(1, Ordering::SeqCst);
            }
            std::thread::sleep(Duration::from_micros(100));
            flag.store(false, Ordering::SeqCst);
            delivered_counter.fetch_add(1, Ordering::SeqCst);
        },
        |error| panic!("unexpected terminal error: {error}"),
    );
    let state = tokio::time::timeout(Duration::from_secs(30), subscription.closed()).await?;

    // Assert
    assert_eq!(state, LifecycleState::Completed);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(delivered.load(Ordering::SeqCst), 200);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dispose_from_another_thread_stops_delivery() -> anyhow::Result<()> {
    // Arrange
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = delivered.clone();
    let pipeline = Pipeline::builder(Duration::from_millis(1), |tick| {
        Event::new(tick, 1.0, format!("K{}", tick % 4))
    })
    .group_by(|event: &Event| event.origin().to_string())
    .process(|_: &String, event: Event| event)?;
    let subscription = Arc::new(pipeline.subscribe(
        move |_: Event| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
        |_| {},
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Act
    let remote = subscription.clone();
    std::thread::spawn(move || remote.dispose())
        .join()
        .map_err(|_| anyhow::anyhow!("dispose thread panicked"))?;
    let after_dispose = delivered.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Assert
    assert!(after_dispose > 0);
    assert_eq!(delivered.load(Ordering::SeqCst), after_dispose);
    assert_eq!(subscription.state(), LifecycleState::Disposed);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_closed_does_not_park_a_worker_behind_slow_on_next() -> anyhow::Result<()> {
    // Arrange
    let in_callback = Arc::new(AtomicBool::new(false));
    let entered = in_callback.clone();
    let pipeline = Pipeline::builder(Duration::from_millis(1), |tick| {
        Event::new(tick, 1.0, "Bank0")
    })
    .group_by(|event: &Event| event.origin().to_string())
    .process(|_: &String, event: Event| event)?;
    let subscription = Arc::new(pipeline.subscribe(
        move |_: Event| {
            if !entered.swap(true, Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(800));
            }
        },
        |_| {},
    ));
    while !in_callback.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    // Act
    let remote = subscription.clone();
    let disposer = std::thread::spawn(move || remote.dispose());
    while subscription.state() != LifecycleState::Disposed {
        tokio::task::yield_now().await;
    }
    let waiter = subscription.clone();
    let closed = tokio::spawn(async move { waiter.closed().await });
    std::thread::sleep(Duration::from_millis(20));
    let started = Instant::now();
    tokio::spawn(async {}).await?;
    let other_task_latency = started.elapsed();

    // Assert
    assert!(other_task_latency < Duration::from_millis(400));
    assert_eq!(closed.await?, LifecycleState::Disposed);
    disposer
        .join()
        .map_err(|_| anyhow::anyhow!("dispose thread panicked"))?;
    Ok(())
}
