// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Handler failure isolation tests.

use parking_lot::Mutex;
use rivulet_core::{Event, Lifecycle, RivuletError};
use rivulet_stream::{ErrorObserver, KeyedFanOut, Merge};
use rivulet_test_utils::transactions::transaction;
use rivulet_test_utils::{InjectedError, Recorder};
use std::sync::Arc;

fn observed_merge(
    recorder: &Recorder<Event>,
    failures: Arc<Mutex<Vec<String>>>,
) -> Arc<Merge<Event>> {
    let lifecycle = Arc::new(Lifecycle::new());
    lifecycle.activate();
    let on_error = |_: RivuletError| panic!("handler failures are not fatal");
    let observer: ErrorObserver = Arc::new(move |e: &RivuletError| {
        failures.lock().push(e.to_string());
    });
    let merge =
        Merge::new(lifecycle, recorder.sink(), on_error).with_error_observer(Some(observer));
    Arc::new(merge)
}

#[tokio::test]
async fn test_handler_failure_is_isolated_to_one_event() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let failures = Arc::new(Mutex::new(Vec::new()));
    let merge = observed_merge(&recorder, failures.clone());
    let cancel = merge.lifecycle().token();
    let mut fan_out = KeyedFanOut::from_fns(
        |event: &Event| event.origin().to_string(),
        |_: &String, event: Event| {
            if event.id() == 4 {
                Err(InjectedError::new("tick 4"))
            } else {
                Ok(event)
            }
        },
        merge.clone(),
        cancel,
    );

    // Act
    for tick in 0..12 {
        fan_out.route(transaction(tick));
    }
    fan_out.close().await;

    // Assert
    let ids: Vec<u64> = recorder.values().iter().map(Event::id).collect();
    assert_eq!(ids.len(), 11);
    assert!(!ids.contains(&4));
    let bank1: Vec<u64> = recorder
        .values()
        .iter()
        .filter(|event| event.origin() == "Bank1")
        .map(Event::id)
        .collect();
    assert_eq!(bank1, vec![1, 7, 10]);

    let failures = failures.lock();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("\"Bank1\""));
    assert!(merge.lifecycle().is_active());
    Ok(())
}

#[tokio::test]
async fn test_handler_panic_is_reported_not_propagated() -> anyhow::Result<()> {
    // Arrange
    let recorder = Recorder::new();
    let failures = Arc::new(Mutex::new(Vec::new()));
    let merge = observed_merge(&recorder, failures.clone());
    let cancel = merge.lifecycle().token();
    let mut fan_out = KeyedFanOut::from_fns(
        |event: &Event| event.id() % 2,
        |_: &u64, event: Event| -> Result<Event, InjectedError> {
            if event.id() == 2 {
                panic!("handler blew up");
            }
            Ok(event)
        },
        merge.clone(),
        cancel,
    );

    // Act
    for tick in 0..6 {
        fan_out.route(transaction(tick));
    }
    fan_out.close().await;

    // Assert
    let even: Vec<u64> = recorder
        .values()
        .iter()
        .map(Event::id)
        .filter(|id| id % 2 == 0)
        .collect();
    assert_eq!(even, vec![0, 4]);
    assert_eq!(recorder.len(), 5);
    let failures = failures.lock();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("handler blew up"));
    Ok(())
}
