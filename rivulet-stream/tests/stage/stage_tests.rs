// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::StreamExt;
use parking_lot::Mutex;
use rivulet_core::Event;
use rivulet_stream::{OperatorChain, OperatorChainExt, Stage};
use rivulet_test_utils::transactions::{
    above_threshold, amounts_match, expected_scaled, scale, transaction,
};
use rivulet_test_utils::{assert_no_element_emitted, test_channel};
use std::sync::Arc;

fn canonical_chain() -> OperatorChain<Event> {
    OperatorChain::new().filter(above_threshold).map(scale)
}

#[test]
fn test_empty_chain_passes_value_through() -> anyhow::Result<()> {
    // Arrange
    let chain = OperatorChain::<Event>::new();

    // Act
    let output = chain.apply(transaction(2))?;

    // Assert
    assert!(chain.is_empty());
    assert_eq!(output, Some(transaction(2)));
    Ok(())
}

#[test]
fn test_canonical_chain_matches_composition() -> anyhow::Result<()> {
    // Arrange
    let chain = canonical_chain();

    // Act
    let surfaced: Vec<(u64, f64)> = (0..10)
        .filter_map(|tick| chain.apply(transaction(tick)).ok().flatten())
        .map(|event| (event.id(), event.amount()))
        .collect();

    // Assert
    let expected = [(4, 60.0), (5, 75.0), (6, 90.0), (7, 105.0), (8, 120.0), (9, 135.0)];
    assert_eq!(surfaced.len(), expected.len());
    for ((id, amount), (expected_id, expected_amount)) in surfaced.iter().zip(expected) {
        assert_eq!(*id, expected_id);
        assert!(amounts_match(*amount, expected_amount));
    }
    assert_eq!(surfaced.len(), expected_scaled(0..10).len());
    Ok(())
}

#[test]
fn test_stages_run_in_declaration_order() -> anyhow::Result<()> {
    // Arrange
    let trace = Arc::new(Mutex::new(Vec::new()));
    let (first, second) = (trace.clone(), trace.clone());
    let chain = OperatorChain::new()
        .tap(move |_: &Event| first.lock().push("tap"))
        .map(|event: Event| event.with_amount(event.amount() + 1.0))
        .tap(move |event: &Event| {
            if event.amount() > 0.0 {
                second.lock().push("after-map");
            }
        });

    // Act
    chain.apply(Event::new(0, 0.0, "Bank0"))?;

    // Assert
    assert_eq!(*trace.lock(), vec!["tap", "after-map"]);
    Ok(())
}

#[test]
fn test_filter_short_circuits_later_stages() -> anyhow::Result<()> {
    // Arrange
    let taps = Arc::new(Mutex::new(0));
    let counter = taps.clone();
    let chain = canonical_chain().tap(move |_: &Event| *counter.lock() += 1);

    // Act
    let dropped = chain.apply(transaction(3))?;
    let kept = chain.apply(transaction(4))?;

    // Assert
    assert!(dropped.is_none());
    assert!(kept.is_some());
    assert_eq!(*taps.lock(), 1);
    Ok(())
}

#[test]
fn test_map_produces_new_event() -> anyhow::Result<()> {
    // Arrange
    let original = transaction(7);
    let chain = canonical_chain();

    // Act
    let scaled = chain
        .apply(original.clone())?
        .ok_or_else(|| anyhow::anyhow!("filtered"))?;

    // Assert
    assert!(amounts_match(original.amount(), 1050.0));
    assert!(amounts_match(scaled.amount(), 105.0));
    assert_eq!(scaled.origin(), original.origin());
    Ok(())
}

#[test]
fn test_chain_built_from_stage_list() {
    // Arrange
    let chain: OperatorChain<Event> = vec![
        Stage::tap(|_: &Event| {}),
        Stage::filter(above_threshold),
        Stage::map(scale),
    ]
    .into();

    // Assert
    assert_eq!(chain.len(), 3);
    assert_eq!(format!("{chain:?}"), r#"["tap", "filter", "map"]"#);
}

#[tokio::test]
async fn test_apply_chain_over_stream() -> anyhow::Result<()> {
    // Arrange
    let (tx, stream) = test_channel();
    let mut result = Box::pin(stream.apply_chain(canonical_chain()));

    // Act
    for tick in 3..6 {
        tx.send(transaction(tick))?;
    }

    // Assert
    let first = result.next().await.and_then(|item| item.ok());
    let second = result.next().await.and_then(|item| item.ok());
    let (first, second) = first.zip(second).ok_or_else(|| anyhow::anyhow!("no value"))?;
    assert_eq!((first.id(), second.id()), (4, 5));
    assert_no_element_emitted(&mut result, 100).await;
    Ok(())
}
