// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Transaction fixtures.
//!
//! The canonical run: `amount = tick * 150`, `origin = "Bank{tick % 3}"`,
//! filter `amount > 500`, scale `amount * 0.1`. Over ticks `0..10` it
//! surfaces ticks 4 to 9 with amounts 60, 75, 90, 105, 120 and 135.

use rivulet_core::Event;

pub const ORIGINS: u64 = 3;
pub const AMOUNT_PER_TICK: f64 = 150.0;
pub const THRESHOLD: f64 = 500.0;
pub const RATE: f64 = 0.1;

/// Generator of the canonical run.
pub fn transaction(tick: u64) -> Event {
    Event::new(tick, tick as f64 * AMOUNT_PER_TICK, origin_of(tick))
}

pub fn origin_of(tick: u64) -> String {
    format!("Bank{}", tick % ORIGINS)
}

pub fn above_threshold(event: &Event) -> bool {
    event.amount() > THRESHOLD
}

pub fn scale(event: Event) -> Event {
    event.with_amount(event.amount() * RATE)
}

/// Expected `(id, amount)` surfaced by the canonical chain for `ticks`.
pub fn expected_scaled(ticks: std::ops::Range<u64>) -> Vec<(u64, f64)> {
    ticks
        .map(transaction)
        .filter(above_threshold)
        .map(scale)
        .map(|event| (event.id(), event.amount()))
        .collect()
}

/// `true` when two amounts agree to within floating point noise.
pub fn amounts_match(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

/// Error raised on purpose by test closures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("injected failure: {0}")]
pub struct InjectedError(pub String);

impl InjectedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
