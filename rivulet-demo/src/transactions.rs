// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The transaction-monitoring pipeline.
//!
//! A clock produces one transaction per tick, `amount = tick * 150` from
//! origin `Bank{tick % origins}`. Transactions above the threshold are
//! converted at a fixed rate and then handled per origin.

use rivulet::{Event, Pipeline, Result, RivuletError};
use std::time::Duration;
use tracing::info;

pub const AMOUNT_PER_TICK: f64 = 150.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub period: Duration,
    pub threshold: f64,
    pub rate: f64,
    pub origins: u64,
    /// Stop after this many ticks; unbounded when `None`.
    pub limit: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            threshold: 500.0,
            rate: 0.1,
            origins: 3,
            limit: None,
        }
    }
}

pub fn generate(tick: u64, origins: u64) -> Event {
    Event::new(tick, tick as f64 * AMOUNT_PER_TICK, format!("Bank{}", tick % origins))
}

/// Builds the monitoring pipeline described by `config`.
///
/// # Errors
///
/// Returns [`RivuletError::InvalidConfig`] when `origins` or the period is
/// zero.
pub fn monitor_pipeline(config: &MonitorConfig) -> Result<Pipeline<Event, String>> {
    if config.origins == 0 {
        return Err(RivuletError::invalid_config("at least one origin is required"));
    }
    let origins = config.origins;
    let threshold = config.threshold;
    let rate = config.rate;

    let mut builder = Pipeline::builder(config.period, move |tick| generate(tick, origins))
        .tap(|event: &Event| {
            info!(id = event.id(), amount = event.amount(), origin = %event.origin(), "generated")
        })
        .filter(move |event: &Event| event.amount() > threshold)
        .map(move |event: Event| event.with_amount(event.amount() * rate));
    if let Some(limit) = config.limit {
        builder = builder.limit(limit);
    }

    builder
        .group_by(|event: &Event| event.origin().to_string())
        .process(|origin: &String, event: Event| {
            info!(%origin, id = event.id(), amount = event.amount(), "processed");
            event
        })
}
