// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Rivulet
//!
//! A minimal push-based reactive stream engine. One periodic clock feeds an
//! operator chain; its output is split into lazily created per-key
//! sub-streams, each processed on its own task, and the results are merged
//! back into a single, serialized consumer.
//!
//! ```text
//! clock ─▶ map / filter / tap ─▶ group_by(key) ─▶ per-key handlers ─▶ merge ─▶ on_next
//! ```
//!
//! ## Quick start
//!
//! ```
//! use rivulet::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> Result<(), RivuletError> {
//! let pipeline = Pipeline::builder(Duration::from_millis(100), |tick| {
//!     Event::new(tick, tick as f64 * 150.0, format!("Bank{}", tick % 3))
//! })
//! .filter(|event: &Event| event.amount() > 500.0)
//! .map(|event: Event| event.with_amount(event.amount() * 0.1))
//! .limit(10)
//! .group_by(|event: &Event| event.origin().to_string())
//! .process(|_origin: &String, event: Event| event)?;
//!
//! let subscription = pipeline.subscribe(|event: Event| println!("{event}"), |_| {});
//! assert_eq!(subscription.closed().await, LifecycleState::Completed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - Tick ids are `0, 1, 2, ...` with no gaps
//! - Per-key order is preserved from arrival to `on_next`; there is no order
//!   across keys
//! - `on_next` is never called concurrently
//! - Source and stage failures are fatal and reach `on_error` exactly once;
//!   per-key handler failures are isolated and only reported
//! - After `dispose()` returns, no callback starts
//!
//! ## Limitations
//!
//! Sub-streams are never evicted, so the key space must stay small. There is
//! no backpressure: per-key queues are unbounded and assume consumers keep up.

pub use rivulet_core::{
    BoxError, CancellationToken, Event, IntoRivuletError, LifecycleState, Result, RivuletError,
    StreamItem,
};
pub use rivulet_exec::{
    build_pipeline, run_all, BoundedExecutor, GroupedBuilder, Pipeline, PipelineBuilder,
    Subscription,
};
pub use rivulet_stream::{ClockSource, KeyedFanOut, Merge, OperatorChain, OperatorChainExt, Stage};

/// Prelude module for convenient imports
pub mod prelude {
    pub use rivulet_core::{Event, LifecycleState, RivuletError, StreamItem};
    pub use rivulet_exec::{build_pipeline, run_all, BoundedExecutor, Pipeline, Subscription};
    pub use rivulet_stream::{OperatorChain, OperatorChainExt, Stage};
}
