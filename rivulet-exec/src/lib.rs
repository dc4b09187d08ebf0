// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Running rivulet pipelines.
//!
//! - [`Pipeline`] / [`PipelineBuilder`] / [`build_pipeline`]: configuration
//! - [`Subscription`]: one live run, with `dispose()` and lifecycle queries
//! - [`BoundedExecutor`] / [`run_all`]: fixed-size parallelism for batches of
//!   independent blocking tasks
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──subscribe──▶ Active ──┬── source/stage error ──▶ Errored   (on_error once)
//!                             ├── dispose() / drop ────▶ Disposed  (no callback)
//!                             └── bounded source done ─▶ Completed (on_complete once)
//! ```
//!
//! Every terminal transition cancels the clock task and all per-key
//! processors through one shared token. Cancellation is cooperative: it is
//! observed at the next timer tick or queue dequeue.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;
pub mod pipeline;
pub mod run_all;
pub mod subscription;

pub use self::pipeline::{build_pipeline, GroupedBuilder, Pipeline, PipelineBuilder};
pub use self::run_all::{run_all, BoundedExecutor};
pub use self::subscription::Subscription;
