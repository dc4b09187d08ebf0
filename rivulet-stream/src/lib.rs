// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Building blocks of a rivulet pipeline.
//!
//! Data flows strictly downstream through four pieces:
//!
//! ```text
//! ClockSource ──▶ OperatorChain ──▶ KeyedFanOut ──┬─▶ processor(key A) ──┐
//!                                                 ├─▶ processor(key B) ──┼─▶ Merge ──▶ on_next
//!                                                 └─▶ processor(key C) ──┘
//! ```
//!
//! - **[`ClockSource`]**: one value per period, tick ids `0, 1, 2, ...`
//! - **[`OperatorChain`]**: ordered `map` / `filter` / `tap` stages, fail-fast
//! - **[`KeyedFanOut`]**: one unbounded queue and one processor task per key,
//!   created on first sight and never evicted
//! - **[`Merge`]**: serializes every processor onto the terminal callbacks
//!
//! # Ordering
//!
//! 1. Emission order from the clock is strictly increasing by tick
//! 2. Within one key, arrival order is preserved through handling and merge
//! 3. Across keys there is no ordering guarantee at the merge point
//!
//! # Errors
//!
//! Generator and map/tap failures are fatal and reach [`Merge::fail`] once.
//! Per-key handler failures are isolated and go to [`Merge::report`].
//!
//! The `rivulet-exec` crate wires these pieces into a `Pipeline` with a
//! subscription lifecycle; use this crate directly to compose them by hand.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;
pub mod clock;
pub mod group_by;
pub mod merge;
pub mod processor;
pub mod stage;

pub use self::clock::ClockSource;
pub use self::group_by::{KeyFn, KeyedFanOut};
pub use self::merge::{ErrorObserver, Merge};
pub use self::processor::KeyHandler;
pub use self::stage::{OperatorChain, OperatorChainExt, Stage};
