// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core types shared by every rivulet crate: the root error, the event
//! record, cooperative cancellation and the subscription state machine.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;
pub mod cancellation_token;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod rivulet_task;
pub mod stream_item;

pub use self::cancellation_token::{CancellationToken, Cancelled};
pub use self::error::{panic_message, BoxError, IntoRivuletError, Result, RivuletError};
pub use self::event::Event;
pub use self::lifecycle::{Lifecycle, LifecycleState};
pub use self::rivulet_task::RivuletTask;
pub use self::stream_item::StreamItem;
