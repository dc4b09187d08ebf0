// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the rivulet stream engine
//!
//! A single root [`RivuletError`] covers every failure a pipeline can observe.
//! Errors fall into two families:
//!
//! - **Fatal** ([`Source`](RivuletError::Source), [`Stage`](RivuletError::Stage)):
//!   the generator or a map/tap stage failed. The pipeline tears down and the
//!   terminal `on_error` callback fires exactly once.
//! - **Isolated** ([`Handler`](RivuletError::Handler)): a per-key handler failed
//!   for one event. The failure is reported through the side channel and the
//!   stream keeps running.
//!
//! [`Cancelled`](RivuletError::Cancelled) is orderly shutdown and is never
//! delivered to `on_error`.
//!
//! # Examples
//!
//! ```
//! use rivulet_core::{RivuletError, Result};
//!
//! fn validate(amount: f64) -> Result<f64> {
//!     if amount.is_nan() {
//!         return Err(RivuletError::invalid_config("amount is NaN"));
//!     }
//!     Ok(amount)
//! }
//!
//! assert!(validate(f64::NAN).is_err());
//! ```

use std::any::Any;

/// Boxed error produced by user-supplied closures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Root error type for all rivulet operations
#[derive(Debug, thiserror::Error)]
pub enum RivuletError {
    /// The clock source's generator failed.
    ///
    /// Fatal: no further ticks are produced after this error.
    #[error("Source error at tick {tick}: {source}")]
    Source {
        /// Tick the generator was evaluating
        tick: u64,
        /// Underlying generator failure
        #[source]
        source: BoxError,
    },

    /// A map or tap stage of the operator chain failed.
    ///
    /// Fatal: the event is not emitted and the pipeline terminates.
    #[error("Stage error in {kind} stage #{index}: {source}")]
    Stage {
        /// Position of the stage in declaration order
        index: usize,
        /// Stage variant name (`map` or `tap`)
        kind: &'static str,
        /// Underlying stage failure
        #[source]
        source: BoxError,
    },

    /// A per-key handler failed for a single event.
    ///
    /// Isolated: processing of later events continues for every key.
    #[error("Handler error for key {key}: {source}")]
    Handler {
        /// Debug rendering of the sub-stream key
        key: String,
        /// Underlying handler failure
        #[source]
        source: BoxError,
    },

    /// Orderly shutdown.
    #[error("Pipeline cancelled")]
    Cancelled,

    /// A configuration value was rejected.
    #[error("Invalid configuration: {context}")]
    InvalidConfig {
        /// What was wrong with the configuration
        context: String,
    },

    /// A spawned task panicked or was aborted.
    #[error("Task failed: {context}")]
    Task {
        /// Description of the task failure
        context: String,
    },

    /// A deadline elapsed before the work completed.
    #[error("Timeout error: {context}")]
    Timeout {
        /// Context about the timeout (e.g. duration)
        context: String,
    },

    /// Custom error from user code
    #[error("User error: {0}")]
    UserError(#[source] BoxError),
}

impl RivuletError {
    /// Wrap a generator failure at `tick`
    pub fn source_error(tick: u64, error: impl Into<BoxError>) -> Self {
        Self::Source {
            tick,
            source: error.into(),
        }
    }

    /// Wrap a failure of the stage at `index`
    pub fn stage_error(index: usize, kind: &'static str, error: impl Into<BoxError>) -> Self {
        Self::Stage {
            index,
            kind,
            source: error.into(),
        }
    }

    /// Wrap a per-key handler failure
    pub fn handler_error(key: impl Into<String>, error: impl Into<BoxError>) -> Self {
        Self::Handler {
            key: key.into(),
            source: error.into(),
        }
    }

    /// Create an invalid configuration error with the given context
    pub fn invalid_config(context: impl Into<String>) -> Self {
        Self::InvalidConfig {
            context: context.into(),
        }
    }

    /// Create a task failure error with the given context
    pub fn task_error(context: impl Into<String>) -> Self {
        Self::Task {
            context: context.into(),
        }
    }

    /// Create a timeout error with the given context
    pub fn timeout_error(context: impl Into<String>) -> Self {
        Self::Timeout {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Check if this error terminates the whole pipeline
    ///
    /// Only source and stage failures are fatal. Handler failures are
    /// contained to the event that produced them.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Source { .. } | Self::Stage { .. })
    }

    /// Check if this error represents orderly shutdown
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Specialized Result type for rivulet operations
pub type Result<T> = std::result::Result<T, RivuletError>;

/// Extension trait for converting errors into `RivuletError`
///
/// Implemented for every `std::error::Error + Send + Sync + 'static`.
pub trait IntoRivuletError {
    /// Convert this error into a `RivuletError`
    fn into_rivulet(self) -> RivuletError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoRivuletError for E {
    fn into_rivulet(self) -> RivuletError {
        RivuletError::user_error(self)
    }
}

/// Message of a payload caught by `catch_unwind`.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
