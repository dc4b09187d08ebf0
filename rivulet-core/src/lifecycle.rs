// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Subscription state machine.
//!
//! ```text
//! Idle ──activate──▶ Active ──┬──complete──▶ Completed
//!                            ├──fail──────▶ Errored
//!                            └──dispose───▶ Disposed
//! ```
//!
//! Every terminal transition is a compare-and-swap out of `Active`, so exactly
//! one caller wins no matter how many tasks race to terminate the pipeline.
//! The winner cancels the shared [`CancellationToken`].

use crate::CancellationToken;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LifecycleState {
    /// Configured but not yet subscribed
    Idle = 0,
    /// Source and processors are running
    Active = 1,
    /// A bounded source finished and every processor drained
    Completed = 2,
    /// A fatal error terminated the run
    Errored = 3,
    /// Cancelled from outside
    Disposed = 4,
}

impl LifecycleState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Active,
            2 => Self::Completed,
            3 => Self::Errored,
            _ => Self::Disposed,
        }
    }

    /// `true` for `Completed`, `Errored` and `Disposed`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored | Self::Disposed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Errored => "errored",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Atomic state cell plus the cancellation token it fires.
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
    cancel: CancellationToken,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Idle as u8),
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    /// Token cancelled by whichever terminal transition wins.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// `Idle → Active`. Returns `false` if the run was already started.
    pub fn activate(&self) -> bool {
        self.transition(LifecycleState::Idle, LifecycleState::Active)
    }

    /// `Active → Completed`.
    pub fn complete(&self) -> bool {
        self.terminate(LifecycleState::Completed)
    }

    /// `Active → Errored`.
    pub fn fail(&self) -> bool {
        self.terminate(LifecycleState::Errored)
    }

    /// `Active → Disposed`, or `Idle → Disposed` for a run never started.
    pub fn dispose(&self) -> bool {
        if self.transition(LifecycleState::Idle, LifecycleState::Disposed) {
            self.cancel.cancel();
            return true;
        }
        self.terminate(LifecycleState::Disposed)
    }

    fn terminate(&self, to: LifecycleState) -> bool {
        let won = self.transition(LifecycleState::Active, to);
        if won {
            debug!("lifecycle transitioned to {}", to);
            self.cancel.cancel();
        }
        won
    }

    fn transition(&self, from: LifecycleState, to: LifecycleState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
