// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt;

/// Immutable unit of data flowing through a pipeline.
///
/// `id` is the clock tick that produced the event, `amount` is the value the
/// operator chain transforms and `origin` is the grouping key. A transformed
/// event is always a new value: [`with_amount`](Self::with_amount) leaves the
/// receiver untouched.
///
/// ```
/// use rivulet_core::Event;
///
/// let original = Event::new(7, 1050.0, "Bank1");
/// let converted = original.with_amount(original.amount() * 0.1);
///
/// assert_eq!(original.amount(), 1050.0);
/// assert!((converted.amount() - 105.0).abs() < 1e-9);
/// assert_eq!(converted.id(), 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    id: u64,
    amount: f64,
    origin: String,
}

impl Event {
    pub fn new(id: u64, amount: f64, origin: impl Into<String>) -> Self {
        Self {
            id,
            amount,
            origin: origin.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns a copy of this event carrying `amount`.
    #[must_use]
    pub fn with_amount(&self, amount: f64) -> Self {
        Self {
            id: self.id,
            amount,
            origin: self.origin.clone(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event{{id={}, amount={}, origin='{}'}}",
            self.id, self.amount, self.origin
        )
    }
}
