use std::time::{Duration, Instant};

use crate::error::AttributionError;

/// Cooperative bound on the attribution step, checked between units of work
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn after(limit: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(limit),
        }
    }

    /// A deadline that never expires
    pub fn none() -> Self {
        Self { at: None }
    }

    pub fn is_expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    pub fn check(&self) -> Result<(), AttributionError> {
        if self.is_expired() {
            Err(AttributionError::Timeout)
        } else {
            Ok(())
        }
    }
}
