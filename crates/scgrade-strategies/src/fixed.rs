//! Fixed-fraction strategy for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use scgrade_core::model::Question;
use scgrade_core::order::Order;
use scgrade_core::response::Response;
use scgrade_core::strategy::ScoringStrategy;

/// A strategy that returns the same fraction for every response, for testing
/// the engine without real scoring rules.
///
/// Registered under any name, so it can stand in for a real method.
pub struct FixedStrategy {
    name: String,
    fraction: f64,
    floor: f64,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last response graded.
    last_response: Mutex<Option<Response>>,
}

impl FixedStrategy {
    pub fn new(name: impl Into<String>, fraction: f64) -> Self {
        Self {
            name: name.into(),
            fraction,
            floor: 0.0,
            call_count: AtomicU32::new(0),
            last_response: Mutex::new(None),
        }
    }

    /// Set the lowest fraction this strategy claims to return.
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    /// Get the number of calls made to this strategy.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last response graded by this strategy.
    pub fn last_response(&self) -> Option<Response> {
        self.last_response
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl ScoringStrategy for FixedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn grade_question(&self, _question: &Question, _order: &Order, response: &Response) -> f64 {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_response.lock() {
            *last = Some(response.clone());
        }
        self.fraction
    }

    fn floor(&self) -> f64 {
        self.floor
    }

    fn description(&self) -> &str {
        "fixed fraction (testing only)"
    }
}
