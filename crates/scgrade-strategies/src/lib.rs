//! scgrade-strategies: built-in scoring strategies.
//!
//! Implements the `ScoringStrategy` trait for the `sconezero`, `aprime` and
//! `subpoints` scoring methods, plus a fixed-fraction strategy for tests.

pub mod aprime;
pub mod fixed;
pub mod sconezero;
pub mod subpoints;
pub mod tally;

use std::sync::Arc;

use scgrade_core::strategy::StrategyRegistry;

pub use aprime::APrime;
pub use fixed::FixedStrategy;
pub use sconezero::SCOneZero;
pub use subpoints::Subpoints;

/// A registry holding every built-in scoring method.
pub fn default_registry() -> StrategyRegistry {
    let registry = StrategyRegistry::new()
        .with(Arc::new(SCOneZero))
        .with(Arc::new(APrime))
        .with(Arc::new(Subpoints));
    tracing::debug!(methods = ?registry.names(), "registered built-in scoring methods");
    registry
}
