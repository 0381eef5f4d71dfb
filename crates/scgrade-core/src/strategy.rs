//! Scoring strategy contract and registry.
//!
//! Strategies are looked up by the scoring method name stored on a question.
//! The registry is filled once at start-up; an unregistered name is a
//! configuration error, never a silent fallback.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{GradingError, Result};
use crate::model::{Question, ScoringMethod};
use crate::order::Order;
use crate::response::Response;

/// Turns a response into a fractional grade.
///
/// Implementations must be pure: the same question, order and response always
/// produce the same fraction, within `[floor(), 1.0]`.
pub trait ScoringStrategy: Send + Sync {
    /// Scoring method name this strategy is registered under.
    fn name(&self) -> &str;

    /// Grade `response` against `question` shown in `order`.
    fn grade_question(&self, question: &Question, order: &Order, response: &Response) -> f64;

    /// Lowest fraction this strategy can return.
    fn floor(&self) -> f64 {
        0.0
    }

    /// One-line description for listings.
    fn description(&self) -> &str {
        ""
    }
}

/// Scoring method name → strategy.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn ScoringStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `strategy` under its own name, replacing any previous entry.
    pub fn register(&mut self, strategy: Arc<dyn ScoringStrategy>) -> &mut Self {
        self.strategies
            .insert(strategy.name().to_string(), strategy);
        self
    }

    pub fn with(mut self, strategy: Arc<dyn ScoringStrategy>) -> Self {
        self.register(strategy);
        self
    }

    pub fn resolve(&self, method: &ScoringMethod) -> Result<Arc<dyn ScoringStrategy>> {
        self.strategies
            .get(method.as_str())
            .cloned()
            .ok_or_else(|| GradingError::UnknownScoringMethod(method.to_string()))
    }

    pub fn contains(&self, method: &ScoringMethod) -> bool {
        self.strategies.contains_key(method.as_str())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ScoringStrategy>> {
        self.strategies.values()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("methods", &self.names())
            .finish()
    }
}
