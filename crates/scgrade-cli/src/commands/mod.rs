pub mod batch;
pub mod grade;
pub mod init;
pub mod list_methods;
pub mod start;
pub mod stats;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use scgrade_core::config::ScgradeConfig;
use scgrade_core::engine::GradingEngine;
use scgrade_core::model::Question;
use scgrade_core::parser;
use scgrade_core::response::Response;

/// Engine with the built-in strategies and the strings from `config`.
pub fn build_engine(config: &ScgradeConfig) -> GradingEngine {
    GradingEngine::new(scgrade_strategies::default_registry(), config.engine_config())
        .with_strings(Arc::new(config.strings.clone()))
}

/// Parse a question file, warning about anything validation flags.
pub fn load_question(path: &Path, engine: &GradingEngine) -> Result<Question> {
    let question = parser::parse_question(path)?;
    for w in parser::validate_question(&question, engine.registry()) {
        tracing::warn!(question = %question.id, "{}", w.message);
    }
    Ok(question)
}

/// Read a JSON array of responses.
pub fn load_responses(path: &Path) -> Result<Vec<Response>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read responses: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse responses JSON: {}", path.display()))
}
