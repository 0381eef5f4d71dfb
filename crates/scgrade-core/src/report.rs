//! Attempt report types with JSON persistence and markdown output.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attempt::QuestionAttempt;
use crate::engine::GradingEngine;
use crate::model::{OutcomeState, Question, ScoringMethod};
use crate::response::Response;

/// A graded attempt: every try plus the final grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the question.
    pub question: QuestionSummary,
    /// Persisted order the tries were graded under.
    pub order: String,
    /// Whether the order had to be rebuilt.
    pub edited_question: bool,
    pub tries: Vec<TryRecord>,
    /// Last try's fraction minus penalties.
    pub final_fraction: f64,
}

/// Summary of a question (without its rows).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub id: String,
    pub name: String,
    pub scoring_method: ScoringMethod,
    pub row_count: usize,
    pub penalty: f64,
}

impl From<&Question> for QuestionSummary {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            name: q.name.clone(),
            scoring_method: q.scoring_method.clone(),
            row_count: q.rows.len(),
            penalty: q.penalty,
        }
    }
}

/// One graded try.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TryRecord {
    /// 1-based try number.
    pub number: usize,
    pub response: Response,
    pub fraction: f64,
    pub state: OutcomeState,
    /// Human-readable response summary.
    pub summary: String,
}

impl AttemptReport {
    /// Grade every try in `responses` and build a report.
    pub fn from_responses(
        engine: &GradingEngine,
        question: &Question,
        responses: &[Response],
    ) -> crate::error::Result<Self> {
        let order = question.order()?;
        let tries = responses
            .iter()
            .enumerate()
            .map(|(i, response)| {
                let graded = engine.grade_response(question, response)?;
                Ok(TryRecord {
                    number: i + 1,
                    response: response.clone(),
                    fraction: graded.fraction,
                    state: graded.state,
                    summary: engine.summarize_response(question, response)?,
                })
            })
            .collect::<crate::error::Result<Vec<_>>>()?;

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            question: QuestionSummary::from(question),
            order: order.persisted(),
            edited_question: question.edited_question,
            tries,
            final_fraction: engine.compute_final_grade(question, responses)?,
        })
    }

    /// Report for the tries recorded on `attempt`.
    pub fn from_attempt(engine: &GradingEngine, attempt: &QuestionAttempt) -> crate::error::Result<Self> {
        let mut report = Self::from_responses(engine, attempt.question(), attempt.responses())?;
        report.id = attempt.id();
        Ok(report)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        let title = if self.question.name.is_empty() {
            &self.question.id
        } else {
            &self.question.name
        };
        md.push_str(&format!("## {title}\n\n"));
        md.push_str(&format!(
            "**Method:** {} | **Order:** `{}` | **Final:** {:.1}%\n\n",
            self.question.scoring_method,
            self.order,
            self.final_fraction * 100.0
        ));
        if self.edited_question {
            md.push_str("_The question was edited after this attempt started._\n\n");
        }

        if !self.tries.is_empty() {
            md.push_str("| Try | Response | Fraction | State |\n");
            md.push_str("|-----|----------|----------|-------|\n");
            for t in &self.tries {
                md.push_str(&format!(
                    "| {} | {} | {:.1}% | {} |\n",
                    t.number,
                    t.summary.replace('|', "\\|"),
                    t.fraction * 100.0,
                    t.state
                ));
            }
        }

        md
    }
}
