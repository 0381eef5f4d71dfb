//! TOML question parser.
//!
//! Loads question definitions from TOML files and directories, and validates
//! them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Hint, Question, RichText, Row, RowCatalog, ScoringMethod, TextFormat};
use crate::order::ORDER_SEPARATOR;
use crate::strategy::StrategyRegistry;

/// Intermediate TOML structure for parsing question files.
#[derive(Debug, Deserialize)]
struct TomlQuestionFile {
    question: TomlQuestionHeader,
    #[serde(default)]
    rows: Vec<TomlRow>,
    #[serde(default)]
    hints: Vec<TomlHint>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestionHeader {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    text_format: Option<String>,
    #[serde(default)]
    scoring_method: Option<String>,
    #[serde(default = "default_true")]
    shuffle_answers: bool,
    correct_row: u32,
    #[serde(default)]
    penalty: f64,
    #[serde(default)]
    number_of_rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct TomlRow {
    #[serde(default)]
    id: Option<String>,
    number: u32,
    text: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlHint {
    text: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    clear_wrong: bool,
    #[serde(default)]
    show_num_correct: bool,
}

fn default_true() -> bool {
    true
}

fn parse_format(format: Option<String>) -> Result<TextFormat> {
    format
        .map(|f| f.parse().map_err(|e: String| anyhow::anyhow!("{}", e)))
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse a single TOML file into a `Question`.
pub fn parse_question(path: &Path) -> Result<Question> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;

    parse_question_str(&content, path)
}

/// Parse a TOML string into a `Question` (useful for testing).
pub fn parse_question_str(content: &str, source_path: &Path) -> Result<Question> {
    let parsed: TomlQuestionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.question;

    let rows = parsed
        .rows
        .into_iter()
        .map(|r| {
            let format = parse_format(r.format)?;
            let id = r.id.unwrap_or_else(|| format!("row{}", r.number));
            Ok(Row {
                id: id.into(),
                number: r.number,
                option_text: RichText::new(r.text, format),
                feedback: r.feedback.map(|f| RichText::new(f, format)),
            })
        })
        .collect::<Result<RowCatalog>>()?;

    let hints = parsed
        .hints
        .into_iter()
        .map(|h| {
            Ok(Hint {
                text: RichText::new(h.text, parse_format(h.format)?),
                clear_wrong: h.clear_wrong,
                show_num_correct: h.show_num_correct,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let scoring_method = header
        .scoring_method
        .map(ScoringMethod::new)
        .unwrap_or_default();

    let mut question = Question::new(header.id, rows, header.correct_row, scoring_method);
    question.name = header.name;
    question.question_text = RichText::new(header.text, parse_format(header.text_format)?);
    question.shuffle_answers = header.shuffle_answers;
    question.penalty = header.penalty;
    question.hints = hints;
    if let Some(n) = header.number_of_rows {
        question.number_of_rows = n;
    }

    Ok(question)
}

/// Recursively load all `.toml` question files from a directory.
pub fn load_question_directory(dir: &Path) -> Result<Vec<Question>> {
    let mut questions = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            questions.extend(load_question_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_question(&path) {
                Ok(question) => questions.push(question),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    questions.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(questions)
}

/// A warning from question validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The row ID (if applicable).
    pub row_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(message: impl Into<String>) -> Self {
        Self {
            row_id: None,
            message: message.into(),
        }
    }

    fn row(row: &Row, message: impl Into<String>) -> Self {
        Self {
            row_id: Some(row.id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a question for common issues.
pub fn validate_question(question: &Question, registry: &StrategyRegistry) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if question.rows.len() < 2 {
        warnings.push(ValidationWarning::question(format!(
            "question needs at least two rows, found {}",
            question.rows.len()
        )));
    }

    // Row identities end up in the persisted order
    let mut seen_ids = HashSet::new();
    for row in question.rows.iter() {
        if !seen_ids.insert(&row.id) {
            warnings.push(ValidationWarning::row(row, format!("duplicate row ID: {}", row.id)));
        }
        if row.id.as_str().contains(ORDER_SEPARATOR) || row.id.as_str().is_empty() {
            warnings.push(ValidationWarning::row(
                row,
                format!("row ID must be non-empty and must not contain '{ORDER_SEPARATOR}'"),
            ));
        }
        if row.option_text.to_plain_text().is_empty() {
            warnings.push(ValidationWarning::row(row, "option text is empty"));
        }
    }

    let mut seen_numbers = HashSet::new();
    for row in question.rows.iter() {
        if !seen_numbers.insert(row.number) {
            warnings.push(ValidationWarning::row(
                row,
                format!("duplicate row number: {}", row.number),
            ));
        }
    }
    for number in 1..=question.rows.len() as u32 {
        if !seen_numbers.contains(&number) {
            warnings.push(ValidationWarning::question(format!(
                "row numbers are not contiguous: {number} is missing"
            )));
        }
    }

    if !question.rows.iter().any(|r| r.number == question.correct_row) {
        warnings.push(ValidationWarning::question(format!(
            "correct_row {} does not name a row",
            question.correct_row
        )));
    }

    if question.number_of_rows != question.rows.len() {
        warnings.push(ValidationWarning::question(format!(
            "number_of_rows is {} but {} rows are defined",
            question.number_of_rows,
            question.rows.len()
        )));
    }

    if !(0.0..=1.0).contains(&question.penalty) {
        warnings.push(ValidationWarning::question(format!(
            "penalty {} is outside [0, 1]",
            question.penalty
        )));
    }

    if !registry.contains(&question.scoring_method) {
        warnings.push(ValidationWarning::question(format!(
            "unknown scoring method: {} (registered: {})",
            question.scoring_method,
            registry.names().join(", ")
        )));
    }

    warnings
}
