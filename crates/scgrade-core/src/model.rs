//! Core data model types for scgrade.
//!
//! These are the types every other module shares: rows and their catalog,
//! the scoring method name, outcome states, hints and the question aggregate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GradingError, Result};
use crate::order::Order;

/// Opaque, stable identity of a row. Unique within a question.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Format tag attached to rich content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Html,
    Plain,
    Markdown,
    Moodle,
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextFormat::Html => write!(f, "html"),
            TextFormat::Plain => write!(f, "plain"),
            TextFormat::Markdown => write!(f, "markdown"),
            TextFormat::Moodle => write!(f, "moodle"),
        }
    }
}

impl FromStr for TextFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(TextFormat::Html),
            "plain" | "text" => Ok(TextFormat::Plain),
            "markdown" | "md" => Ok(TextFormat::Markdown),
            "moodle" => Ok(TextFormat::Moodle),
            other => Err(format!("unknown text format: {other}")),
        }
    }
}

/// Text content together with its format tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RichText {
    pub text: String,
    #[serde(default)]
    pub format: TextFormat,
}

impl RichText {
    pub fn new(text: impl Into<String>, format: TextFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextFormat::Plain)
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self::new(text, TextFormat::Html)
    }

    /// Plain-text rendition of this content.
    pub fn to_plain_text(&self) -> String {
        crate::text::html_to_text(&self.text, self.format)
    }
}

/// One candidate statement of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Stable identity.
    pub id: RowId,
    /// 1-based canonical position, unique and contiguous per question.
    pub number: u32,
    /// The statement shown to the learner.
    pub option_text: RichText,
    /// Feedback shown for this row after grading.
    #[serde(default)]
    pub feedback: Option<RichText>,
}

impl Row {
    pub fn new(id: impl Into<RowId>, number: u32, option_text: RichText) -> Self {
        Self {
            id: id.into(),
            number,
            option_text,
            feedback: None,
        }
    }
}

/// The rows of a question definition, in catalog iteration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowCatalog(Vec<Row>);

impl RowCatalog {
    pub fn new(rows: Vec<Row>) -> Self {
        Self(rows)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &RowId) -> Option<&Row> {
        self.0.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.get(id).is_some()
    }

    /// Row identities in catalog order.
    pub fn ids(&self) -> Vec<RowId> {
        self.0.iter().map(|r| r.id.clone()).collect()
    }

    /// Rows sorted by canonical number, ascending.
    pub fn sorted_by_number(&self) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self.0.iter().collect();
        rows.sort_by_key(|r| r.number);
        rows
    }

    pub fn push(&mut self, row: Row) {
        self.0.push(row);
    }

    pub fn retain(&mut self, f: impl FnMut(&Row) -> bool) {
        self.0.retain(f);
    }
}

impl FromIterator<Row> for RowCatalog {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Name of the scoring strategy a question is graded with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringMethod(String);

impl ScoringMethod {
    pub const SCONEZERO: &'static str = "sconezero";
    pub const APRIME: &'static str = "aprime";
    pub const SUBPOINTS: &'static str = "subpoints";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Methods under which crossed-out distractors carry scoring information.
    pub fn is_distractor_aware(&self) -> bool {
        matches!(self.0.as_str(), Self::APRIME | Self::SUBPOINTS)
    }
}

impl Default for ScoringMethod {
    fn default() -> Self {
        Self(Self::SCONEZERO.to_string())
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScoringMethod {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Tolerance applied when mapping a fraction to an outcome state.
pub const FRACTION_EPSILON: f64 = 1e-7;

/// Graded outcome of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeState {
    Correct,
    PartiallyCorrect,
    Incorrect,
}

impl OutcomeState {
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction >= 1.0 - FRACTION_EPSILON {
            OutcomeState::Correct
        } else if fraction <= FRACTION_EPSILON {
            OutcomeState::Incorrect
        } else {
            OutcomeState::PartiallyCorrect
        }
    }
}

impl fmt::Display for OutcomeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeState::Correct => write!(f, "correct"),
            OutcomeState::PartiallyCorrect => write!(f, "partially correct"),
            OutcomeState::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// A hint shown between tries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub text: RichText,
    /// Clear the wrong parts of the response before the next try.
    #[serde(default)]
    pub clear_wrong: bool,
    /// Tell the learner how many answers are correct.
    #[serde(default)]
    pub show_num_correct: bool,
}

impl Hint {
    pub fn new(text: RichText) -> Self {
        Self {
            text,
            clear_wrong: false,
            show_num_correct: false,
        }
    }

    /// A copy of this hint with `clear_wrong` overridden.
    pub fn with_clear_wrong(&self, clear_wrong: bool) -> Self {
        Self {
            clear_wrong,
            ..self.clone()
        }
    }
}

/// A single-choice question with distractors, plus the per-attempt order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub question_text: RichText,
    pub rows: RowCatalog,
    /// Number of the one correct row.
    pub correct_row: u32,
    #[serde(default)]
    pub scoring_method: ScoringMethod,
    #[serde(default = "default_true")]
    pub shuffle_answers: bool,
    pub number_of_rows: usize,
    /// Deduction per extra try.
    #[serde(default)]
    pub penalty: f64,
    #[serde(default)]
    pub hints: Vec<Hint>,
    /// Set when the persisted order had to be rebuilt.
    #[serde(default)]
    pub edited_question: bool,
    #[serde(skip)]
    pub order: Option<Order>,
}

fn default_true() -> bool {
    true
}

impl Question {
    /// Build a question whose `number_of_rows` matches the catalog.
    pub fn new(
        id: impl Into<String>,
        rows: RowCatalog,
        correct_row: u32,
        scoring_method: ScoringMethod,
    ) -> Self {
        let number_of_rows = rows.len();
        Self {
            id: id.into(),
            name: String::new(),
            question_text: RichText::default(),
            rows,
            correct_row,
            scoring_method,
            shuffle_answers: true,
            number_of_rows,
            penalty: 0.0,
            hints: Vec::new(),
            edited_question: false,
            order: None,
        }
    }

    /// The current order, if it has been created or loaded.
    pub fn order(&self) -> Result<&Order> {
        self.order.as_ref().ok_or(GradingError::OrderNotInitialized)
    }

    pub fn is_correct_row(&self, row: &Row) -> bool {
        row.number == self.correct_row
    }

    /// The row shown at `position` under `order`.
    pub fn row_at(&self, order: &Order, position: usize) -> Result<&Row> {
        let row_id = order
            .get(position)
            .ok_or(GradingError::PositionOutOfRange(position))?;
        self.rows.get(row_id).ok_or_else(|| GradingError::UnknownRow {
            position,
            row_id: row_id.clone(),
        })
    }

    /// `(position, row)` pairs in display order.
    pub fn displayed_rows<'a>(&'a self, order: &'a Order) -> Result<Vec<(usize, &'a Row)>> {
        (0..order.len())
            .map(|pos| self.row_at(order, pos).map(|row| (pos, row)))
            .collect()
    }
}
