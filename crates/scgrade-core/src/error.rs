//! Grading error types.
//!
//! These errors describe a broken question or a broken attempt, not a learner
//! mistake. An incomplete response is reported as an ordinary value (see
//! [`crate::engine::GradingEngine::validation_error`]), never through this type.

use thiserror::Error;

use crate::model::RowId;

/// Errors that can occur while ordering, grading or aggregating a question.
#[derive(Debug, Error)]
pub enum GradingError {
    /// The question names a scoring method with no registered strategy.
    #[error("unknown scoring method: {0}")]
    UnknownScoringMethod(String),

    /// Order repair could not fetch a single current row.
    #[error("question {question_id}: expected {expected} rows to rebuild the order, found {found}")]
    NotEnoughRows {
        question_id: String,
        expected: usize,
        found: usize,
    },

    /// Order repair found row numbers that leave a display position empty.
    #[error("question {question_id}: no row fills display position {position}")]
    OrderGap { question_id: String, position: usize },

    /// A grading call arrived before the order was created or loaded.
    #[error("attempt order has not been initialised")]
    OrderNotInitialized,

    /// A display position beyond the end of the order was requested.
    #[error("display position {0} is outside the attempt order")]
    PositionOutOfRange(usize),

    /// The order refers to a row the catalog does not hold.
    #[error("display position {position} refers to unknown row {row_id}")]
    UnknownRow { position: usize, row_id: RowId },

    /// Attempt-level grading was requested before any response was submitted.
    #[error("no response has been submitted for this attempt")]
    NoResponse,

    /// A host collaborator (row source, storage) failed.
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

impl GradingError {
    /// Returns `true` if this error means the question data itself is broken
    /// and the attempt cannot be graded until it is fixed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GradingError::UnknownScoringMethod(_)
                | GradingError::NotEnoughRows { .. }
                | GradingError::OrderGap { .. }
                | GradingError::UnknownRow { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GradingError>;
