//! Response statistics over many learners' responses to one question.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::GradingEngine;
use crate::error::Result;
use crate::model::{OutcomeState, Question, Row, RowId};
use crate::response::Response;

/// Aggregate statistics for one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseStats {
    pub question_id: String,
    /// All responses seen, gradable or not.
    pub total_responses: usize,
    /// Responses that could be graded.
    pub gradable_responses: usize,
    /// Per-row counts, in display order.
    pub rows: Vec<RowStats>,
    /// Outcome state counts over gradable responses.
    pub outcomes: OutcomeCounts,
    /// Mean fraction over gradable responses.
    pub mean_fraction: f64,
}

/// Counts for a single row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowStats {
    pub row_id: RowId,
    pub number: u32,
    pub text: String,
    pub is_correct: bool,
    /// Responses choosing this row.
    pub selected: usize,
    /// Responses crossing this row out.
    pub crossed_out: usize,
    /// `selected` over gradable responses.
    pub selection_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub correct: usize,
    pub partially_correct: usize,
    pub incorrect: usize,
}

impl OutcomeCounts {
    fn record(&mut self, state: OutcomeState) {
        match state {
            OutcomeState::Correct => self.correct += 1,
            OutcomeState::PartiallyCorrect => self.partially_correct += 1,
            OutcomeState::Incorrect => self.incorrect += 1,
        }
    }
}

/// Compute statistics for `responses` to `question` under its current order.
///
/// Selections come from response classification, so a row counts as chosen
/// only when its option is marked exactly 1. Ungradable responses are counted
/// in the total but contribute nothing else. Positions naming a row that no
/// longer exists get no entry in `rows`; a response choosing such a position
/// fails with [`crate::error::GradingError::UnknownRow`].
pub fn compute_response_stats(
    engine: &GradingEngine,
    question: &Question,
    responses: &[Response],
) -> Result<ResponseStats> {
    let order = question.order()?;
    let displayed: Vec<(usize, &Row)> = order
        .iter()
        .filter_map(|(pos, id)| question.rows.get(id).map(|row| (pos, row)))
        .collect();

    let mut selected: HashMap<RowId, usize> = HashMap::new();
    let mut crossed: HashMap<RowId, usize> = HashMap::new();
    let mut outcomes = OutcomeCounts::default();
    let mut fraction_sum = 0.0;
    let mut gradable = 0usize;

    for response in responses {
        if !engine.is_gradable(question, response)? {
            continue;
        }
        gradable += 1;

        for row_id in engine.classify_response(question, response)?.into_keys() {
            *selected.entry(row_id).or_default() += 1;
        }
        for (pos, row) in &displayed {
            if response.is_distractor_marked(*pos) {
                *crossed.entry(row.id.clone()).or_default() += 1;
            }
        }

        let graded = engine.grade_response(question, response)?;
        fraction_sum += graded.fraction;
        outcomes.record(graded.state);
    }

    let rate = |count: usize| {
        if gradable == 0 {
            0.0
        } else {
            count as f64 / gradable as f64
        }
    };

    let rows = displayed
        .iter()
        .map(|(_, row)| {
            let chosen = selected.get(&row.id).copied().unwrap_or(0);
            RowStats {
                row_id: row.id.clone(),
                number: row.number,
                text: row.option_text.to_plain_text(),
                is_correct: question.is_correct_row(row),
                selected: chosen,
                crossed_out: crossed.get(&row.id).copied().unwrap_or(0),
                selection_rate: rate(chosen),
            }
        })
        .collect();

    Ok(ResponseStats {
        question_id: question.id.clone(),
        total_responses: responses.len(),
        gradable_responses: gradable,
        rows,
        outcomes,
        mean_fraction: if gradable == 0 {
            0.0
        } else {
            fraction_sum / gradable as f64
        },
    })
}
