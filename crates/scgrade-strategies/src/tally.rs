//! Per-response counts shared by the built-in strategies.

use scgrade_core::model::Question;
use scgrade_core::order::Order;
use scgrade_core::response::Response;

/// What the learner chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// No option is marked.
    Nothing,
    /// Only the correct row's option is marked.
    Correct,
    /// At least one wrong option is marked.
    Wrong,
}

/// Marks of one response, counted over the displayed rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    /// Rows shown.
    pub rows: usize,
    pub choice: Choice,
    /// The correct row's option is marked, whatever else is.
    pub correct_selected: bool,
    /// The correct row is crossed out.
    pub correct_crossed: bool,
    /// Wrong rows crossed out.
    pub distractors_crossed: usize,
}

impl Tally {
    /// Count the marks in `response`. Positions naming no known row are
    /// ignored.
    pub fn count(question: &Question, order: &Order, response: &Response) -> Self {
        let mut correct_selected = false;
        let mut wrong_selected = false;
        let mut correct_crossed = false;
        let mut distractors_crossed = 0;

        for (pos, id) in order.iter() {
            let Some(row) = question.rows.get(id) else {
                continue;
            };
            let correct = question.is_correct_row(row);
            if response.is_row_selected(pos) {
                if correct {
                    correct_selected = true;
                } else {
                    wrong_selected = true;
                }
            }
            if response.is_distractor_marked(pos) {
                if correct {
                    correct_crossed = true;
                } else {
                    distractors_crossed += 1;
                }
            }
        }

        let choice = match (correct_selected, wrong_selected) {
            (_, true) => Choice::Wrong,
            (true, false) => Choice::Correct,
            (false, false) => Choice::Nothing,
        };

        Self {
            rows: order.len(),
            choice,
            correct_selected,
            correct_crossed,
            distractors_crossed,
        }
    }

    /// Number of wrong rows shown.
    pub fn distractors(&self) -> usize {
        self.rows.saturating_sub(1)
    }
}
