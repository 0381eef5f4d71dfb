//! Scoring with proportional credit for crossed-out distractors.

use scgrade_core::model::{Question, ScoringMethod};
use scgrade_core::order::Order;
use scgrade_core::response::Response;
use scgrade_core::strategy::ScoringStrategy;

use crate::tally::{Choice, Tally};

/// Full credit for the correct option. Without a chosen option, each
/// crossed-out distractor is worth `1 / (n - 1)`, unless the correct row is
/// crossed out too.
pub struct Subpoints;

impl ScoringStrategy for Subpoints {
    fn name(&self) -> &str {
        ScoringMethod::SUBPOINTS
    }

    fn grade_question(&self, question: &Question, order: &Order, response: &Response) -> f64 {
        let tally = Tally::count(question, order, response);
        match tally.choice {
            Choice::Correct => 1.0,
            Choice::Wrong => 0.0,
            Choice::Nothing if tally.correct_crossed => 0.0,
            Choice::Nothing => match tally.distractors() {
                0 => 0.0,
                distractors => tally.distractors_crossed as f64 / distractors as f64,
            },
        }
    }

    fn description(&self) -> &str {
        "1 for the correct option, otherwise a share per distractor crossed out"
    }
}
