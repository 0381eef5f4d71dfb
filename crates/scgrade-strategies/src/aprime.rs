//! Scoring with half credit for all but one distractor crossed out.

use scgrade_core::model::{Question, ScoringMethod};
use scgrade_core::order::Order;
use scgrade_core::response::Response;
use scgrade_core::strategy::ScoringStrategy;

use crate::tally::{Choice, Tally};

/// Full credit for the correct option. Without a chosen option, crossing out
/// every distractor is worth 1 and all but one is worth 0.5. Crossing out the
/// correct row, or choosing a wrong option, is worth nothing.
pub struct APrime;

impl ScoringStrategy for APrime {
    fn name(&self) -> &str {
        ScoringMethod::APRIME
    }

    fn grade_question(&self, question: &Question, order: &Order, response: &Response) -> f64 {
        let tally = Tally::count(question, order, response);
        match tally.choice {
            Choice::Correct => 1.0,
            Choice::Wrong => 0.0,
            Choice::Nothing if tally.correct_crossed => 0.0,
            Choice::Nothing => {
                let crossed = tally.distractors_crossed;
                let distractors = tally.distractors();
                if crossed == 0 {
                    0.0
                } else if crossed == distractors {
                    1.0
                } else if crossed + 1 == distractors {
                    0.5
                } else {
                    0.0
                }
            }
        }
    }

    fn description(&self) -> &str {
        "1 for the correct option or all distractors crossed out, 0.5 for all but one"
    }
}
