//! All-or-nothing scoring.

use scgrade_core::model::{Question, ScoringMethod};
use scgrade_core::order::Order;
use scgrade_core::response::Response;
use scgrade_core::strategy::ScoringStrategy;

use crate::tally::Tally;

/// Full credit when the correct option is marked, nothing otherwise.
/// Crossed-out rows are ignored.
pub struct SCOneZero;

impl ScoringStrategy for SCOneZero {
    fn name(&self) -> &str {
        ScoringMethod::SCONEZERO
    }

    fn grade_question(&self, question: &Question, order: &Order, response: &Response) -> f64 {
        if Tally::count(question, order, response).correct_selected {
            1.0
        } else {
            0.0
        }
    }

    fn description(&self) -> &str {
        "1 for the correct option, 0 otherwise"
    }
}
