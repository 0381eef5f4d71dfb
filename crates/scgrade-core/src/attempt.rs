//! Attempt lifecycle: order assignment, rehydration and the tries of one
//! learner on one question.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{self, FileAccessRequest, HostFileAccess};
use crate::engine::{GradedResponse, GradingEngine};
use crate::error::{GradingError, Result};
use crate::model::{Hint, Question};
use crate::order::{Order, StalenessCheck};
use crate::response::Response;
use crate::traits::{AttemptStep, RowSource, StepData, ORDER_VAR};

/// What a host needs from a question to run attempts on it.
pub trait QuestionHost {
    /// Create and persist the display order for a new attempt.
    fn start_attempt(&mut self, step: &mut dyn AttemptStep, rng: &mut dyn RngCore) -> Result<()>;

    /// Restore the order persisted in `step`, rebuilding it from `rows` if
    /// the question changed since. Returns `true` when a rebuild happened.
    fn apply_attempt_state(
        &mut self,
        step: &dyn AttemptStep,
        rows: &dyn RowSource,
        check: StalenessCheck,
    ) -> Result<bool>;

    /// Whether a file embedded in this question may be served.
    fn check_file_access(&self, request: &FileAccessRequest, host: &dyn HostFileAccess) -> bool;
}

impl QuestionHost for Question {
    fn start_attempt(&mut self, step: &mut dyn AttemptStep, rng: &mut dyn RngCore) -> Result<()> {
        let order = Order::create(&self.rows, self.shuffle_answers, rng);
        step.set_qt_var(ORDER_VAR, order.persisted());
        self.order = Some(order);
        Ok(())
    }

    fn apply_attempt_state(
        &mut self,
        step: &dyn AttemptStep,
        rows: &dyn RowSource,
        check: StalenessCheck,
    ) -> Result<bool> {
        let persisted = Order::load(step.get_qt_var(ORDER_VAR).unwrap_or_default());
        let (order, repaired) =
            persisted.repair(&self.rows, rows, &self.id, self.number_of_rows, check)?;
        if repaired {
            self.edited_question = true;
        }
        self.order = Some(order);
        Ok(repaired)
    }

    fn check_file_access(&self, request: &FileAccessRequest, host: &dyn HostFileAccess) -> bool {
        access::check_file_access(request, self.edited_question, host)
    }
}

impl Question {
    /// The order, loaded from `step` on first use.
    pub fn init_order(&mut self, step: &dyn AttemptStep) -> Result<&Order> {
        if self.order.is_none() {
            let serialized = step
                .get_qt_var(ORDER_VAR)
                .ok_or(GradingError::OrderNotInitialized)?;
            self.order = Some(Order::load(serialized));
        }
        self.order()
    }
}

/// Where an attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPhase {
    NotStarted,
    OrderAssigned,
    OrderValid,
    OrderRepaired,
    Responding,
    Graded,
}

/// Result of submitting a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Recorded as a new try.
    Accepted,
    /// Identical to the previous try; nothing recorded.
    Unchanged,
    /// Not gradable; nothing recorded.
    Invalid { message: String },
}

/// One learner's attempt at one question.
///
/// Owns its own copy of the question so that order caching and repair never
/// leak into other attempts.
#[derive(Debug, Clone)]
pub struct QuestionAttempt {
    id: Uuid,
    question: Question,
    step: StepData,
    responses: Vec<Response>,
    phase: AttemptPhase,
}

impl QuestionAttempt {
    /// Start a new attempt, assigning a fresh order.
    pub fn start(question: &Question, rng: &mut dyn RngCore) -> Result<Self> {
        let mut question = question.clone();
        let mut step = StepData::new();
        question.start_attempt(&mut step, rng)?;
        let id = Uuid::new_v4();
        tracing::debug!(attempt = %id, question = %question.id, "attempt started");
        Ok(Self {
            id,
            question,
            step,
            responses: Vec::new(),
            phase: AttemptPhase::OrderAssigned,
        })
    }

    /// Rehydrate an attempt from persisted step data.
    pub fn resume(
        question: &Question,
        step: StepData,
        rows: &dyn RowSource,
        check: StalenessCheck,
    ) -> Result<Self> {
        let mut question = question.clone();
        question.order = None;
        let repaired = question.apply_attempt_state(&step, rows, check)?;
        let phase = if repaired {
            AttemptPhase::OrderRepaired
        } else {
            AttemptPhase::OrderValid
        };
        Ok(Self {
            id: Uuid::new_v4(),
            question,
            step,
            responses: Vec::new(),
            phase,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn step(&self) -> &StepData {
        &self.step
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    pub fn order(&self) -> Result<&Order> {
        self.question.order()
    }

    pub fn edited_question(&self) -> bool {
        self.question.edited_question
    }

    /// Record `response` as the next try.
    ///
    /// Fields the order does not expect are dropped first. A response equal
    /// to the previous try, or one that cannot be graded, is not recorded.
    pub fn submit(&mut self, engine: &GradingEngine, mut response: Response) -> Result<SubmitOutcome> {
        let order = self.question.order()?;
        response.retain_expected(order);

        if let Some(previous) = self.responses.last() {
            if previous.is_same_response(&response, order) {
                return Ok(SubmitOutcome::Unchanged);
            }
        }
        if let Some(message) = engine.validation_error(&self.question, &response)? {
            return Ok(SubmitOutcome::Invalid { message });
        }

        self.responses.push(response);
        self.phase = AttemptPhase::Responding;
        tracing::debug!(attempt = %self.id, tries = self.responses.len(), "response recorded");
        Ok(SubmitOutcome::Accepted)
    }

    /// Grade the latest try. Can be repeated.
    pub fn grade(&mut self, engine: &GradingEngine) -> Result<GradedResponse> {
        let last = self.responses.last().ok_or(GradingError::NoResponse)?;
        let graded = engine.grade_response(&self.question, last)?;
        self.phase = AttemptPhase::Graded;
        Ok(graded)
    }

    /// Final grade over every recorded try, penalty applied.
    pub fn final_grade(&self, engine: &GradingEngine) -> Result<f64> {
        engine.compute_final_grade(&self.question, &self.responses)
    }

    /// The hint for `hint_number`, adjusted to the latest try.
    pub fn hint(&self, engine: &GradingEngine, hint_number: usize) -> Option<Hint> {
        let selections = self
            .responses
            .last()
            .map_or(0, Response::count_selected_choices);
        engine.get_hint(&self.question.hints, hint_number, selections)
    }
}
