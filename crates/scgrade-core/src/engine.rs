//! Central grading engine.
//!
//! Combines the response model with the scoring strategy named on the
//! question, maps fractions to outcome states, and aggregates several tries
//! into one final grade.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Hint, OutcomeState, Question, RowId};
use crate::order::StalenessCheck;
use crate::response::{distractor_field, option_field, Response};
use crate::strategy::{ScoringStrategy, StrategyRegistry};
use crate::traits::{HintSource, LocalizedStrings, StringKey, StringLookup};

/// Runtime settings for the grading engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Separator between rows in a response summary.
    pub summary_delimiter: String,
    /// How persisted orders are checked when an attempt is resumed.
    pub staleness_check: StalenessCheck,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            summary_delimiter: "; ".to_string(),
            staleness_check: StalenessCheck::First,
        }
    }
}

/// Fraction and outcome state of one graded response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradedResponse {
    pub fraction: f64,
    pub state: OutcomeState,
}

/// Analytics entry for one chosen row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedResponse {
    /// Response class identifier: the row id followed by the mark value.
    pub class_id: String,
    /// Plain text of the row.
    pub text: String,
    /// 1.0 for the correct row, 0.0 for any other.
    pub partial_credit: f64,
}

/// The grading engine.
#[derive(Clone)]
pub struct GradingEngine {
    registry: StrategyRegistry,
    strings: Arc<dyn StringLookup>,
    config: EngineConfig,
}

impl GradingEngine {
    pub fn new(registry: StrategyRegistry, config: EngineConfig) -> Self {
        Self {
            registry,
            strings: Arc::new(LocalizedStrings::default()),
            config,
        }
    }

    /// Replace the string lookup used for human-facing literals.
    pub fn with_strings(mut self, strings: Arc<dyn StringLookup>) -> Self {
        self.strings = strings;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn strategy_for(&self, question: &Question) -> Result<Arc<dyn ScoringStrategy>> {
        self.registry.resolve(&question.scoring_method)
    }

    /// Raw strategy fraction for `response`, bounded to the strategy range.
    pub fn grade_question(&self, question: &Question, response: &Response) -> Result<f64> {
        let strategy = self.strategy_for(question)?;
        let order = question.order()?;
        let fraction = strategy.grade_question(question, order, response);
        let floor = strategy.floor();
        if !(floor..=1.0).contains(&fraction) {
            tracing::debug!(
                method = strategy.name(),
                fraction,
                "strategy returned a fraction outside its range"
            );
        }
        Ok(fraction.max(floor).min(1.0))
    }

    /// Grade `response` and map the fraction to an outcome state.
    pub fn grade_response(&self, question: &Question, response: &Response) -> Result<GradedResponse> {
        let fraction = self.grade_question(question, response)?;
        Ok(GradedResponse {
            fraction,
            state: OutcomeState::from_fraction(fraction),
        })
    }

    pub fn is_gradable(&self, question: &Question, response: &Response) -> Result<bool> {
        Ok(response.is_gradable(question.order()?, &question.scoring_method))
    }

    /// `None` if `response` can be graded, otherwise a message for the learner.
    pub fn validation_error(&self, question: &Question, response: &Response) -> Result<Option<String>> {
        if self.is_gradable(question, response)? {
            return Ok(None);
        }
        Ok(Some(self.strings.get_string(StringKey::InvalidResponse)))
    }

    /// Binary per-row credit for every chosen row, keyed by row id.
    pub fn classify_response(
        &self,
        question: &Question,
        response: &Response,
    ) -> Result<BTreeMap<RowId, ClassifiedResponse>> {
        let order = question.order()?;
        let mut parts = BTreeMap::new();
        for (pos, _) in order.iter() {
            if !response.is_row_selected(pos) {
                continue;
            }
            let row = question.row_at(order, pos)?;
            let partial_credit = if question.is_correct_row(row) { 1.0 } else { 0.0 };
            parts.insert(
                row.id.clone(),
                ClassifiedResponse {
                    class_id: format!("{}1", row.id),
                    text: row.option_text.to_plain_text(),
                    partial_credit,
                },
            );
        }
        Ok(parts)
    }

    /// Plain-text summary: chosen rows first, then crossed-out rows.
    ///
    /// Only marked positions are resolved, so an unmarked position naming a
    /// row that no longer exists does not fail the summary.
    pub fn summarize_response(&self, question: &Question, response: &Response) -> Result<String> {
        let order = question.order()?;
        let crossed_out = self.strings.get_string(StringKey::CrossedOut);

        let mut chosen = Vec::new();
        let mut crossed = Vec::new();
        for (pos, _) in order.iter() {
            let is_crossed = response
                .get(&distractor_field(pos))
                .is_some_and(|v| v.is_truthy());
            if !response.is_answered(pos) && !is_crossed {
                continue;
            }
            let text = question.row_at(order, pos)?.option_text.to_plain_text();
            if is_crossed {
                crossed.push(format!("{text} {crossed_out}"));
            }
            if response.is_answered(pos) {
                chosen.push(text);
            }
        }

        chosen.extend(crossed);
        Ok(chosen.join(&self.config.summary_delimiter))
    }

    /// Final grade over all tries: the last try's fraction, minus the
    /// question penalty for every try after the first, never below zero.
    pub fn compute_final_grade(&self, question: &Question, responses: &[Response]) -> Result<f64> {
        let Some(last) = responses.last() else {
            return Ok(0.0);
        };
        let last_index = responses.len() - 1;
        let fraction = self.grade_question(question, last)?;
        Ok((fraction - last_index as f64 * question.penalty).max(0.0))
    }

    /// The hint for `hint_number`, with wrong-answer clearing disabled when
    /// the learner marked more than one choice.
    pub fn get_hint(
        &self,
        hints: &dyn HintSource,
        hint_number: usize,
        selection_count: usize,
    ) -> Option<Hint> {
        let hint = hints.get_base_hint(hint_number)?;
        if selection_count > 1 {
            return Some(hint.with_clear_wrong(false));
        }
        Some(hint)
    }

    /// A response that gets the question right.
    pub fn correct_response(&self, question: &Question) -> Result<Response> {
        let order = question.order()?;
        let mut response = Response::new();
        for (pos, id) in order.iter() {
            let correct = question
                .rows
                .get(id)
                .is_some_and(|row| question.is_correct_row(row));
            response.set(option_field(pos), if correct { 1 } else { 0 });
        }
        Ok(response)
    }
}

impl std::fmt::Debug for GradingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradingEngine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::GradingError;
    use crate::model::{RichText, Row, RowCatalog, ScoringMethod};
    use crate::order::Order;
    use proptest::prelude::*;

    /// Full credit for the correct option, half for crossing out every other
    /// row, nothing otherwise.
    pub(crate) struct TestStrategy(pub &'static str);

    impl ScoringStrategy for TestStrategy {
        fn name(&self) -> &str {
            self.0
        }

        fn grade_question(&self, question: &Question, order: &Order, response: &Response) -> f64 {
            let mut crossed_wrong = 0;
            for (pos, id) in order.iter() {
                let Some(row) = question.rows.get(id) else {
                    continue;
                };
                if response.is_row_selected(pos) {
                    return if question.is_correct_row(row) { 1.0 } else { 0.0 };
                }
                if response.is_distractor_marked(pos) && !question.is_correct_row(row) {
                    crossed_wrong += 1;
                }
            }
            if crossed_wrong + 1 == order.len() {
                0.5
            } else {
                0.0
            }
        }
    }

    pub(crate) fn test_engine() -> GradingEngine {
        let registry = StrategyRegistry::new()
            .with(Arc::new(TestStrategy("sconezero")))
            .with(Arc::new(TestStrategy("aprime")))
            .with(Arc::new(TestStrategy("subpoints")));
        GradingEngine::new(registry, EngineConfig::default())
    }

    /// Four rows, the third one correct, shown in catalog order.
    pub(crate) fn four_row_question(method: &str) -> Question {
        let rows = RowCatalog::new(vec![
            Row::new("rowA", 1, RichText::html("<p>Graz</p>")),
            Row::new("rowB", 2, RichText::plain("Linz")),
            Row::new("rowC", 3, RichText::plain("Vienna")),
            Row::new("rowD", 4, RichText::plain("Salzburg")),
        ]);
        let mut question = Question::new("capitals", rows, 3, ScoringMethod::from(method));
        question.order = Some(Order::load("rowA,rowB,rowC,rowD"));
        question
    }

    #[test]
    fn correct_choice_is_classified_with_full_credit() {
        let engine = test_engine();
        let question = four_row_question("sconezero");
        let response = Response::new().with("option2", 1);

        let parts = engine.classify_response(&question, &response).unwrap();
        assert_eq!(parts.len(), 1);
        let part = &parts[&RowId::from("rowC")];
        assert_eq!(part.class_id, "rowC1");
        assert_eq!(part.text, "Vienna");
        assert_eq!(part.partial_credit, 1.0);
    }

    #[test]
    fn correct_choice_grades_correct_under_every_method() {
        let engine = test_engine();
        for method in ["sconezero", "aprime", "subpoints"] {
            let question = four_row_question(method);
            let graded = engine
                .grade_response(&question, &Response::new().with("option2", 1))
                .unwrap();
            assert_eq!(graded.state, OutcomeState::Correct, "method {method}");
            assert_eq!(graded.fraction, 1.0);
        }
    }

    #[test]
    fn wrong_and_partial_states() {
        let engine = test_engine();
        let question = four_row_question("aprime");

        let wrong = engine
            .grade_response(&question, &Response::new().with("option0", 1))
            .unwrap();
        assert_eq!(wrong.state, OutcomeState::Incorrect);

        let crossed = Response::new()
            .with("distractor0", 1)
            .with("distractor1", 1)
            .with("distractor3", 1);
        let partial = engine.grade_response(&question, &crossed).unwrap();
        assert_eq!(partial.state, OutcomeState::PartiallyCorrect);
    }

    #[test]
    fn wrong_choice_gets_zero_credit_in_classification() {
        let engine = test_engine();
        let question = four_row_question("sconezero");
        let response = Response::new().with("option0", 1).with("option2", 1);
        let parts = engine.classify_response(&question, &response).unwrap();
        assert_eq!(parts[&RowId::from("rowA")].partial_credit, 0.0);
        assert_eq!(parts[&RowId::from("rowA")].text, "Graz");
        assert_eq!(parts[&RowId::from("rowC")].partial_credit, 1.0);
    }

    #[test]
    fn unknown_method_halts_grading() {
        let engine = test_engine();
        let question = four_row_question("mystery");
        let err = engine
            .grade_response(&question, &Response::new().with("option2", 1))
            .unwrap_err();
        assert!(matches!(err, GradingError::UnknownScoringMethod(_)));
    }

    #[test]
    fn grading_requires_an_order() {
        let engine = test_engine();
        let mut question = four_row_question("aprime");
        question.order = None;
        let err = engine
            .grade_response(&question, &Response::new())
            .unwrap_err();
        assert!(matches!(err, GradingError::OrderNotInitialized));
    }

    #[test]
    fn marking_a_missing_row_is_reported() {
        let engine = test_engine();
        let mut question = four_row_question("aprime");
        question.order = Some(Order::load("rowA,ghost"));
        let response = Response::new().with("option1", 1);
        let err = engine.summarize_response(&question, &response).unwrap_err();
        assert!(matches!(err, GradingError::UnknownRow { position: 1, .. }));
        let err = engine.classify_response(&question, &response).unwrap_err();
        assert!(matches!(err, GradingError::UnknownRow { position: 1, .. }));
    }

    #[test]
    fn unmarked_missing_row_does_not_block_reporting() {
        let engine = test_engine();
        let mut question = four_row_question("aprime");
        // A mid-list edit the first-position check lets through
        question.order = Some(Order::load("rowA,ghost,rowC,rowD"));
        let response = Response::new().with("option2", 1).with("distractor3", 1);

        let graded = engine.grade_response(&question, &response).unwrap();
        assert_eq!(graded.state, OutcomeState::Correct);
        assert_eq!(
            engine.summarize_response(&question, &response).unwrap(),
            "Vienna; Salzburg is crossed out"
        );
        let parts = engine.classify_response(&question, &response).unwrap();
        assert_eq!(parts[&RowId::from("rowC")].partial_credit, 1.0);

        let correct = engine.correct_response(&question).unwrap();
        assert!(correct.is_row_selected(2));
        assert_eq!(correct.count_selected_choices(), 1);
    }

    #[test]
    fn validation_message_only_for_ungradable_responses() {
        let engine = test_engine();
        let question = four_row_question("sconezero");
        let distractor_only = Response::new().with("distractor0", 1);

        let message = engine
            .validation_error(&question, &Response::new())
            .unwrap();
        assert!(message.is_some());
        assert!(engine
            .validation_error(&question, &Response::new().with("option1", 1))
            .unwrap()
            .is_none());
        // sconezero does not read distractors, but the mark still completes the response
        assert!(engine
            .validation_error(&question, &distractor_only)
            .unwrap()
            .is_none());
    }

    #[test]
    fn summary_lists_chosen_then_crossed_out_rows() {
        let engine = test_engine();
        let question = four_row_question("aprime");
        let response = Response::new()
            .with("distractor0", 1)
            .with("option2", 1)
            .with("distractor3", 1);
        let summary = engine.summarize_response(&question, &response).unwrap();
        assert_eq!(
            summary,
            "Vienna; Graz is crossed out; Salzburg is crossed out"
        );
    }

    #[test]
    fn summary_of_empty_response_is_empty() {
        let engine = test_engine();
        let question = four_row_question("aprime");
        assert_eq!(
            engine.summarize_response(&question, &Response::new()).unwrap(),
            ""
        );
    }

    #[test]
    fn final_grade_deducts_penalty_per_extra_try() {
        let engine = test_engine();
        let mut question = four_row_question("sconezero");
        question.penalty = 0.1;
        let tries = vec![
            Response::new().with("option0", 1),
            Response::new().with("option1", 1),
            Response::new().with("option2", 1),
        ];
        let grade = engine.compute_final_grade(&question, &tries).unwrap();
        assert!((grade - 0.8).abs() < 1e-9, "got {grade}");
    }

    #[test]
    fn final_grade_never_negative_and_zero_without_tries() {
        let engine = test_engine();
        let mut question = four_row_question("sconezero");
        question.penalty = 0.5;
        assert_eq!(engine.compute_final_grade(&question, &[]).unwrap(), 0.0);

        let tries = vec![Response::new().with("option0", 1); 4];
        assert_eq!(engine.compute_final_grade(&question, &tries).unwrap(), 0.0);

        let first_try = vec![Response::new().with("option2", 1)];
        assert_eq!(engine.compute_final_grade(&question, &first_try).unwrap(), 1.0);
    }

    #[test]
    fn hint_clear_wrong_forced_off_on_over_selection() {
        let engine = test_engine();
        let mut base = Hint::new(RichText::plain("Look at the map"));
        base.clear_wrong = true;
        let hints = vec![base];

        let response = Response::new().with("option0", 1).with("option2", 1);
        let count = response.count_selected_choices();
        assert_eq!(count, 2);

        let hint = engine.get_hint(&hints, 0, count).unwrap();
        assert!(!hint.clear_wrong);
        assert!(hints[0].clear_wrong, "base hint must not be mutated");

        let single = engine.get_hint(&hints, 0, 1).unwrap();
        assert!(single.clear_wrong);
        assert!(engine.get_hint(&hints, 5, 2).is_none());
    }

    #[test]
    fn correct_response_marks_only_the_correct_position() {
        let engine = test_engine();
        let mut question = four_row_question("aprime");
        question.order = Some(Order::load("rowC,rowA,rowD,rowB"));
        let response = engine.correct_response(&question).unwrap();
        assert!(response.is_row_selected(0));
        assert_eq!(response.count_selected_choices(), 1);
        assert_eq!(
            engine.grade_response(&question, &response).unwrap().state,
            OutcomeState::Correct
        );
    }

    proptest! {
        #[test]
        fn regrading_is_idempotent(marks in proptest::collection::vec((0usize..4, any::<bool>()), 0..6)) {
            let engine = test_engine();
            let question = four_row_question("aprime");
            let mut response = Response::new();
            for (pos, option) in marks {
                let key = if option { option_field(pos) } else { distractor_field(pos) };
                response.set(key, 1);
            }
            let first = engine.grade_response(&question, &response).unwrap();
            let second = engine.grade_response(&question, &response).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
