//! Host collaborator traits.
//!
//! The grading core never reaches into a database or a session. Everything it
//! needs from the host is passed in through these traits, which keeps the
//! core testable against small in-memory stand-ins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Hint, RowCatalog, RowId};

// ---------------------------------------------------------------------------
// Row source
// ---------------------------------------------------------------------------

/// Identity and canonical number of a stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRef {
    pub id: RowId,
    pub number: u32,
}

/// Supplies the current rows of a question, used to rebuild stale orders.
pub trait RowSource: Send + Sync {
    /// Fetch up to `limit` rows of `question_id`, sorted by number ascending.
    fn fetch_rows(&self, question_id: &str, limit: usize) -> anyhow::Result<Vec<RowRef>>;
}

impl RowSource for RowCatalog {
    fn fetch_rows(&self, _question_id: &str, limit: usize) -> anyhow::Result<Vec<RowRef>> {
        Ok(self
            .sorted_by_number()
            .into_iter()
            .take(limit)
            .map(|r| RowRef {
                id: r.id.clone(),
                number: r.number,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Attempt step storage
// ---------------------------------------------------------------------------

/// Name of the step variable holding the serialized order.
pub const ORDER_VAR: &str = "_order";

/// Per-step variable storage owned by the host.
pub trait AttemptStep {
    fn get_qt_var(&self, name: &str) -> Option<&str>;
    fn set_qt_var(&mut self, name: &str, value: String);
}

/// In-memory step variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepData {
    vars: BTreeMap<String, String>,
}

impl StepData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step data holding only a persisted order.
    pub fn with_order(serialized: impl Into<String>) -> Self {
        let mut step = Self::new();
        step.set_qt_var(ORDER_VAR, serialized.into());
        step
    }
}

impl AttemptStep for StepData {
    fn get_qt_var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    fn set_qt_var(&mut self, name: &str, value: String) {
        self.vars.insert(name.to_string(), value);
    }
}

// ---------------------------------------------------------------------------
// Hint repository
// ---------------------------------------------------------------------------

/// Supplies the base hint for a try.
pub trait HintSource {
    /// `hint_number` is 0-based.
    fn get_base_hint(&self, hint_number: usize) -> Option<Hint>;
}

impl HintSource for [Hint] {
    fn get_base_hint(&self, hint_number: usize) -> Option<Hint> {
        self.get(hint_number).cloned()
    }
}

impl HintSource for Vec<Hint> {
    fn get_base_hint(&self, hint_number: usize) -> Option<Hint> {
        self.as_slice().get_base_hint(hint_number)
    }
}

// ---------------------------------------------------------------------------
// Localized strings
// ---------------------------------------------------------------------------

/// The human-facing literals the core needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKey {
    /// Shown when a response is not gradable.
    InvalidResponse,
    /// Appended to a crossed-out row in a response summary.
    CrossedOut,
}

/// String lookup owned by the host.
pub trait StringLookup: Send + Sync {
    fn get_string(&self, key: StringKey) -> String;
}

/// English defaults, overridable per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedStrings {
    #[serde(default = "default_invalid_response")]
    pub invalid_response: String,
    #[serde(default = "default_crossed_out")]
    pub crossed_out: String,
}

fn default_invalid_response() -> String {
    "Please select an answer or cross out at least one distractor.".to_string()
}

fn default_crossed_out() -> String {
    "is crossed out".to_string()
}

impl Default for LocalizedStrings {
    fn default() -> Self {
        Self {
            invalid_response: default_invalid_response(),
            crossed_out: default_crossed_out(),
        }
    }
}

impl StringLookup for LocalizedStrings {
    fn get_string(&self, key: StringKey) -> String {
        match key {
            StringKey::InvalidResponse => self.invalid_response.clone(),
            StringKey::CrossedOut => self.crossed_out.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RichText, Row};

    #[test]
    fn catalog_row_source_sorts_and_limits() {
        let catalog = RowCatalog::new(vec![
            Row::new("c", 3, RichText::plain("C")),
            Row::new("a", 1, RichText::plain("A")),
            Row::new("b", 2, RichText::plain("B")),
        ]);
        let rows = catalog.fetch_rows("q", 2).unwrap();
        assert_eq!(
            rows,
            vec![
                RowRef {
                    id: "a".into(),
                    number: 1
                },
                RowRef {
                    id: "b".into(),
                    number: 2
                },
            ]
        );
    }

    #[test]
    fn step_data_holds_order_var() {
        let step = StepData::with_order("3,1,2");
        assert_eq!(step.get_qt_var(ORDER_VAR), Some("3,1,2"));
        assert_eq!(step.get_qt_var("_other"), None);
    }

    #[test]
    fn hint_list_source() {
        let hints = vec![Hint::new(RichText::plain("first"))];
        assert!(hints.get_base_hint(0).is_some());
        assert!(hints.get_base_hint(1).is_none());
    }

    #[test]
    fn localized_strings_defaults_and_overrides() {
        let strings: LocalizedStrings = toml::from_str(r#"crossed_out = "durchgestrichen""#).unwrap();
        assert_eq!(strings.get_string(StringKey::CrossedOut), "durchgestrichen");
        assert!(strings
            .get_string(StringKey::InvalidResponse)
            .starts_with("Please select"));
    }
}
