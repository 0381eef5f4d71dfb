//! Learner responses.
//!
//! A response is the raw mapping of form field → value the host captured.
//! Each display position owns two fields: `option{pos}` (the row was chosen)
//! and `distractor{pos}` (the row was crossed out). Missing fields count as
//! unset.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ScoringMethod;
use crate::order::Order;

/// Keys starting with this marker are host-internal (e.g. `_order`).
pub const INTERNAL_PREFIX: char = '_';

pub fn option_field(position: usize) -> String {
    format!("option{position}")
}

pub fn distractor_field(position: usize) -> String {
    format!("distractor{position}")
}

/// The fields a response to `order` may carry.
pub fn expected_fields(order: &Order) -> Vec<String> {
    order
        .iter()
        .flat_map(|(pos, _)| [option_field(pos), distractor_field(pos)])
        .collect()
}

/// A captured form value.
///
/// Hosts hand over whatever their form layer produced, so booleans, floats
/// and nulls are accepted alongside integers and text and follow loose
/// comparison rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Loose truthiness: `true`, non-zero numbers, and text other than
    /// `""`/`"0"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Int(v) => *v != 0,
            FieldValue::Float(v) => *v != 0.0,
            FieldValue::Text(s) => !s.is_empty() && s != "0",
        }
    }

    /// Whether the value loosely equals the canonical mark `1`.
    pub fn is_one(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Int(v) => *v == 1,
            FieldValue::Float(v) => *v == 1.0,
            FieldValue::Text(s) => s.trim().parse::<f64>().is_ok_and(|v| v == 1.0),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null | FieldValue::Bool(false) => Ok(()),
            FieldValue::Bool(true) => f.write_str("1"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Field name → value, as captured for one try.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Response(BTreeMap<String, FieldValue>);

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `option2=1,distractor0=1` style pairs.
    pub fn parse_pairs(input: &str) -> Result<Self, String> {
        let mut response = Self::new();
        for pair in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got '{pair}'"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("empty field name in '{pair}'"));
            }
            let value = value.trim();
            match value.parse::<i64>() {
                Ok(v) => response.set(key, v),
                Err(_) => response.set(key, value),
            }
        }
        Ok(response)
    }

    /// Drop every field `order` does not expect. Internal fields are kept.
    pub fn retain_expected(&mut self, order: &Order) {
        let expected = expected_fields(order);
        self.0
            .retain(|k, _| k.starts_with(INTERNAL_PREFIX) || expected.contains(k));
    }

    /// `option{position}` is present and truthy.
    pub fn is_answered(&self, position: usize) -> bool {
        self.get(&option_field(position))
            .is_some_and(FieldValue::is_truthy)
    }

    /// `option{position}` is present and exactly 1.
    pub fn is_row_selected(&self, position: usize) -> bool {
        self.get(&option_field(position)).is_some_and(FieldValue::is_one)
    }

    /// `distractor{position}` is present and exactly 1.
    pub fn is_distractor_marked(&self, position: usize) -> bool {
        self.get(&distractor_field(position))
            .is_some_and(FieldValue::is_one)
    }

    /// Some position carries an option or distractor mark.
    pub fn is_complete(&self, order: &Order) -> bool {
        order
            .iter()
            .any(|(pos, _)| self.is_row_selected(pos) || self.is_distractor_marked(pos))
    }

    /// Complete, or, under a distractor-aware method, at least one distractor
    /// is marked.
    pub fn is_gradable(&self, order: &Order, method: &ScoringMethod) -> bool {
        if self.is_complete(order) {
            return true;
        }
        method.is_distractor_aware() && self.any_distractor_marked(order)
    }

    pub fn any_distractor_marked(&self, order: &Order) -> bool {
        order.iter().any(|(pos, _)| self.is_distractor_marked(pos))
    }

    /// Number of truthy, non-internal fields.
    pub fn count_selected_choices(&self) -> usize {
        self.0
            .iter()
            .filter(|(k, v)| !k.is_empty() && !k.starts_with(INTERNAL_PREFIX) && v.is_truthy())
            .count()
    }

    /// Every option and distractor field of `order` is unchanged in `other`.
    pub fn is_same_response(&self, other: &Response, order: &Order) -> bool {
        order.iter().all(|(pos, _)| {
            same_at_key(self, other, &option_field(pos))
                && same_at_key(self, other, &distractor_field(pos))
        })
    }
}

/// Absent on both sides, or present on both with the same string form.
fn same_at_key(a: &Response, b: &Response, key: &str) -> bool {
    match (a.get(key), b.get(key)) {
        (Some(x), Some(y)) => x.to_string() == y.to_string(),
        (None, None) => true,
        _ => false,
    }
}

impl FromIterator<(String, FieldValue)> for Response {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
