//! Per-attempt display order.
//!
//! An [`Order`] maps a display position to a row identity. It is created once
//! when an attempt starts, persisted as a comma-joined list of identities, and
//! only ever changed again by [`Order::repair`] when the question was edited
//! after the attempt began.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GradingError, Result};
use crate::model::{RowCatalog, RowId};
use crate::traits::RowSource;

/// Separator used in the persisted form.
pub const ORDER_SEPARATOR: char = ',';

/// How much of a persisted order is checked against the current catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalenessCheck {
    /// Only the first position is checked. Misses edits further down the list.
    #[default]
    First,
    /// Every position must name a current row.
    Full,
}

impl std::str::FromStr for StalenessCheck {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(StalenessCheck::First),
            "full" => Ok(StalenessCheck::Full),
            other => Err(format!("unknown staleness check: {other}")),
        }
    }
}

/// Display position → row identity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order(Vec<RowId>);

impl Order {
    pub fn new(ids: Vec<RowId>) -> Self {
        Self(ids)
    }

    /// Create the order for a new attempt.
    ///
    /// Without shuffling the catalog iteration order is kept; with shuffling
    /// the result is a uniformly random permutation of it.
    pub fn create<R: Rng + ?Sized>(catalog: &RowCatalog, shuffle: bool, rng: &mut R) -> Self {
        let mut ids = catalog.ids();
        if shuffle {
            ids.shuffle(rng);
        }
        tracing::debug!(rows = ids.len(), shuffle, "created attempt order");
        Self(ids)
    }

    /// Parse a persisted order. An empty string yields an empty order.
    pub fn load(serialized: &str) -> Self {
        if serialized.is_empty() {
            return Self::default();
        }
        let order = Self(serialized.split(ORDER_SEPARATOR).map(RowId::from).collect());
        tracing::debug!(rows = order.len(), "loaded attempt order");
        order
    }

    /// The persisted form: identities joined by [`ORDER_SEPARATOR`].
    pub fn persisted(&self) -> String {
        self.to_string()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&RowId> {
        self.0.get(position)
    }

    pub fn first(&self) -> Option<&RowId> {
        self.0.first()
    }

    /// `(position, row id)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RowId)> {
        self.0.iter().enumerate()
    }

    pub fn ids(&self) -> &[RowId] {
        &self.0
    }

    pub fn position_of(&self, id: &RowId) -> Option<usize> {
        self.0.iter().position(|r| r == id)
    }

    /// Whether this order no longer matches `catalog`.
    ///
    /// An empty order is always stale.
    pub fn is_stale(&self, catalog: &RowCatalog, check: StalenessCheck) -> bool {
        match check {
            StalenessCheck::First => !self.first().is_some_and(|id| catalog.contains(id)),
            StalenessCheck::Full => self.is_empty() || self.0.iter().any(|id| !catalog.contains(id)),
        }
    }

    /// Rebuild an order from the current rows, placing each row at
    /// `number - 1`.
    ///
    /// A source holding fewer than `number_of_rows` rows yields a shorter
    /// order. No rows at all, or numbers that leave a position empty, are
    /// integrity errors.
    pub fn rebuild(source: &dyn RowSource, question_id: &str, number_of_rows: usize) -> Result<Self> {
        let rows = source.fetch_rows(question_id, number_of_rows)?;
        if rows.is_empty() {
            return Err(GradingError::NotEnoughRows {
                question_id: question_id.to_string(),
                expected: number_of_rows,
                found: 0,
            });
        }
        if rows.len() < number_of_rows {
            tracing::warn!(
                question_id,
                expected = number_of_rows,
                found = rows.len(),
                "rebuilding order from fewer rows than the question declares"
            );
        }

        let mut slots: Vec<Option<RowId>> = vec![None; rows.len()];
        for row in rows {
            let Some(index) = (row.number as usize).checked_sub(1) else {
                continue;
            };
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(row.id);
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(position, slot)| {
                slot.ok_or_else(|| GradingError::OrderGap {
                    question_id: question_id.to_string(),
                    position,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Return this order unchanged if it still matches `catalog`, or a
    /// rebuilt one. The flag is `true` when a rebuild happened.
    pub fn repair(
        self,
        catalog: &RowCatalog,
        source: &dyn RowSource,
        question_id: &str,
        number_of_rows: usize,
        check: StalenessCheck,
    ) -> Result<(Self, bool)> {
        if !self.is_stale(catalog, check) {
            return Ok((self, false));
        }
        tracing::warn!(question_id, order = %self, "persisted order is stale, rebuilding");
        let rebuilt = Self::rebuild(source, question_id, number_of_rows)?;
        Ok((rebuilt, true))
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{ORDER_SEPARATOR}")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

impl FromIterator<RowId> for Order {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
