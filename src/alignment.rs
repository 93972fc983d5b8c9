//! Aligning sparse engine scores with the candidate universe.
//!
//! The search engine only scores a subset of the corpus. Metrics are computed
//! over parallel, index-aligned relevance and score vectors, so every
//! universe table gets a score (0.0 when the engine did not return it) in
//! exactly the universe's order.

use crate::error::{EvalError, Result};
use crate::relevance::RelevanceMap;
use crate::universe::{CandidateUniverse, TableId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Scores returned by the engine for one query, in the engine's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictedScores {
    ranked: Vec<(TableId, f64)>,
    index: HashMap<TableId, usize>,
}

impl PredictedScores {
    /// Build from `(table, score)` pairs. A repeated table keeps its first score.
    pub fn new<I, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, f64)>,
        T: Into<TableId>,
    {
        let mut scores = Self::default();
        for (table, score) in pairs {
            scores.push(table.into(), score);
        }
        scores
    }

    pub(crate) fn push(&mut self, table: TableId, score: f64) {
        if self.index.contains_key(&table) {
            return;
        }
        self.index.insert(table.clone(), self.ranked.len());
        self.ranked.push((table, score));
    }

    pub fn get(&self, table: &str) -> Option<f64> {
        self.index.get(table).map(|&i| self.ranked[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TableId, f64)> {
        self.ranked.iter().map(|(t, s)| (t, *s))
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Scores aligned with a universe, plus which positions the engine actually scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedScores {
    values: Vec<f64>,
    scored: Vec<bool>,
}

impl AlignedScores {
    /// Treat every value as an engine score.
    pub fn dense(values: Vec<f64>) -> Self {
        let scored = vec![true; values.len()];
        Self { values, scored }
    }

    /// Build from optional scores; `None` means the engine did not return the table.
    pub fn from_options(values: &[Option<f64>]) -> Self {
        Self {
            values: values.iter().map(|v| v.unwrap_or(0.0)).collect(),
            scored: values.iter().map(Option::is_some).collect(),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_scored(&self, i: usize) -> bool {
        self.scored.get(i).copied().unwrap_or(false)
    }

    /// Number of positions the engine scored.
    pub fn scored_count(&self) -> usize {
        self.scored.iter().filter(|s| **s).count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Emit one score per key, in order, defaulting to 0.0.
///
/// The output always has the same length as `keys`.
pub fn align<'a>(
    keys: impl IntoIterator<Item = &'a TableId>,
    predicted: &PredictedScores,
) -> AlignedScores {
    let options: Vec<Option<f64>> = keys
        .into_iter()
        .map(|key| predicted.get(key.as_str()))
        .collect();
    AlignedScores::from_options(&options)
}

/// Which of the query's own tables are removed before evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    /// Evaluate over the full universe.
    #[default]
    None,
    /// Remove the table the query tuples were sampled from.
    QueryTable,
    /// Remove every table on the query's wikipage.
    QueryWikipageTables,
}

impl Exclusion {
    /// Tables to drop for a query with the given selected table and page tables.
    pub fn tables_to_remove(
        self,
        selected_table: Option<&TableId>,
        page_tables: &[TableId],
    ) -> HashSet<TableId> {
        match self {
            Exclusion::None => HashSet::new(),
            Exclusion::QueryTable => selected_table.into_iter().cloned().collect(),
            Exclusion::QueryWikipageTables => page_tables.iter().cloned().collect(),
        }
    }
}

/// Index-aligned relevance and score vectors for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub tables: Vec<TableId>,
    pub relevance: Vec<f64>,
    pub scores: AlignedScores,
}

/// Remove `excluded` from both the universe and the ground truth, then align.
///
/// The filtered universe and relevance map must cover exactly the same
/// tables; anything else means the inputs were built inconsistently and the
/// metrics would be meaningless.
pub fn prepare(
    universe: &CandidateUniverse,
    relevance: &RelevanceMap,
    predicted: &PredictedScores,
    excluded: &HashSet<TableId>,
) -> Result<AlignedPair> {
    let universe = universe.without(excluded);
    let relevance = relevance.without(excluded);

    if universe.len() != relevance.len() {
        return Err(EvalError::Configuration(format!(
            "candidate universe has {} tables but ground truth covers {}",
            universe.len(),
            relevance.len()
        )));
    }
    if let Some(stray) = universe.iter().find(|t| !relevance.contains(t.as_str())) {
        return Err(EvalError::Configuration(format!(
            "table '{stray}' is in the candidate universe but has no ground-truth entry"
        )));
    }

    let tables: Vec<TableId> = relevance.keys().cloned().collect();
    let scores = align(&tables, predicted);
    Ok(AlignedPair {
        relevance: relevance.values(),
        tables,
        scores,
    })
}
