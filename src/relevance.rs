//! Ground-truth relevance maps.
//!
//! A [`RelevanceMap`] assigns a non-negative relevance to every table in a
//! candidate universe. It is built by max-merging one or more ground-truth
//! sources: each source scores a set of related keys (wikipages) and says
//! which tables each key certifies.

use crate::universe::{CandidateUniverse, TableId};
use std::collections::{HashMap, HashSet};

/// One ground-truth assignment for a query.
///
/// `scores` is ordered; `certifies` maps each key to the tables it vouches for.
#[derive(Debug, Clone, Default)]
pub struct GroundTruthSource {
    pub scores: Vec<(String, f64)>,
    pub certifies: HashMap<String, Vec<TableId>>,
}

impl GroundTruthSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a related key with its relevance score and certified tables.
    pub fn with_key(
        mut self,
        key: impl Into<String>,
        score: f64,
        tables: impl IntoIterator<Item = TableId>,
    ) -> Self {
        let key = key.into();
        self.certifies
            .entry(key.clone())
            .or_default()
            .extend(tables);
        self.scores.push((key, score));
        self
    }

    /// Relevance 1 for every table on the query's own page.
    pub fn co_membership(page_key: impl Into<String>, page_tables: &[TableId]) -> Self {
        Self::new().with_key(page_key, 1.0, page_tables.iter().cloned())
    }
}

/// Relevance of every table in a universe, in universe order.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceMap {
    entries: Vec<(TableId, f64)>,
    index: HashMap<TableId, usize>,
}

impl RelevanceMap {
    /// Build a relevance map over `universe` from ordered ground-truth sources.
    ///
    /// Every table starts at 0. A certified table's relevance becomes the max
    /// of its current value and the certifying key's score, so no source can
    /// downgrade another. Certified tables outside the universe are ignored.
    pub fn build(universe: &CandidateUniverse, sources: &[GroundTruthSource]) -> Self {
        let mut map = Self::zeroed(universe);
        for source in sources {
            for (key, score) in &source.scores {
                let Some(tables) = source.certifies.get(key) else {
                    continue;
                };
                for table in tables {
                    map.raise(table, *score);
                }
            }
        }
        map
    }

    /// A map with every universe table at relevance 0.
    pub fn zeroed(universe: &CandidateUniverse) -> Self {
        let entries: Vec<(TableId, f64)> = universe.iter().map(|t| (t.clone(), 0.0)).collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (t, _))| (t.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// Mark `tables` as relevant to the query itself with `score`.
    ///
    /// Self-relevance is never inferred from the ground truth; callers that
    /// want it must ask for it.
    pub fn with_self_relevance<'a>(
        mut self,
        tables: impl IntoIterator<Item = &'a TableId>,
        score: f64,
    ) -> Self {
        for table in tables {
            self.raise(table, score);
        }
        self
    }

    fn raise(&mut self, table: &TableId, score: f64) {
        if let Some(&i) = self.index.get(table) {
            let current = &mut self.entries[i].1;
            if score > *current {
                *current = score;
            }
        }
    }

    /// Drop `excluded` tables, preserving order.
    pub fn without(&self, excluded: &HashSet<TableId>) -> Self {
        let entries: Vec<(TableId, f64)> = self
            .entries
            .iter()
            .filter(|(t, _)| !excluded.contains(t))
            .cloned()
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (t, _))| (t.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn get(&self, table: &str) -> Option<f64> {
        self.index.get(table).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.index.contains_key(table)
    }

    /// Tables in universe order.
    pub fn keys(&self) -> impl Iterator<Item = &TableId> {
        self.entries.iter().map(|(t, _)| t)
    }

    /// Relevance values in universe order.
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, r)| *r).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TableId, f64)> {
        self.entries.iter().map(|(t, r)| (t, *r))
    }

    /// Number of tables with relevance > 0.
    pub fn relevant_count(&self) -> usize {
        self.entries.iter().filter(|(_, r)| *r > 0.0).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(id: &str) -> TableId {
        TableId::from(id)
    }

    fn universe() -> CandidateUniverse {
        CandidateUniverse::from_items(["t1", "t2", "t3", "t4"])
    }

    #[test]
    fn test_unreferenced_tables_default_to_zero() {
        let map = RelevanceMap::build(&universe(), &[]);
        assert_eq!(map.len(), 4);
        assert_eq!(map.values(), vec![0.0; 4]);
        assert_eq!(map.relevant_count(), 0);
    }

    #[test]
    fn test_merge_takes_max_across_sources() {
        let low = GroundTruthSource::new().with_key("Page_A", 0.4, [t("t2")]);
        let high = GroundTruthSource::new().with_key("Page_B", 0.7, [t("t2"), t("t3")]);

        let forward = RelevanceMap::build(&universe(), &[low.clone(), high.clone()]);
        let backward = RelevanceMap::build(&universe(), &[high, low]);

        assert_eq!(forward.get("t2"), Some(0.7));
        assert_eq!(backward.get("t2"), Some(0.7));
        assert_eq!(forward.get("t3"), Some(0.7));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_merge_within_one_source() {
        let source = GroundTruthSource::new()
            .with_key("Page_A", 0.9, [t("t1")])
            .with_key("Page_B", 0.2, [t("t1"), t("t4")]);
        let map = RelevanceMap::build(&universe(), &[source]);
        assert_eq!(map.values(), vec![0.9, 0.0, 0.0, 0.2]);
    }

    #[test]
    fn test_tables_outside_universe_are_ignored() {
        let source = GroundTruthSource::new().with_key("Page_A", 1.0, [t("t9"), t("t1")]);
        let map = RelevanceMap::build(&universe(), &[source]);
        assert!(!map.contains("t9"));
        assert_eq!(map.get("t1"), Some(1.0));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_key_without_tables_contributes_nothing() {
        let mut source = GroundTruthSource::new();
        source.scores.push(("Orphan_Page".to_string(), 1.0));
        let map = RelevanceMap::build(&universe(), &[source]);
        assert_eq!(map.relevant_count(), 0);
    }

    #[test]
    fn test_self_relevance_is_explicit() {
        let map = RelevanceMap::build(&universe(), &[]);
        assert_eq!(map.get("t3"), Some(0.0));

        let map = map.with_self_relevance([&t("t3")], 1.0);
        assert_eq!(map.get("t3"), Some(1.0));
    }

    #[test]
    fn test_co_membership() {
        let source = GroundTruthSource::co_membership("Query_Page", &[t("t1"), t("t2")]);
        let map = RelevanceMap::build(&universe(), &[source]);
        assert_eq!(map.values(), vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_without_keeps_order_and_index() {
        let source = GroundTruthSource::new().with_key("P", 1.0, [t("t4")]);
        let map = RelevanceMap::build(&universe(), &[source]);
        let excluded: HashSet<TableId> = [t("t2")].into_iter().collect();
        let filtered = map.without(&excluded);

        let keys: Vec<&str> = filtered.keys().map(TableId::as_str).collect();
        assert_eq!(keys, vec!["t1", "t3", "t4"]);
        assert_eq!(filtered.get("t4"), Some(1.0));
    }
}
