//! Items and candidate universes.
//!
//! A candidate universe is the full set of tables a query is evaluated over.
//! Its iteration order is fixed at construction; every vector the metrics
//! engine sees is index-aligned with it.

use crate::error::{EvalError, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

/// Opaque table identifier (e.g. `table-0001-123.json`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TableId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for TableId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The set of tables a single query is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateUniverse {
    items: Vec<TableId>,
    members: HashSet<TableId>,
}

impl CandidateUniverse {
    /// Build a universe from items, keeping first-seen order and dropping duplicates.
    pub fn from_items<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TableId>,
    {
        let mut universe = Self::default();
        for item in items {
            let item = item.into();
            if universe.members.insert(item.clone()) {
                universe.items.push(item);
            }
        }
        universe
    }

    /// Enumerate every table file under `dir`.
    ///
    /// Table ids are file names. Hidden files are skipped and the result is
    /// sorted so that runs over the same corpus are reproducible.
    pub fn scan_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(EvalError::InvalidCorpusPath(dir.to_path_buf()));
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).follow_links(true) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                EvalError::io(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            names.push(name.into_owned());
        }

        if names.is_empty() {
            return Err(EvalError::EmptyCorpus(dir.to_path_buf()));
        }
        names.sort();
        Ok(Self::from_items(names))
    }

    /// A labelled universe: the query page's own tables plus the same number
    /// of distractors drawn from `corpus` with a fixed seed.
    ///
    /// If the corpus has fewer eligible distractors than requested, all of
    /// them are used.
    pub fn labeled(page_tables: &[TableId], corpus: &CandidateUniverse, seed: u64) -> Self {
        let exclude: HashSet<&TableId> = page_tables.iter().collect();
        let pool: Vec<&TableId> = corpus
            .iter()
            .filter(|table| !exclude.contains(table))
            .collect();

        let mut rng = StdRng::seed_from_u64(seed);
        let distractors = pool
            .choose_multiple(&mut rng, page_tables.len())
            .map(|t| (*t).clone());

        Self::from_items(page_tables.iter().cloned().chain(distractors))
    }

    /// Remove `excluded` tables, preserving order.
    pub fn without(&self, excluded: &HashSet<TableId>) -> Self {
        Self::from_items(
            self.items
                .iter()
                .filter(|item| !excluded.contains(*item))
                .cloned(),
        )
    }

    pub fn contains(&self, item: &str) -> bool {
        self.members.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableId> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[TableId] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn ids(names: &[&str]) -> Vec<TableId> {
        names.iter().map(|n| TableId::from(*n)).collect()
    }

    #[test]
    fn test_from_items_dedups_in_order() {
        let universe = CandidateUniverse::from_items(["b", "a", "b", "c"]);
        assert_eq!(universe.as_slice(), ids(&["b", "a", "c"]).as_slice());
        assert!(universe.contains("a"));
        assert!(!universe.contains("z"));
    }

    #[test]
    fn test_scan_dir_lists_nested_tables() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("shard0")).unwrap();
        fs::write(dir.path().join("shard0/t2.json"), "{}").unwrap();
        fs::write(dir.path().join("t1.json"), "{}").unwrap();
        fs::write(dir.path().join(".DS_Store"), "").unwrap();

        let universe = CandidateUniverse::scan_dir(dir.path()).unwrap();
        assert_eq!(universe.as_slice(), ids(&["t1.json", "t2.json"]).as_slice());
    }

    #[test]
    fn test_scan_dir_rejects_missing_and_empty() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            CandidateUniverse::scan_dir(dir.path()),
            Err(EvalError::EmptyCorpus(_))
        ));
        assert!(matches!(
            CandidateUniverse::scan_dir(&dir.path().join("nope")),
            Err(EvalError::InvalidCorpusPath(_))
        ));
    }

    #[test]
    fn test_labeled_is_seeded_and_disjoint() {
        let corpus = CandidateUniverse::from_items((0..50).map(|i| format!("t{i}")));
        let page = ids(&["t1", "t2", "t3"]);

        let a = CandidateUniverse::labeled(&page, &corpus, 7);
        let b = CandidateUniverse::labeled(&page, &corpus, 7);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert_eq!(&a.as_slice()[..3], page.as_slice());
        for distractor in &a.as_slice()[3..] {
            assert!(!page.contains(distractor));
        }
    }

    #[test]
    fn test_labeled_small_corpus_uses_everything() {
        let corpus = CandidateUniverse::from_items(["p1", "p2", "x"]);
        let page = ids(&["p1", "p2"]);
        let universe = CandidateUniverse::labeled(&page, &corpus, 0);
        assert_eq!(universe.len(), 3);
        assert!(universe.contains("x"));
    }

    #[test]
    fn test_without_preserves_order() {
        let universe = CandidateUniverse::from_items(["a", "b", "c", "d"]);
        let excluded: HashSet<TableId> = ids(&["b", "d"]).into_iter().collect();
        assert_eq!(universe.without(&excluded).as_slice(), ids(&["a", "c"]).as_slice());
    }
}
