//! Readers for the files the evaluator consumes.
//!
//! Supports:
//! - engine output: `filenameToScore.json` and tab-separated BM25 rankings
//! - ground truth: per-query `{wikipage_title: relevance}` JSON files
//! - the wikipage to tables mapping and the query list
//!
//! A missing engine output file is not an error: it is reported as
//! [`ScoreLookup::Missing`] so that aggregation can skip the query instead of
//! scoring it as zero.

use crate::alignment::PredictedScores;
use crate::configuration::{Query, query_dir_name};
use crate::error::{EvalError, Result};
use crate::relevance::GroundTruthSource;
use crate::universe::TableId;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Prefix joining ground-truth wikipage titles to mapping-file URLs.
pub const WIKIPEDIA_URL_PREFIX: &str = "https://en.wikipedia.org/wiki/";

/// Engine output for one query, or the fact that there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreLookup {
    Found(PredictedScores),
    Missing,
}

#[derive(Debug, Deserialize)]
struct ScoreFile {
    scores: Vec<ScoreEntry>,
}

#[derive(Debug, Deserialize)]
struct ScoreEntry {
    #[serde(rename = "tableID")]
    table_id: String,
    score: f64,
}

/// Read a `filenameToScore.json` file.
pub fn load_json_scores(path: &Path) -> Result<ScoreLookup> {
    if !path.is_file() {
        return Ok(ScoreLookup::Missing);
    }
    let file: ScoreFile = read_json(path)?;
    Ok(ScoreLookup::Found(PredictedScores::new(
        file.scores.into_iter().map(|e| (e.table_id, e.score)),
    )))
}

/// Per-query scores parsed from one BM25 ranking file.
#[derive(Debug, Clone, Default)]
pub struct RankedScores {
    by_query: HashMap<String, PredictedScores>,
}

impl RankedScores {
    /// Scores for a query, or `Missing` if the ranking has no rows for it.
    pub fn lookup(&self, query: &str) -> ScoreLookup {
        match self.by_query.get(query) {
            Some(scores) => ScoreLookup::Found(scores.clone()),
            None => ScoreLookup::Missing,
        }
    }

    pub fn query_count(&self) -> usize {
        self.by_query.len()
    }
}

/// Read a BM25 ranking: `wikipage_id \t query \t table_id \t rank \t score [\t field]`.
///
/// Returns `None` when the file does not exist.
pub fn load_ranked_tsv(path: &Path) -> Result<Option<RankedScores>> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    parse_ranked_tsv(&content, path).map(Some)
}

fn parse_ranked_tsv(content: &str, path: &Path) -> Result<RankedScores> {
    let mut ranked = RankedScores::default();
    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < 5 {
            return Err(EvalError::malformed(
                path,
                format!("line {}: expected at least 5 columns", line_num + 1),
            ));
        }
        let wikipage_id: u64 = columns[0].trim().parse().map_err(|_| {
            EvalError::malformed(path, format!("line {}: bad wikipage id", line_num + 1))
        })?;
        let score: f64 = columns[4].trim().parse().map_err(|_| {
            EvalError::malformed(path, format!("line {}: bad score", line_num + 1))
        })?;

        ranked
            .by_query
            .entry(query_dir_name(wikipage_id))
            .or_default()
            .push(TableId::new(columns[2].trim()), score);
    }
    Ok(ranked)
}

/// Maps wikipage URLs to the tables extracted from them.
#[derive(Debug, Clone, Default)]
pub struct WikipageTables {
    tables: HashMap<String, Vec<TableId>>,
}

#[derive(Debug, Deserialize)]
struct WikipageEntry {
    wikipage: String,
    tables: Vec<TableId>,
}

impl WikipageTables {
    /// Load from a JSON array of `{"wikipage": url, "tables": [...]}`.
    pub fn load(path: &Path) -> Result<Self> {
        let entries: Vec<WikipageEntry> = read_json(path)?;
        Ok(Self::from_pairs(
            entries.into_iter().map(|e| (e.wikipage, e.tables)),
        ))
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Vec<TableId>)>) -> Self {
        let mut tables: HashMap<String, Vec<TableId>> = HashMap::new();
        for (wikipage, page_tables) in pairs {
            tables.entry(wikipage).or_default().extend(page_tables);
        }
        Self { tables }
    }

    pub fn tables_of(&self, wikipage_url: &str) -> &[TableId] {
        self.tables
            .get(wikipage_url)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Read `<dir>/<wikipage_id>.json`: related wikipage titles to relevance.
pub fn load_relevance_scores(dir: &Path, wikipage_id: u64) -> Result<BTreeMap<String, f64>> {
    read_json(&dir.join(format!("{wikipage_id}.json")))
}

/// Turn related-wikipage scores into a ground-truth source via the page mapping.
///
/// Titles with no entry in the mapping certify nothing.
pub fn ground_truth_source(
    scores: &BTreeMap<String, f64>,
    mapping: &WikipageTables,
) -> GroundTruthSource {
    scores
        .iter()
        .fold(GroundTruthSource::new(), |source, (title, score)| {
            let url = format!("{WIKIPEDIA_URL_PREFIX}{title}");
            source.with_key(title.clone(), *score, mapping.tables_of(&url).iter().cloned())
        })
}

/// Load the query list: a JSON array of [`Query`].
pub fn load_queries(path: &Path) -> Result<Vec<Query>> {
    read_json(path)
}

/// Load a flat `{table: relevance}` judgment file.
pub fn load_flat_relevance(path: &Path) -> Result<BTreeMap<String, f64>> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| EvalError::malformed(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relevance::RelevanceMap;
    use crate::universe::CandidateUniverse;
    use tempfile::TempDir;

    #[test]
    fn test_json_scores_keep_engine_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filenameToScore.json");
        fs::write(
            &path,
            r#"{"scores": [{"tableID": "t9", "score": 0.9}, {"tableID": "t2", "score": 0.4}]}"#,
        )
        .unwrap();

        let ScoreLookup::Found(scores) = load_json_scores(&path).unwrap() else {
            panic!("expected scores");
        };
        let order: Vec<&str> = scores.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(order, vec!["t9", "t2"]);
        assert_eq!(scores.get("t2"), Some(0.4));
    }

    #[test]
    fn test_missing_score_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let lookup = load_json_scores(&dir.path().join("nope.json")).unwrap();
        assert_eq!(lookup, ScoreLookup::Missing);
        assert!(load_ranked_tsv(&dir.path().join("content.txt")).unwrap().is_none());
    }

    #[test]
    fn test_malformed_score_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filenameToScore.json");
        fs::write(&path, r#"{"scores": [{"table": "t1"}]}"#).unwrap();
        assert!(matches!(
            load_json_scores(&path),
            Err(EvalError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_ranked_tsv_groups_by_query() {
        let content = "12\tq\tt1\t1\t7.5\tcontent\n12\tq\tt2\t2\t3.0\tcontent\n\n13\tq\tt1\t1\t1.0\tcontent\n";
        let ranked = parse_ranked_tsv(content, Path::new("content.txt")).unwrap();

        assert_eq!(ranked.query_count(), 2);
        let ScoreLookup::Found(scores) = ranked.lookup("wikipage_12") else {
            panic!("expected scores");
        };
        assert_eq!(scores.len(), 2);
        assert_eq!(scores.get("t1"), Some(7.5));
        assert_eq!(ranked.lookup("wikipage_99"), ScoreLookup::Missing);
    }

    #[test]
    fn test_ranked_tsv_rejects_short_rows() {
        let err = parse_ranked_tsv("12\tq\tt1\n", Path::new("content.txt")).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_ground_truth_from_related_pages() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("5.json"),
            r#"{"Page_A": 0.4, "Page_B": 0.7, "Unmapped": 1.0}"#,
        )
        .unwrap();
        let mapping = WikipageTables::from_pairs([
            (
                format!("{WIKIPEDIA_URL_PREFIX}Page_A"),
                vec![TableId::from("t1"), TableId::from("t2")],
            ),
            (
                format!("{WIKIPEDIA_URL_PREFIX}Page_B"),
                vec![TableId::from("t2")],
            ),
        ]);

        let scores = load_relevance_scores(dir.path(), 5).unwrap();
        let source = ground_truth_source(&scores, &mapping);
        let universe = CandidateUniverse::from_items(["t1", "t2", "t3"]);
        let map = RelevanceMap::build(&universe, &[source]);

        assert_eq!(map.values(), vec![0.4, 0.7, 0.0]);
    }

    #[test]
    fn test_load_queries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queries.json");
        fs::write(
            &path,
            r#"[{"wikipage_id": 3, "wikipage": "https://en.wikipedia.org/wiki/X", "tables": ["t1"], "selected_table": "t1"},
                {"wikipage_id": 4, "wikipage": "https://en.wikipedia.org/wiki/Y", "tables": []}]"#,
        )
        .unwrap();

        let queries = load_queries(&path).unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].selected_table, Some(TableId::from("t1")));
        assert_eq!(queries[1].selected_table, None);
    }
}
