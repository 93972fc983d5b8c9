//! Concurrent evaluation driver.
//!
//! An [`Evaluator`] expands the configured matrix into [`EvaluationKey`]s and
//! evaluates every (key, query) unit on a bounded pool of tokio tasks. File
//! parsing and metric computation run on the blocking pool; ground truth and
//! shared BM25 rankings are parsed once and cached. Finished units are drained
//! into a single [`MetricSink`].

use crate::aggregate::{EvaluationReport, MetricSink};
use crate::alignment::{PredictedScores, prepare};
use crate::config::{Config, ErrorPolicy, GroundTruthKind, UniverseMode};
use crate::configuration::{EvaluationKey, Query, ScoreFormat, path_for};
use crate::error::{EvalError, Result};
use crate::metrics::{MetricRecord, evaluate_with};
use crate::relevance::{GroundTruthSource, RelevanceMap};
use crate::sources::{self, RankedScores, ScoreLookup, WikipageTables};
use crate::universe::CandidateUniverse;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{RwLock, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};

/// Related-wikipage relevance scores for one query.
type RelatedScores = BTreeMap<String, f64>;

/// Every evaluation key the configuration asks for, in key order.
///
/// Vote thresholds only apply to LSH runs; other configurations get one key
/// per (tuples, k) with vote 0.
pub fn evaluation_keys(config: &Config) -> Vec<EvaluationKey> {
    let eval = &config.evaluation;
    let mut keys = BTreeSet::new();
    for &configuration in &config.configurations {
        let votes: &[u32] = if configuration.uses_vote() {
            &eval.votes
        } else {
            &[0]
        };
        for &tuples in &eval.tuples {
            for &k in &eval.k_values {
                for &vote in votes {
                    keys.insert(EvaluationKey {
                        configuration,
                        tuples,
                        k,
                        vote,
                    });
                }
            }
        }
    }
    keys.into_iter().collect()
}

/// Result of one (key, query) unit.
enum Outcome {
    Scored(MetricRecord),
    /// No usable engine output.
    Missing,
}

struct UnitResult {
    key: EvaluationKey,
    query: String,
    outcome: Result<Outcome>,
}

/// Batch evaluator over a fixed corpus.
#[derive(Clone)]
pub struct Evaluator {
    config: Arc<Config>,
    corpus: Arc<CandidateUniverse>,
    mapping: Arc<WikipageTables>,
    /// Parsed ground-truth files keyed by wikipage id.
    ground_truth_cache: Arc<RwLock<HashMap<u64, Arc<RelatedScores>>>>,
    /// Parsed BM25 rankings keyed by path; `None` when the file is absent.
    ranking_cache: Arc<RwLock<HashMap<PathBuf, Option<Arc<RankedScores>>>>>,
}

impl Evaluator {
    /// Validate `config`, scan the corpus and load the wikipage mapping.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let corpus = CandidateUniverse::scan_dir(&config.data.tables_dir)?;
        info!(
            tables = corpus.len(),
            dir = %config.data.tables_dir.display(),
            "scanned table corpus"
        );

        let mapping = match config.evaluation.ground_truth {
            GroundTruthKind::RelatedPages => WikipageTables::load(&config.data.wikipages_file)?,
            GroundTruthKind::CoMembership => WikipageTables::default(),
        };

        Ok(Self::from_parts(config, corpus, mapping))
    }

    /// Build an evaluator from already loaded inputs.
    pub fn from_parts(config: Config, corpus: CandidateUniverse, mapping: WikipageTables) -> Self {
        Self {
            config: Arc::new(config),
            corpus: Arc::new(corpus),
            mapping: Arc::new(mapping),
            ground_truth_cache: Arc::new(RwLock::new(HashMap::new())),
            ranking_cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn corpus(&self) -> &CandidateUniverse {
        &self.corpus
    }

    /// Load the configured query list.
    pub fn load_queries(&self) -> Result<Vec<Query>> {
        sources::load_queries(&self.config.data.queries_file)
    }

    /// Evaluate every configured key against every query.
    ///
    /// Under [`ErrorPolicy::Skip`] a failing unit is logged and recorded as
    /// failed, apart from units with no engine output; under [`ErrorPolicy::Abort`] the first failure ends the run
    /// and outstanding tasks are cancelled.
    #[instrument(skip_all, fields(queries = queries.len()))]
    pub async fn run(&self, queries: &[Query]) -> Result<EvaluationReport> {
        let start = Instant::now();
        let keys = evaluation_keys(&self.config);
        info!(
            keys = keys.len(),
            units = keys.len() * queries.len(),
            workers = self.config.evaluation.workers,
            "starting evaluation"
        );

        let sink = MetricSink::new();
        let semaphore = Arc::new(Semaphore::new(self.config.evaluation.workers));
        let queries: Vec<Arc<Query>> = queries.iter().cloned().map(Arc::new).collect();
        let mut tasks = JoinSet::new();

        for key in keys {
            for query in &queries {
                let permit = Arc::clone(&semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| EvalError::Task(e.to_string()))?;
                let evaluator = self.clone();
                let query = Arc::clone(query);
                tasks.spawn(async move {
                    let _permit = permit;
                    let outcome = evaluator.evaluate_unit(&key, Arc::clone(&query)).await;
                    UnitResult {
                        key,
                        query: query.id(),
                        outcome,
                    }
                });

                while let Some(joined) = tasks.try_join_next() {
                    self.settle(joined, &sink)?;
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            self.settle(joined, &sink)?;
        }

        let report = EvaluationReport::from_distributions(sink.into_distributions());
        let totals = report.totals();
        info!(
            evaluated = totals.evaluated,
            skipped = totals.skipped,
            failed = totals.failed,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "evaluation finished"
        );
        Ok(report)
    }

    fn settle(
        &self,
        joined: std::result::Result<UnitResult, JoinError>,
        sink: &MetricSink,
    ) -> Result<()> {
        let UnitResult {
            key,
            query,
            outcome,
        } = joined.map_err(task_error)?;

        match outcome {
            Ok(Outcome::Scored(record)) => sink.record(key, query, record),
            Ok(Outcome::Missing) => sink.record_missing(key, query),
            Err(err) => match self.config.evaluation.error_policy {
                ErrorPolicy::Skip => {
                    warn!(%key, %query, error = %err, "query failed to evaluate");
                    sink.record_failure(key, query);
                }
                ErrorPolicy::Abort => return Err(err),
            },
        }
        Ok(())
    }

    async fn evaluate_unit(&self, key: &EvaluationKey, query: Arc<Query>) -> Result<Outcome> {
        let predicted = match self.predicted_scores(key, &query).await? {
            ScoreLookup::Found(scores) => scores,
            ScoreLookup::Missing => {
                debug!(%key, query = %query.id(), "no engine output");
                return Ok(Outcome::Missing);
            }
        };

        if self.config.evaluation.require_full_top_k && predicted.len() < key.k {
            debug!(
                %key,
                query = %query.id(),
                returned = predicted.len(),
                "engine returned fewer than k tables"
            );
            return Ok(Outcome::Missing);
        }

        let related = match self.config.evaluation.ground_truth {
            GroundTruthKind::RelatedPages => Some(self.related_scores(query.wikipage_id).await?),
            GroundTruthKind::CoMembership => None,
        };

        let evaluator = self.clone();
        let k = key.k;
        let record = tokio::task::spawn_blocking(move || {
            evaluator.score_query(&query, k, related.as_deref(), &predicted)
        })
        .await
        .map_err(task_error)??;

        debug!(%key, ndcg = record.ndcg, auc = ?record.auc, "evaluated query");
        Ok(Outcome::Scored(record))
    }

    /// Compute one query's metrics from loaded inputs.
    ///
    /// `related` carries related-wikipage scores when ground truth comes from
    /// related pages; without it the query page's own tables are relevant.
    pub fn score_query(
        &self,
        query: &Query,
        k: usize,
        related: Option<&RelatedScores>,
        predicted: &PredictedScores,
    ) -> Result<MetricRecord> {
        let eval = &self.config.evaluation;

        let universe = match eval.universe {
            UniverseMode::Corpus => Cow::Borrowed(&*self.corpus),
            UniverseMode::Labeled => Cow::Owned(CandidateUniverse::labeled(
                &query.tables,
                &self.corpus,
                eval.seed,
            )),
            UniverseMode::Output => Cow::Owned(CandidateUniverse::from_items(
                predicted.iter().take(k).map(|(table, _)| table.clone()),
            )),
        };

        let source = match related {
            Some(scores) => sources::ground_truth_source(scores, &self.mapping),
            None => GroundTruthSource::co_membership(&query.wikipage, &query.tables),
        };
        let relevance = RelevanceMap::build(&universe, &[source]);

        let excluded = eval
            .exclusion
            .tables_to_remove(query.selected_table.as_ref(), &query.tables);
        let pair = prepare(&universe, &relevance, predicted, &excluded)?;

        Ok(evaluate_with(&pair.relevance, &pair.scores, k, &eval.metrics)?)
    }

    async fn predicted_scores(&self, key: &EvaluationKey, query: &Query) -> Result<ScoreLookup> {
        let query_id = query.id();
        let path = path_for(&self.config.data.results_dir, key, &query_id);

        match key.configuration.score_format() {
            ScoreFormat::Json => {
                tokio::task::spawn_blocking(move || sources::load_json_scores(&path))
                    .await
                    .map_err(task_error)?
            }
            ScoreFormat::RankedTsv => Ok(match self.ranking(path).await? {
                Some(ranking) => ranking.lookup(&query_id),
                None => ScoreLookup::Missing,
            }),
        }
    }

    async fn ranking(&self, path: PathBuf) -> Result<Option<Arc<RankedScores>>> {
        let cache = self.ranking_cache.read().await;
        if let Some(cached) = cache.get(&path) {
            return Ok(cached.clone());
        }
        drop(cache);

        let mut cache = self.ranking_cache.write().await;
        // another task may have parsed it while we waited for the write lock
        if let Some(cached) = cache.get(&path) {
            return Ok(cached.clone());
        }

        let load_path = path.clone();
        let ranking = tokio::task::spawn_blocking(move || sources::load_ranked_tsv(&load_path))
            .await
            .map_err(task_error)??
            .map(Arc::new);

        match &ranking {
            Some(r) => debug!(path = %path.display(), queries = r.query_count(), "loaded BM25 ranking"),
            None => debug!(path = %path.display(), "BM25 ranking not found"),
        }
        cache.insert(path, ranking.clone());
        Ok(ranking)
    }

    async fn related_scores(&self, wikipage_id: u64) -> Result<Arc<RelatedScores>> {
        let cache = self.ground_truth_cache.read().await;
        if let Some(cached) = cache.get(&wikipage_id) {
            return Ok(Arc::clone(cached));
        }
        drop(cache);

        let mut cache = self.ground_truth_cache.write().await;
        if let Some(cached) = cache.get(&wikipage_id) {
            return Ok(Arc::clone(cached));
        }

        let dir = self.config.data.ground_truth_dir.clone();
        let scores = tokio::task::spawn_blocking(move || {
            sources::load_relevance_scores(&dir, wikipage_id)
        })
        .await
        .map_err(task_error)??;
        let scores = Arc::new(scores);

        cache.insert(wikipage_id, Arc::clone(&scores));
        Ok(scores)
    }
}

fn task_error(err: JoinError) -> EvalError {
    EvalError::Task(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Exclusion;
    use crate::configuration::{Bm25Field, Configuration, LshMode};
    use crate::metrics::AucPolicy;
    use crate::universe::TableId;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const TYPES_LSH: Configuration = Configuration::TypesLsh {
        vectors: 32,
        band_size: 8,
    };
    const BM25: Configuration = Configuration::Bm25 {
        field: Bm25Field::Text,
    };

    /// Corpus t1..t6; query 1 lives on page A with t1 and t2; page B (t3) is
    /// related to A with score 0.5.
    struct Fixture {
        dir: TempDir,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path();

            let tables = root.join("tables");
            fs::create_dir_all(&tables).unwrap();
            for id in ["t1", "t2", "t3", "t4", "t5", "t6"] {
                fs::write(tables.join(id), "{}").unwrap();
            }

            fs::write(
                root.join("queries.json"),
                r#"[
                    {"wikipage_id": 1, "wikipage": "https://en.wikipedia.org/wiki/A",
                     "tables": ["t1", "t2"], "selected_table": "t1"},
                    {"wikipage_id": 2, "wikipage": "https://en.wikipedia.org/wiki/C",
                     "tables": ["t4"]}
                ]"#,
            )
            .unwrap();

            fs::write(
                root.join("wikipages.json"),
                r#"[
                    {"wikipage": "https://en.wikipedia.org/wiki/A", "tables": ["t1", "t2"]},
                    {"wikipage": "https://en.wikipedia.org/wiki/B", "tables": ["t3"]},
                    {"wikipage": "https://en.wikipedia.org/wiki/C", "tables": ["t4"]}
                ]"#,
            )
            .unwrap();

            let gt = root.join("ground_truth");
            fs::create_dir_all(&gt).unwrap();
            fs::write(gt.join("1.json"), r#"{"A": 1.0, "B": 0.5}"#).unwrap();
            fs::write(gt.join("2.json"), r#"{"C": 1.0}"#).unwrap();

            let mut config = Config::with_data(
                tables,
                root.join("queries.json"),
                root.join("results"),
            );
            config.data.ground_truth_dir = gt;
            config.data.wikipages_file = root.join("wikipages.json");
            config.configurations = vec![TYPES_LSH];
            config.evaluation.k_values = vec![3];
            config.evaluation.workers = 2;

            Self { dir, config }
        }

        fn results(&self) -> PathBuf {
            self.dir.path().join("results")
        }

        fn write_scores(&self, configuration: Configuration, query: &str, scores: &[(&str, f64)]) {
            let key = EvaluationKey {
                configuration,
                tuples: 1,
                k: 3,
                vote: 1,
            };
            let path = path_for(&self.results(), &key, query);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            let entries: Vec<_> = scores
                .iter()
                .map(|(t, s)| serde_json::json!({"tableID": t, "score": s}))
                .collect();
            fs::write(path, serde_json::json!({ "scores": entries }).to_string()).unwrap();
        }
    }

    fn lsh_key(k: usize) -> EvaluationKey {
        EvaluationKey {
            configuration: TYPES_LSH,
            tuples: 1,
            k,
            vote: 1,
        }
    }

    #[test]
    fn test_keys_expand_votes_only_for_lsh() {
        let mut config = Config::default();
        config.configurations = vec![TYPES_LSH, BM25];
        config.evaluation.votes = vec![1, 2];
        config.evaluation.tuples = vec![1, 5];
        config.evaluation.k_values = vec![10];

        let keys = evaluation_keys(&config);
        assert_eq!(keys.len(), 4 + 2);
        assert!(
            keys.iter()
                .filter(|k| k.configuration == BM25)
                .all(|k| k.vote == 0)
        );
    }

    #[tokio::test]
    async fn test_run_scores_and_skips() {
        let fixture = Fixture::new();
        fixture.write_scores(TYPES_LSH, "wikipage_1", &[("t1", 0.9), ("t3", 0.8), ("t5", 0.1)]);
        // wikipage_2 has no engine output

        let evaluator = Evaluator::new(fixture.config.clone()).unwrap();
        let queries = evaluator.load_queries().unwrap();
        let report = evaluator.run(&queries).await.unwrap();

        let entry = report.get(&lsh_key(3)).unwrap();
        assert_eq!(entry.summary.count, 1);
        assert_eq!(entry.distribution.skipped, vec!["wikipage_2"]);

        let record = &entry.distribution.records[0].record;
        // relevance: t1 = t2 = 1.0, t3 = 0.5; top 3 holds t1, t3 and t5
        assert_eq!(record.num_relevant_at_k, 2);
        assert!((record.recall_at_k - 2.0 / 3.0).abs() < 1e-12);
        assert!((record.precision_at_k - 2.0 / 3.0).abs() < 1e-12);
        assert!(record.ndcg > 0.0 && record.ndcg < 1.0);
    }

    #[tokio::test]
    async fn test_short_result_lists_are_missing() {
        let fixture = Fixture::new();
        fixture.write_scores(TYPES_LSH, "wikipage_1", &[("t1", 0.9)]);

        let evaluator = Evaluator::new(fixture.config.clone()).unwrap();
        let queries = evaluator.load_queries().unwrap();
        let report = evaluator.run(&queries).await.unwrap();

        let totals = report.totals();
        assert_eq!((totals.evaluated, totals.skipped, totals.failed), (0, 2, 0));
    }

    #[tokio::test]
    async fn test_bm25_ranking_is_shared_across_queries() {
        let mut fixture = Fixture::new();
        fixture.config.configurations = vec![BM25];

        let key = EvaluationKey {
            configuration: BM25,
            tuples: 1,
            k: 3,
            vote: 0,
        };
        let path = path_for(&fixture.results(), &key, "unused");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "1\tq\tt2\t1\t9.0\ttext\n1\tq\tt1\t2\t8.0\ttext\n1\tq\tt6\t3\t1.0\ttext\n\
             2\tq\tt4\t1\t5.0\ttext\n2\tq\tt1\t2\t4.0\ttext\n2\tq\tt2\t3\t3.0\ttext\n",
        )
        .unwrap();

        let evaluator = Evaluator::new(fixture.config.clone()).unwrap();
        let queries = evaluator.load_queries().unwrap();
        let report = evaluator.run(&queries).await.unwrap();

        let entry = report.get(&key).unwrap();
        assert_eq!(entry.summary.count, 2);
        assert_eq!(entry.summary.skipped, 0);
        // wikipage_2: t4 is the only relevant table and it is ranked first
        let q2 = entry
            .distribution
            .records
            .iter()
            .find(|r| r.query == "wikipage_2")
            .unwrap();
        assert_eq!(q2.record.ndcg, 1.0);
        assert_eq!(q2.record.recall_at_k, 1.0);
    }

    #[tokio::test]
    async fn test_error_policy() {
        let mut fixture = Fixture::new();
        fixture.write_scores(TYPES_LSH, "wikipage_1", &[("t1", 0.9), ("t2", 0.8), ("t5", 0.1)]);
        fixture.write_scores(TYPES_LSH, "wikipage_2", &[("t4", 0.9), ("t2", 0.8), ("t5", 0.1)]);
        fs::write(fixture.dir.path().join("ground_truth/2.json"), "not json").unwrap();

        let evaluator = Evaluator::new(fixture.config.clone()).unwrap();
        let queries = evaluator.load_queries().unwrap();
        let report = evaluator.run(&queries).await.unwrap();
        let totals = report.totals();
        assert_eq!((totals.evaluated, totals.skipped, totals.failed), (1, 0, 1));
        let entry = report.get(&lsh_key(3)).unwrap();
        assert_eq!(entry.distribution.failed, vec!["wikipage_2"]);
        assert!(entry.distribution.skipped.is_empty());

        fixture.config.evaluation.error_policy = ErrorPolicy::Abort;
        let evaluator = Evaluator::new(fixture.config.clone()).unwrap();
        let result = evaluator.run(&queries).await;
        assert!(matches!(result, Err(EvalError::MalformedInput { .. })));
    }

    #[test]
    fn test_excluding_page_tables_leaves_related_tables() {
        let mut fixture = Fixture::new();
        fixture.config.evaluation.exclusion = Exclusion::QueryWikipageTables;
        let evaluator = Evaluator::new(fixture.config.clone()).unwrap();
        let queries = evaluator.load_queries().unwrap();

        let related = sources::load_relevance_scores(&fixture.dir.path().join("ground_truth"), 1)
            .unwrap();
        let predicted = PredictedScores::new([("t1", 0.9), ("t3", 0.8), ("t5", 0.1)]);
        let record = evaluator
            .score_query(&queries[0], 3, Some(&related), &predicted)
            .unwrap();

        // t1 and t2 are gone; t3 (0.5) is the only relevant table and ranks first
        assert_eq!(record.ndcg, 1.0);
        assert_eq!(record.num_relevant_at_k, 1);
        assert_eq!(record.auc, Some(1.0));
    }

    #[test]
    fn test_labeled_universe_with_co_membership() {
        let fixture = Fixture::new();
        let mut config = fixture.config.clone();
        config.evaluation.universe = UniverseMode::Labeled;
        config.evaluation.ground_truth = GroundTruthKind::CoMembership;
        config.evaluation.metrics.auc = AucPolicy::Omit;

        let corpus = CandidateUniverse::scan_dir(&config.data.tables_dir).unwrap();
        let evaluator = Evaluator::from_parts(config, corpus, WikipageTables::default());

        let query = Query {
            wikipage_id: 1,
            wikipage: "https://en.wikipedia.org/wiki/A".to_string(),
            tables: vec![TableId::from("t1"), TableId::from("t2")],
            selected_table: None,
        };
        let predicted = PredictedScores::new([("t2", 0.9), ("t1", 0.8)]);
        let record = evaluator.score_query(&query, 2, None, &predicted).unwrap();

        assert_eq!(record.ndcg, 1.0);
        assert_eq!(record.precision_at_k, 1.0);
        assert_eq!(record.recall_at_k, 1.0);
    }

    #[test]
    fn test_missing_corpus_is_an_error() {
        let fixture = Fixture::new();
        let mut config = fixture.config.clone();
        config.data.tables_dir = Path::new("/nonexistent/tables").to_path_buf();
        assert!(matches!(
            Evaluator::new(config),
            Err(EvalError::InvalidCorpusPath(_))
        ));
    }

    #[tokio::test]
    async fn test_output_universe_scores_the_top_k() {
        let mut fixture = Fixture::new();
        fixture.config.evaluation.universe = UniverseMode::Output;
        fixture.config.evaluation.ground_truth = GroundTruthKind::CoMembership;
        fixture.write_scores(
            TYPES_LSH,
            "wikipage_1",
            &[("t5", 0.9), ("t1", 0.8), ("t3", 0.7), ("t2", 0.6)],
        );

        let evaluator = Evaluator::new(fixture.config.clone()).unwrap();
        let queries = evaluator.load_queries().unwrap();
        let report = evaluator.run(&queries).await.unwrap();

        let entry = report.get(&lsh_key(3)).unwrap();
        assert_eq!(entry.summary.count, 1);
        assert_eq!(entry.distribution.skipped, vec!["wikipage_2"]);

        // universe is t5, t1, t3; t2 was returned below the cutoff
        let record = &entry.distribution.records[0].record;
        assert_eq!(record.k, 3);
        assert_eq!(record.num_relevant_at_k, 1);
        assert_eq!(record.recall_at_k, 1.0);
        assert!((record.precision_at_k - 1.0 / 3.0).abs() < 1e-12);
        assert!((record.ndcg - 1.0 / 3f64.log2()).abs() < 1e-12);
        assert_eq!(record.auc, Some(0.5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ground_truth_is_parsed_once_per_wikipage() {
        let fixture = Fixture::new();
        let evaluator = Evaluator::new(fixture.config.clone()).unwrap();

        let mut tasks = JoinSet::new();
        for _ in 0..16 {
            let evaluator = evaluator.clone();
            tasks.spawn(async move { evaluator.related_scores(1).await.unwrap() });
        }
        let mut loaded = Vec::new();
        while let Some(scores) = tasks.join_next().await {
            loaded.push(scores.unwrap());
        }

        let cached = evaluator.related_scores(1).await.unwrap();
        assert!(loaded.iter().all(|scores| Arc::ptr_eq(scores, &cached)));
        assert_eq!(cached.get("B"), Some(&0.5));
    }

    #[test]
    fn test_column_aggregated_uses_vote() {
        assert!(
            Configuration::ColumnAggregated {
                mode: LshMode::Embeddings,
                vectors: 30,
                band_size: 10
            }
            .uses_vote()
        );
        assert!(!BM25.uses_vote());
    }
}
