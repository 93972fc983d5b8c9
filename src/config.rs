//! Configuration for evaluation runs.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::alignment::Exclusion;
use crate::configuration::Configuration;
use crate::error::{EvalError, Result};
use crate::metrics::MetricOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Where the evaluator finds its inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    /// Directory holding every table of the corpus.
    pub tables_dir: PathBuf,

    /// Directory of `<wikipage_id>.json` relevance files.
    pub ground_truth_dir: PathBuf,

    /// JSON array mapping wikipage URLs to their tables.
    pub wikipages_file: PathBuf,

    /// JSON array of queries.
    pub queries_file: PathBuf,

    /// Root of the engine output tree.
    pub results_dir: PathBuf,
}

/// How the per-query candidate universe is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniverseMode {
    /// Every table in the corpus.
    #[default]
    Corpus,
    /// The query page's tables plus as many seeded random distractors.
    Labeled,
    /// The engine's own top-k output, in returned order.
    Output,
}

/// Where relevance judgments come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundTruthKind {
    /// Per-query related-wikipage scores mapped to tables.
    #[default]
    RelatedPages,
    /// Tables on the query's own page are relevant (1), everything else is not.
    CoMembership,
}

/// What the runner does when a query fails to evaluate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log, count the query as skipped, and continue.
    #[default]
    Skip,
    /// Stop the run with the first error.
    Abort,
}

/// Evaluation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// Cutoffs to evaluate.
    pub k_values: Vec<usize>,

    /// Query tuple counts the engine was run with.
    pub tuples: Vec<u32>,

    /// LSH vote thresholds the engine was run with.
    pub votes: Vec<u32>,

    pub exclusion: Exclusion,
    pub universe: UniverseMode,
    pub ground_truth: GroundTruthKind,

    /// Seed for distractor sampling in labelled universes.
    pub seed: u64,

    /// Treat a query with fewer than k engine scores as missing.
    pub require_full_top_k: bool,

    pub metrics: MetricOptions,
    pub error_policy: ErrorPolicy,

    /// Number of concurrent evaluation tasks.
    pub workers: usize,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            k_values: vec![10, 100],
            tuples: vec![1],
            votes: vec![1],
            exclusion: Exclusion::None,
            universe: UniverseMode::Corpus,
            ground_truth: GroundTruthKind::RelatedPages,
            seed: 0,
            require_full_top_k: true,
            metrics: MetricOptions::default(),
            error_policy: ErrorPolicy::Skip,
            workers: 4,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataPaths,
    pub evaluation: EvaluationSettings,
    /// Engine variants to evaluate.
    pub configurations: Vec<Configuration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataPaths::default(),
            evaluation: EvaluationSettings::default(),
            configurations: Configuration::standard_matrix(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and a config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (EVAL_TABLES_DIR, EVAL_RESULTS_DIR, ...)
    /// 2. `explicit` config file, else ~/.config/table-search-eval/config.yaml
    /// 3. Default values
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::config_file_path() {
                Some(path) if path.exists() => Self::load_from_file(&path)?,
                _ => Config::default(),
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        let paths = [
            ("EVAL_TABLES_DIR", &mut self.data.tables_dir),
            ("EVAL_GROUND_TRUTH_DIR", &mut self.data.ground_truth_dir),
            ("EVAL_WIKIPAGES_FILE", &mut self.data.wikipages_file),
            ("EVAL_QUERIES_FILE", &mut self.data.queries_file),
            ("EVAL_RESULTS_DIR", &mut self.data.results_dir),
        ];
        for (var, slot) in paths {
            if let Ok(value) = env::var(var) {
                *slot = PathBuf::from(value);
            }
        }

        if let Ok(workers) = env::var("EVAL_WORKERS") {
            if let Ok(workers) = workers.parse() {
                self.evaluation.workers = workers;
            }
        }

        if let Ok(seed) = env::var("EVAL_SEED") {
            if let Ok(seed) = seed.parse() {
                self.evaluation.seed = seed;
            }
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse a YAML document; omitted fields keep their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            EvalError::Configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "table-search-eval")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        let required = |path: &Path, what: &str, var: &str| {
            if path.as_os_str().is_empty() {
                Err(EvalError::Configuration(format!(
                    "{what} is required. Set {var} environment variable or add to config file."
                )))
            } else {
                Ok(())
            }
        };

        required(&self.data.tables_dir, "Tables directory", "EVAL_TABLES_DIR")?;
        required(&self.data.queries_file, "Queries file", "EVAL_QUERIES_FILE")?;
        required(&self.data.results_dir, "Results directory", "EVAL_RESULTS_DIR")?;
        if self.evaluation.ground_truth == GroundTruthKind::RelatedPages {
            required(
                &self.data.ground_truth_dir,
                "Ground truth directory",
                "EVAL_GROUND_TRUTH_DIR",
            )?;
            required(
                &self.data.wikipages_file,
                "Wikipages file",
                "EVAL_WIKIPAGES_FILE",
            )?;
        }

        let eval = &self.evaluation;
        if eval.k_values.is_empty() || eval.k_values.contains(&0) {
            return Err(EvalError::Configuration(
                "k_values must be a non-empty list of positive cutoffs".to_string(),
            ));
        }
        if eval.tuples.is_empty() || eval.votes.is_empty() {
            return Err(EvalError::Configuration(
                "tuples and votes must not be empty".to_string(),
            ));
        }
        if eval.workers == 0 {
            return Err(EvalError::Configuration(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.configurations.is_empty() {
            return Err(EvalError::Configuration(
                "at least one configuration must be listed".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a config from explicit paths (useful for testing).
    pub fn with_data(
        tables_dir: impl Into<PathBuf>,
        queries_file: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data: DataPaths {
                tables_dir: tables_dir.into(),
                queries_file: queries_file.into(),
                results_dir: results_dir.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
