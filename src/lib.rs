//! Table Search Eval - ranking-metric evaluation for semantic table search.
//!
//! Search engines that return tables for a query (LSH over entity types or
//! embeddings, column aggregation, BM25, brute-force baselines) are compared
//! by scoring their output against graded ground truth.
//!
//! # Overview
//!
//! For each query:
//! 1. A [`CandidateUniverse`] of tables is fixed (the whole corpus, or the
//!    query page's tables plus seeded distractors)
//! 2. A [`RelevanceMap`] is built by max-merging ground-truth sources
//! 3. The engine's sparse scores are aligned to the universe, unscored tables
//!    getting 0
//! 4. NDCG@k, Precision@k, Recall@k and rank-sum AUC are computed
//!
//! Records are collected per [`EvaluationKey`] into distributions with mean,
//! standard deviation and raw values.
//!
//! # Quick Start
//!
//! ```no_run
//! use table_search_eval::{Config, Evaluator, persistence::save_report};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let evaluator = Evaluator::new(config)?;
//!
//!     let queries = evaluator.load_queries()?;
//!     let report = evaluator.run(&queries).await?;
//!
//!     print!("{}", report.format_table());
//!     save_report(&report, Path::new("evaluation_report.json"))?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **universe / relevance**: candidate tables and their graded relevance
//! - **alignment**: sparse engine scores to dense, index-aligned vectors
//! - **metrics**: the ranking metrics themselves
//! - **aggregate**: thread-safe sink and per-key summaries
//! - **configuration / sources**: what was run and where its output lives
//! - **runner**: the concurrent batch driver

pub mod aggregate;
pub mod alignment;
pub mod config;
pub mod configuration;
pub mod error;
pub mod metrics;
pub mod persistence;
pub mod relevance;
pub mod runner;
pub mod sources;
pub mod universe;

// Re-export commonly used types
pub use aggregate::{
    DistributionSummary, EvaluationReport, MetricDistribution, MetricSink, RunTotals,
};
pub use alignment::{AlignedScores, Exclusion, PredictedScores, align, prepare};
pub use config::Config;
pub use configuration::{Configuration, EvaluationKey, Query, path_for};
pub use error::{EvalError, MetricError, Result};
pub use metrics::{MetricOptions, MetricRecord, evaluate, evaluate_with};
pub use persistence::{load_report, save_report};
pub use relevance::{GroundTruthSource, RelevanceMap};
pub use runner::Evaluator;
pub use universe::{CandidateUniverse, TableId};
