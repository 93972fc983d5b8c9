//! Search-system configurations and where their output lives.
//!
//! Every evaluated variant is an [`EvaluationKey`]: which engine
//! configuration ran, how many query tuples it was given, the top-k it was
//! asked for and the LSH vote threshold. Keys are totally ordered so they can
//! index one flat map of metric distributions.

use crate::universe::TableId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Entity representation an LSH or baseline run searched over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LshMode {
    Types,
    Embeddings,
}

impl LshMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LshMode::Types => "types",
            LshMode::Embeddings => "embeddings",
        }
    }
}

/// Which BM25 query representation was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bm25Field {
    Entities,
    Text,
}

impl Bm25Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Bm25Field::Entities => "entities",
            Bm25Field::Text => "text",
        }
    }
}

/// An engine variant under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Configuration {
    TypesLsh { vectors: u32, band_size: u32 },
    EmbeddingsLsh { vectors: u32, band_size: u32 },
    ColumnAggregated { mode: LshMode, vectors: u32, band_size: u32 },
    Bm25 { field: Bm25Field },
    /// Brute-force search: Jaccard over types, cosine over embeddings.
    Baseline { mode: LshMode },
    Bm25Prefilter { mode: LshMode },
}

impl Configuration {
    /// Short label for tables and plots, e.g. `T(V=32, BS=8)`.
    pub fn label(&self) -> String {
        match self {
            Configuration::TypesLsh { vectors, band_size } => {
                format!("T(V={vectors}, BS={band_size})")
            }
            Configuration::EmbeddingsLsh { vectors, band_size } => {
                format!("E(V={vectors}, BS={band_size})")
            }
            Configuration::ColumnAggregated {
                mode,
                vectors,
                band_size,
            } => {
                let prefix = match mode {
                    LshMode::Types => "TC",
                    LshMode::Embeddings => "EC",
                };
                format!("{prefix}(V={vectors}, BS={band_size})")
            }
            Configuration::Bm25 { field } => format!("BM25 - {}", field.as_str()),
            Configuration::Baseline { mode: LshMode::Types } => "B - Jaccard".to_string(),
            Configuration::Baseline {
                mode: LshMode::Embeddings,
            } => "B - Cosine".to_string(),
            Configuration::Bm25Prefilter { mode } => format!("BM25 prefilter - {}", mode.as_str()),
        }
    }

    /// Whether the LSH vote threshold is part of this configuration's output path.
    pub fn uses_vote(&self) -> bool {
        matches!(
            self,
            Configuration::TypesLsh { .. }
                | Configuration::EmbeddingsLsh { .. }
                | Configuration::ColumnAggregated { .. }
        )
    }

    /// Format of the engine output for this configuration.
    pub fn score_format(&self) -> ScoreFormat {
        match self {
            Configuration::Bm25 { .. } => ScoreFormat::RankedTsv,
            _ => ScoreFormat::Json,
        }
    }

    /// The configuration matrix compared in the LSH evaluation.
    pub fn standard_matrix() -> Vec<Configuration> {
        let params = [(30, 10), (32, 8), (128, 8)];
        let mut configs = Vec::new();
        for (vectors, band_size) in params {
            configs.push(Configuration::TypesLsh { vectors, band_size });
        }
        for (vectors, band_size) in params {
            configs.push(Configuration::EmbeddingsLsh { vectors, band_size });
        }
        for mode in [LshMode::Types, LshMode::Embeddings] {
            for (vectors, band_size) in params {
                configs.push(Configuration::ColumnAggregated {
                    mode,
                    vectors,
                    band_size,
                });
            }
        }
        configs.push(Configuration::Baseline { mode: LshMode::Types });
        configs.push(Configuration::Baseline {
            mode: LshMode::Embeddings,
        });
        configs.push(Configuration::Bm25 {
            field: Bm25Field::Entities,
        });
        configs.push(Configuration::Bm25 {
            field: Bm25Field::Text,
        });
        configs.push(Configuration::Bm25Prefilter { mode: LshMode::Types });
        configs.push(Configuration::Bm25Prefilter {
            mode: LshMode::Embeddings,
        });
        configs
    }
}

/// On-disk format of a predicted-score source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFormat {
    /// `filenameToScore.json`, one file per query.
    Json,
    /// Tab-separated BM25 ranking shared by all queries.
    RankedTsv,
}

/// Composite key for one evaluated variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationKey {
    pub configuration: Configuration,
    pub tuples: u32,
    pub k: usize,
    pub vote: u32,
}

impl fmt::Display for EvaluationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | vote={} tuples={} k={}",
            self.configuration.label(),
            self.vote,
            self.tuples,
            self.k
        )
    }
}

/// Identifier of a query in result paths (`wikipage_<id>`).
pub fn query_dir_name(wikipage_id: u64) -> String {
    format!("wikipage_{wikipage_id}")
}

/// Location of the engine output for `key` and `query`.
///
/// BM25 rankings are one file per (k, tuples, field) shared by every query,
/// so `query` does not appear in their path.
pub fn path_for(results_dir: &Path, key: &EvaluationKey, query: &str) -> PathBuf {
    let k = key.k.to_string();
    let tuples = format!("{}-tuple", key.tuples);
    let vote = format!("vote_{}", key.vote);
    let search_output = |base: PathBuf| {
        base.join(&k)
            .join(&tuples)
            .join("search_output")
            .join(query)
            .join("filenameToScore.json")
    };

    match key.configuration {
        Configuration::TypesLsh { vectors, band_size } => search_output(
            lsh_dir(results_dir.join(&vote), LshMode::Types, vectors, band_size),
        ),
        Configuration::EmbeddingsLsh { vectors, band_size } => search_output(
            lsh_dir(results_dir.join(&vote), LshMode::Embeddings, vectors, band_size),
        ),
        Configuration::ColumnAggregated {
            mode,
            vectors,
            band_size,
        } => search_output(lsh_dir(
            results_dir.join(&vote).join("aggregation"),
            mode,
            vectors,
            band_size,
        )),
        Configuration::Baseline { mode } => {
            let similarity = match mode {
                LshMode::Types => "baseline_jaccard",
                LshMode::Embeddings => "baseline_cosine",
            };
            search_output(results_dir.join("baseline").join(similarity))
        }
        Configuration::Bm25Prefilter { mode } => search_output(
            results_dir
                .join("baseline")
                .join("baseline_bm25_prefiltering")
                .join(mode.as_str()),
        ),
        Configuration::Bm25 { field } => results_dir
            .join("baseline")
            .join("bm25")
            .join(&k)
            .join(&tuples)
            .join(field.as_str())
            .join("content.txt"),
    }
}

fn lsh_dir(base: PathBuf, mode: LshMode, vectors: u32, band_size: u32) -> PathBuf {
    base.join(mode.as_str())
        .join(format!("vectors_{vectors}"))
        .join(format!("bandsize_{band_size}"))
}

/// A query: a wikipage whose tables were used to sample query tuples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub wikipage_id: u64,
    /// Full wikipage URL.
    pub wikipage: String,
    /// Tables on the query's wikipage.
    pub tables: Vec<TableId>,
    /// The table the query tuples were taken from, if known.
    #[serde(default)]
    pub selected_table: Option<TableId>,
}

impl Query {
    pub fn id(&self) -> String {
        query_dir_name(self.wikipage_id)
    }
}
