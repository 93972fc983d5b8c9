//! Per-configuration metric distributions.
//!
//! A [`MetricSink`] is the one shared mutable resource of a run: workers
//! append records to it concurrently. It is append-only; queries whose engine
//! output is missing are counted as skips and never enter the statistics.

use crate::configuration::EvaluationKey;
use crate::metrics::MetricRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One query's result under one evaluation key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query: String,
    pub record: MetricRecord,
}

/// Everything recorded for one evaluation key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricDistribution {
    pub records: Vec<QueryRecord>,
    /// Queries skipped because the engine produced no usable output.
    pub skipped: Vec<String>,
    /// Queries whose inputs were present but could not be evaluated.
    #[serde(default)]
    pub failed: Vec<String>,
}

impl MetricDistribution {
    pub fn ndcg_values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.record.ndcg).collect()
    }

    pub fn precision_values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.record.precision_at_k).collect()
    }

    pub fn recall_values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.record.recall_at_k).collect()
    }

    /// AUC values; records where AUC was omitted are left out.
    pub fn auc_values(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.record.auc).collect()
    }

    pub fn num_relevant_values(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| r.record.num_relevant_at_k as f64)
            .collect()
    }

    pub fn summarize(&self) -> DistributionSummary {
        DistributionSummary {
            count: self.records.len(),
            skipped: self.skipped.len(),
            failed: self.failed.len(),
            ndcg: FieldSummary::from_values(self.ndcg_values()),
            precision_at_k: FieldSummary::from_values(self.precision_values()),
            recall_at_k: FieldSummary::from_values(self.recall_values()),
            auc: FieldSummary::from_values(self.auc_values()),
            num_relevant_at_k: FieldSummary::from_values(self.num_relevant_values()),
        }
    }
}

/// Mean, population standard deviation and raw values of one metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    /// `None` when there are no values.
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub count: usize,
    pub values: Vec<f64>,
}

impl FieldSummary {
    pub fn from_values(values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean: Some(mean),
            std: Some(variance.sqrt()),
            count: values.len(),
            values,
        }
    }
}

/// Summary of a [`MetricDistribution`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub skipped: usize,
    #[serde(default)]
    pub failed: usize,
    pub ndcg: FieldSummary,
    pub precision_at_k: FieldSummary,
    pub recall_at_k: FieldSummary,
    pub auc: FieldSummary,
    pub num_relevant_at_k: FieldSummary,
}

/// Thread-safe, append-only collection of distributions keyed by [`EvaluationKey`].
#[derive(Debug, Default)]
pub struct MetricSink {
    distributions: Mutex<BTreeMap<EvaluationKey, MetricDistribution>>,
}

impl MetricSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<EvaluationKey, MetricDistribution>> {
        // appends are single pushes, so a poisoned map is still consistent
        self.distributions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a query's metrics.
    pub fn record(&self, key: EvaluationKey, query: impl Into<String>, record: MetricRecord) {
        self.lock().entry(key).or_default().records.push(QueryRecord {
            query: query.into(),
            record,
        });
    }

    /// Note that a query had no engine output for `key`.
    pub fn record_missing(&self, key: EvaluationKey, query: impl Into<String>) {
        self.lock()
            .entry(key)
            .or_default()
            .skipped
            .push(query.into());
    }

    /// Note that a query's evaluation failed under `key`.
    pub fn record_failure(&self, key: EvaluationKey, query: impl Into<String>) {
        self.lock().entry(key).or_default().failed.push(query.into());
    }

    /// Summary for one key, if anything was recorded under it.
    pub fn summarize(&self, key: &EvaluationKey) -> Option<DistributionSummary> {
        self.lock().get(key).map(MetricDistribution::summarize)
    }

    /// Copy of one key's distribution.
    pub fn distribution(&self, key: &EvaluationKey) -> Option<MetricDistribution> {
        self.lock().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<EvaluationKey> {
        self.lock().keys().copied().collect()
    }

    /// Consume the sink, returning every distribution in key order.
    pub fn into_distributions(self) -> BTreeMap<EvaluationKey, MetricDistribution> {
        self.distributions
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Unit counts over a whole report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub evaluated: usize,
    /// No engine output.
    pub skipped: usize,
    pub failed: usize,
}

/// One evaluation key's results in a saved report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub key: EvaluationKey,
    pub summary: DistributionSummary,
    pub distribution: MetricDistribution,
}

/// Everything a run produced, in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub entries: Vec<ReportEntry>,
}

impl EvaluationReport {
    pub fn from_distributions(distributions: BTreeMap<EvaluationKey, MetricDistribution>) -> Self {
        let entries = distributions
            .into_iter()
            .map(|(key, distribution)| ReportEntry {
                key,
                summary: distribution.summarize(),
                distribution,
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &EvaluationKey) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Evaluated, skipped and failed (query, key) units.
    pub fn totals(&self) -> RunTotals {
        self.entries
            .iter()
            .fold(RunTotals::default(), |totals, e| RunTotals {
                evaluated: totals.evaluated + e.summary.count,
                skipped: totals.skipped + e.summary.skipped,
                failed: totals.failed + e.summary.failed,
            })
    }

    pub fn format_table(&self) -> String {
        format_summary_table(self.entries.iter().map(|e| (&e.key, &e.summary)))
    }
}

/// Render summaries as a fixed-width text table.
pub fn format_summary_table<'a>(
    rows: impl IntoIterator<Item = (&'a EvaluationKey, &'a DistributionSummary)>,
) -> String {
    let fmt_stat = |field: &FieldSummary| match (field.mean, field.std) {
        (Some(mean), Some(std)) => format!("{mean:.3}±{std:.3}"),
        _ => "-".to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<44} {:>6} {:>5} {:>5} {:>13} {:>13} {:>13} {:>13}",
        "configuration", "n", "skip", "fail", "ndcg", "precision", "recall", "auc"
    );
    let _ = writeln!(out, "{}", "─".repeat(118));
    for (key, summary) in rows {
        let _ = writeln!(
            out,
            "{:<44} {:>6} {:>5} {:>5} {:>13} {:>13} {:>13} {:>13}",
            key.to_string(),
            summary.count,
            summary.skipped,
            summary.failed,
            fmt_stat(&summary.ndcg),
            fmt_stat(&summary.precision_at_k),
            fmt_stat(&summary.recall_at_k),
            fmt_stat(&summary.auc),
        );
    }
    out
}
