//! Ranking metrics over index-aligned relevance and score vectors.
//!
//! Implements NDCG@k, Precision@k, Recall@k and a rank-sum AUC. All
//! functions are pure; every input vector is one entry per candidate table in
//! the same order.
//!
//! # Ordering
//!
//! Tables are ranked by predicted score, highest first. Equal scores keep
//! their original relative order (stable sort), so results are deterministic.
//!
//! # AUC
//!
//! The AUC is the Mann-Whitney statistic written in terms of rank sums
//! (formula from arXiv:1912.02263):
//!
//! ```text
//! AUC = (n - (r - 1) / 2 - Σ rank(relevant) / r) / (n - r)
//! ```
//!
//! Only tables the engine scored are ranked, with tied scores sharing their
//! average rank. A relevant table the engine never returned is placed at the
//! mean of the remaining ranks `scored + 1 ..= n`.

use crate::alignment::AlignedScores;
use crate::error::MetricError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Gain function used by DCG.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gain {
    /// `rel`
    #[default]
    Linear,
    /// `2^rel - 1`
    Exponential,
}

impl Gain {
    fn apply(self, rel: f64) -> f64 {
        match self {
            Gain::Linear => rel,
            Gain::Exponential => rel.exp2() - 1.0,
        }
    }
}

/// What to do when AUC is undefined (no relevant tables, or nothing but).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AucPolicy {
    /// Fail the whole evaluation.
    #[default]
    Strict,
    /// Record `auc: None` and keep the other metrics.
    Omit,
}

/// Options for [`evaluate_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricOptions {
    #[serde(default)]
    pub gain: Gain,
    #[serde(default)]
    pub auc: AucPolicy,
}

/// Metrics for one query at one cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Effective cutoff: the requested k clamped to the universe size.
    pub k: usize,
    pub ndcg: f64,
    pub precision_at_k: f64,
    pub recall_at_k: f64,
    /// `None` only under [`AucPolicy::Omit`] when AUC is undefined.
    pub auc: Option<f64>,
    pub num_relevant_at_k: usize,
}

/// Evaluate with default options (linear gain, strict AUC).
pub fn evaluate(
    relevance: &[f64],
    scores: &AlignedScores,
    k: usize,
) -> Result<MetricRecord, MetricError> {
    evaluate_with(relevance, scores, k, &MetricOptions::default())
}

/// Compute every metric for one query.
///
/// `k` larger than the number of candidates is clamped to it; the record
/// carries the clamped value.
pub fn evaluate_with(
    relevance: &[f64],
    scores: &AlignedScores,
    k: usize,
    options: &MetricOptions,
) -> Result<MetricRecord, MetricError> {
    let k = validate(relevance, scores.values(), k)?;
    let order = ranking(scores.values());

    let num_relevant_at_k = count_relevant(relevance, &order[..k]);
    let total_relevant = relevance.iter().filter(|r| **r > 0.0).count();

    let auc = match auc(relevance, scores) {
        Ok(value) => Some(value),
        Err(err @ (MetricError::NoRelevantItems { .. } | MetricError::AllRelevant { .. })) => {
            match options.auc {
                AucPolicy::Strict => return Err(err),
                AucPolicy::Omit => None,
            }
        }
        Err(err) => return Err(err),
    };

    Ok(MetricRecord {
        k,
        ndcg: ndcg_ordered(relevance, &order, k, options.gain),
        precision_at_k: num_relevant_at_k as f64 / k as f64,
        recall_at_k: ratio(num_relevant_at_k, total_relevant),
        auc,
        num_relevant_at_k,
    })
}

/// NDCG@k. Returns 0 when no table is relevant.
pub fn ndcg_at_k(relevance: &[f64], scores: &[f64], k: usize, gain: Gain) -> Result<f64, MetricError> {
    let k = validate(relevance, scores, k)?;
    Ok(ndcg_ordered(relevance, &ranking(scores), k, gain))
}

/// Number of relevant tables (relevance > 0) in the top k by score.
pub fn num_relevant_at_k(relevance: &[f64], scores: &[f64], k: usize) -> Result<usize, MetricError> {
    let k = validate(relevance, scores, k)?;
    Ok(count_relevant(relevance, &ranking(scores)[..k]))
}

/// Precision@k.
pub fn precision_at_k(relevance: &[f64], scores: &[f64], k: usize) -> Result<f64, MetricError> {
    let k = validate(relevance, scores, k)?;
    let hits = count_relevant(relevance, &ranking(scores)[..k]);
    Ok(hits as f64 / k as f64)
}

/// Recall@k. Returns 0 when no table is relevant.
pub fn recall_at_k(relevance: &[f64], scores: &[f64], k: usize) -> Result<f64, MetricError> {
    let k = validate(relevance, scores, k)?;
    let hits = count_relevant(relevance, &ranking(scores)[..k]);
    let total = relevance.iter().filter(|r| **r > 0.0).count();
    Ok(ratio(hits, total))
}

/// Rank-sum AUC. See the module docs for the treatment of unscored tables.
pub fn auc(relevance: &[f64], scores: &AlignedScores) -> Result<f64, MetricError> {
    validate(relevance, scores.values(), 1)?;

    let n = relevance.len();
    let r = relevance.iter().filter(|rel| **rel > 0.0).count();
    if r == 0 {
        return Err(MetricError::NoRelevantItems { n });
    }
    if r == n {
        return Err(MetricError::AllRelevant { n });
    }

    let scored: Vec<usize> = (0..n).filter(|&i| scores.is_scored(i)).collect();
    let scored_values: Vec<f64> = scored.iter().map(|&i| scores.values()[i]).collect();
    let mut ranks = vec![None; n];
    for (&i, rank) in scored.iter().zip(average_ranks(&scored_values)) {
        ranks[i] = Some(rank);
    }

    let tail_rank = tail_average_rank(n, scored.len());
    let rank_sum: f64 = (0..n)
        .filter(|&i| relevance[i] > 0.0)
        .map(|i| ranks[i].unwrap_or(tail_rank))
        .sum();

    let (n, r) = (n as f64, r as f64);
    Ok((n - (r - 1.0) / 2.0 - rank_sum / r) / (n - r))
}

/// 1-based ranks by descending score, tied scores sharing their mean rank.
pub fn average_ranks(scores: &[f64]) -> Vec<f64> {
    let order = ranking(scores);
    let mut ranks = vec![0.0; scores.len()];

    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && descending(scores, order[start], order[end]) == Ordering::Equal {
            end += 1;
        }
        // positions start..end hold raw ranks start+1 ..= end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

/// Mean of the integer ranks `scored + 1 ..= n`.
fn tail_average_rank(n: usize, scored: usize) -> f64 {
    (scored + 1 + n) as f64 / 2.0
}

/// Indices sorted by score, highest first, ties in original order.
fn ranking(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| descending(scores, a, b));
    order
}

fn descending(values: &[f64], a: usize, b: usize) -> Ordering {
    values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal)
}

fn ndcg_ordered(relevance: &[f64], order: &[usize], k: usize, gain: Gain) -> f64 {
    let idcg = dcg(relevance, &ranking(relevance)[..k], gain);
    if idcg == 0.0 {
        return 0.0;
    }
    dcg(relevance, &order[..k], gain) / idcg
}

fn dcg(relevance: &[f64], top: &[usize], gain: Gain) -> f64 {
    top.iter()
        .enumerate()
        .map(|(pos, &i)| gain.apply(relevance[i]) / (pos as f64 + 2.0).log2())
        .sum()
}

fn count_relevant(relevance: &[f64], top: &[usize]) -> usize {
    top.iter().filter(|&&i| relevance[i] > 0.0).count()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Check shapes and values; returns k clamped to the vector length.
fn validate(relevance: &[f64], scores: &[f64], k: usize) -> Result<usize, MetricError> {
    if relevance.len() != scores.len() {
        return Err(MetricError::LengthMismatch {
            relevance: relevance.len(),
            scores: scores.len(),
        });
    }
    if k == 0 {
        return Err(MetricError::ZeroCutoff);
    }
    if relevance.is_empty() {
        return Err(MetricError::EmptyInput);
    }
    for (index, &value) in relevance.iter().enumerate() {
        if !value.is_finite() {
            return Err(MetricError::NonFinite {
                field: "relevance",
                index,
            });
        }
        if value < 0.0 {
            return Err(MetricError::NegativeRelevance { value, index });
        }
    }
    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(MetricError::NonFinite {
            field: "score",
            index,
        });
    }
    Ok(k.min(relevance.len()))
}
