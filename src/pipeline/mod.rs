//! Candidate-pool selection and staged triage.
//!
//! Every function here is a pure transformation over borrowed records: the
//! same input slice (in the same order) always yields the same output.

pub mod rounding;

use std::collections::HashSet;

use crate::constants::{CONFIRM_THRESHOLD, REJECT_THRESHOLD, SCORE_DECIMALS};
use crate::types::{CatalogRecord, IdentityKey, RankedRecord};

pub use rounding::round_half_up;

/// Score cut-offs for the automatic triage step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriageThresholds {
    /// Rounded ML score at or above which a record is auto-confirmed
    pub confirm: f64,
    /// Rounded ML score at or below which a record is auto-rejected
    pub reject: f64,
}

impl Default for TriageThresholds {
    fn default() -> Self {
        Self {
            confirm: CONFIRM_THRESHOLD,
            reject: REJECT_THRESHOLD,
        }
    }
}

/// Outcome of the threshold-based triage for a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageDecision {
    Confirmed,
    Rejected,
    /// Between the thresholds; left for a later (LLM) verification stage
    Pending,
}

impl TriageThresholds {
    pub fn decide(&self, ml_score: f64) -> TriageDecision {
        let rounded = round_half_up(ml_score, SCORE_DECIMALS);
        if rounded >= self.confirm {
            TriageDecision::Confirmed
        } else if rounded <= self.reject {
            TriageDecision::Rejected
        } else {
            TriageDecision::Pending
        }
    }
}

/// Three-way split of the shortlist. Input order is kept within each bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triage<'a> {
    pub confirmed: Vec<&'a CatalogRecord>,
    pub rejected: Vec<&'a CatalogRecord>,
    pub pending: Vec<&'a CatalogRecord>,
}

/// Terminal split used by the last step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalSelection<'a> {
    pub confirmed: Vec<&'a CatalogRecord>,
    pub rejected: Vec<&'a CatalogRecord>,
}

/// Seed with every correct record, then fill with the highest similarity
/// scores until `target_size` is reached.
///
/// If the correct records alone exceed `target_size` the result is cut at
/// `target_size`, so the inclusion guarantee only holds up to that size.
pub fn build_pool(records: &[CatalogRecord], target_size: usize) -> Vec<&CatalogRecord> {
    let mut seen: HashSet<IdentityKey<'_>> = HashSet::new();
    let mut pool: Vec<&CatalogRecord> = Vec::with_capacity(target_size);

    for record in records.iter().filter(|r| r.is_correct) {
        if seen.insert(record.identity_key()) {
            pool.push(record);
        }
    }

    // sort_by is stable, ties keep their input order
    let mut by_similarity: Vec<&CatalogRecord> = records.iter().collect();
    by_similarity.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));

    fill(&mut pool, &mut seen, by_similarity, target_size);
    pool.truncate(target_size);
    pool
}

/// Same seed-then-fill strategy as [`build_pool`], restricted to `pool` and
/// filled in the pool's own order.
pub fn build_shortlist<'a>(pool: &[&'a CatalogRecord], target_size: usize) -> Vec<&'a CatalogRecord> {
    let mut seen: HashSet<IdentityKey<'a>> = HashSet::new();
    let mut shortlist: Vec<&'a CatalogRecord> = Vec::with_capacity(target_size);

    for &record in pool.iter().filter(|r| r.is_correct) {
        if seen.insert(record.identity_key()) {
            shortlist.push(record);
        }
    }

    fill(&mut shortlist, &mut seen, pool.iter().copied(), target_size);
    shortlist.truncate(target_size);
    shortlist
}

fn fill<'a>(
    out: &mut Vec<&'a CatalogRecord>,
    seen: &mut HashSet<IdentityKey<'a>>,
    source: impl IntoIterator<Item = &'a CatalogRecord>,
    target_size: usize,
) {
    for record in source {
        if out.len() >= target_size {
            break;
        }
        if seen.insert(record.identity_key()) {
            out.push(record);
        }
    }
}

/// Order by ML score, highest first, and number the result from 1
pub fn rank_by_ml_score<'a>(shortlist: &[&'a CatalogRecord]) -> Vec<RankedRecord<'a>> {
    let mut ordered: Vec<&'a CatalogRecord> = shortlist.to_vec();
    ordered.sort_by(|a, b| b.ml_score.total_cmp(&a.ml_score));
    ordered
        .into_iter()
        .enumerate()
        .map(|(idx, record)| RankedRecord { record, rank: idx + 1 })
        .collect()
}

/// Bucket each record by its ML score rounded to the displayed precision
pub fn classify<'a>(shortlist: &[&'a CatalogRecord], thresholds: TriageThresholds) -> Triage<'a> {
    let mut triage = Triage::default();
    for &record in shortlist {
        match thresholds.decide(record.ml_score) {
            TriageDecision::Confirmed => triage.confirmed.push(record),
            TriageDecision::Rejected => triage.rejected.push(record),
            TriageDecision::Pending => triage.pending.push(record),
        }
    }
    triage
}

/// Ground truth wins: correct records are confirmed, everything else is
/// rejected, whatever `classify` said about them.
pub fn finalize<'a>(shortlist: &[&'a CatalogRecord]) -> FinalSelection<'a> {
    let (confirmed, rejected) = shortlist.iter().copied().partition(|r| r.is_correct);
    FinalSelection { confirmed, rejected }
}
