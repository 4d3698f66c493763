//! The four demo stages, composed from the pure pipeline operations.
//!
//! Views own their records so handlers can return them without borrowing
//! from the shared snapshot.

use serde::Serialize;
use tracing::debug;

use crate::constants::{POOL_SIZE, SHORTLIST_SIZE};
use crate::pipeline::{
    build_pool, build_shortlist, classify, finalize, rank_by_ml_score, TriageThresholds,
};
use crate::types::{CatalogRecord, PropertyRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolView {
    pub total_count: usize,
    pub items: Vec<CatalogRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistView {
    pub selected_count: usize,
    pub total_count: usize,
    pub items: Vec<CatalogRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    #[serde(flatten)]
    pub record: CatalogRecord,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedView {
    pub items: Vec<RankedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageView {
    pub confirmed: Vec<CatalogRecord>,
    pub rejected: Vec<CatalogRecord>,
    pub pending: Vec<CatalogRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalView {
    pub confirmed: Vec<CatalogRecord>,
    pub rejected: Vec<CatalogRecord>,
}

/// Catalog record joined with the searched property on name and address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub property_supplier_type: String,
    pub property_supplier_property_seq: String,
    #[serde(flatten)]
    pub record: CatalogRecord,
}

/// Sizes and thresholds for one run of the stages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingSteps {
    pub pool_size: usize,
    pub shortlist_size: usize,
    pub thresholds: TriageThresholds,
}

impl Default for MatchingSteps {
    fn default() -> Self {
        Self {
            pool_size: POOL_SIZE,
            shortlist_size: SHORTLIST_SIZE,
            thresholds: TriageThresholds::default(),
        }
    }
}

fn owned(records: &[&CatalogRecord]) -> Vec<CatalogRecord> {
    records.iter().map(|&r| r.clone()).collect()
}

impl MatchingSteps {
    /// Candidate pool shown on the grid
    pub fn pool(&self, records: &[CatalogRecord]) -> PoolView {
        let pool = build_pool(records, self.pool_size);
        PoolView {
            total_count: pool.len(),
            items: owned(&pool),
        }
    }

    /// Step 1: survivors of the first cut
    pub fn shortlist(&self, records: &[CatalogRecord]) -> ShortlistView {
        let pool = build_pool(records, self.pool_size);
        let shortlist = build_shortlist(&pool, self.shortlist_size);
        debug!(pool = pool.len(), shortlist = shortlist.len(), "Built shortlist");
        ShortlistView {
            selected_count: shortlist.len(),
            total_count: pool.len(),
            items: owned(&shortlist),
        }
    }

    /// Step 2: shortlist ordered by ML score
    pub fn ranked(&self, records: &[CatalogRecord]) -> RankedView {
        let pool = build_pool(records, self.pool_size);
        let shortlist = build_shortlist(&pool, self.shortlist_size);
        let items = rank_by_ml_score(&shortlist)
            .into_iter()
            .map(|ranked| RankedItem {
                record: ranked.record.clone(),
                rank: ranked.rank,
            })
            .collect();
        RankedView { items }
    }

    /// Step 3: automatic triage of the ranked shortlist
    pub fn triage(&self, records: &[CatalogRecord]) -> TriageView {
        let ordered = self.ranked_shortlist(records);
        let triage = classify(&ordered, self.thresholds);
        debug!(
            confirmed = triage.confirmed.len(),
            rejected = triage.rejected.len(),
            pending = triage.pending.len(),
            "Triaged shortlist"
        );
        TriageView {
            confirmed: owned(&triage.confirmed),
            rejected: owned(&triage.rejected),
            pending: owned(&triage.pending),
        }
    }

    /// Step 4: final answer driven by ground truth
    pub fn finalize(&self, records: &[CatalogRecord]) -> FinalView {
        let ordered = self.ranked_shortlist(records);
        let selection = finalize(&ordered);
        FinalView {
            confirmed: owned(&selection.confirmed),
            rejected: owned(&selection.rejected),
        }
    }

    fn ranked_shortlist<'a>(&self, records: &'a [CatalogRecord]) -> Vec<&'a CatalogRecord> {
        let pool = build_pool(records, self.pool_size);
        let shortlist = build_shortlist(&pool, self.shortlist_size);
        rank_by_ml_score(&shortlist)
            .into_iter()
            .map(|ranked| ranked.record)
            .collect()
    }
}

/// Inner join of the catalog against the property on `(name, address)`
pub fn merge_with_property(property: &PropertyRecord, records: &[CatalogRecord]) -> Vec<MergedRecord> {
    records
        .iter()
        .filter(|r| r.matches_property(property))
        .map(|r| MergedRecord {
            property_supplier_type: property.supplier_type.to_string(),
            property_supplier_property_seq: property.supplier_property_seq.clone(),
            record: r.clone(),
        })
        .collect()
}
