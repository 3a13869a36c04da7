//! Batch enrichment: attach resolved descriptions/categories to parsed
//! transactions before they are handed to the persistence collaborator.

use std::collections::HashSet;

use fatura_core::ParsedTransaction;
use serde::Serialize;

use crate::mapping::{MappingSnapshot, resolve};

/// A parsed transaction plus its resolved ledger description and category,
/// the hand-off shape for storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTransaction {
    pub transaction: ParsedTransaction,
    pub simplified_description: String,
    pub category: Option<String>,
}

/// Output of one enrichment pass.
#[derive(Debug, Default, Serialize)]
pub struct EnrichmentReport {
    pub transactions: Vec<EnrichedTransaction>,
    /// Canonical descriptions with no mapping, deduplicated, in order of
    /// first appearance. Reported as candidates for a user-created mapping,
    /// never auto-learned.
    pub unmapped: Vec<String>,
}

/// Resolve every transaction against the snapshot. The snapshot is
/// read-only for the whole pass, so the result is deterministic for a given
/// input order.
pub fn enrich_transactions(
    transactions: Vec<ParsedTransaction>,
    snapshot: &MappingSnapshot,
) -> EnrichmentReport {
    let mut report = EnrichmentReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for txn in transactions {
        let resolved = resolve(&txn.description, snapshot);
        if !resolved.matched && seen.insert(resolved.simplified.clone()) {
            // On a miss the simplified form IS the canonical form.
            report.unmapped.push(resolved.simplified.clone());
        }
        report.transactions.push(EnrichedTransaction {
            transaction: txn,
            simplified_description: resolved.simplified,
            category: resolved.category,
        });
    }

    report
}
