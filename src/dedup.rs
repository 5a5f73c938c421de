use std::collections::HashSet;

use tracing::debug;

use crate::record::QuoteRecord;
use crate::source::DedupKey;

/// Drop later records whose key was already seen. Order is preserved.
pub fn dedupe(records: Vec<QuoteRecord>, key: DedupKey) -> Vec<QuoteRecord> {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<QuoteRecord> = records
        .into_iter()
        .filter(|r| seen.insert(key.key_for(r)))
        .collect();
    if unique.len() < before {
        debug!(dropped = before - unique.len(), "Removed duplicate quotes");
    }
    unique
}
