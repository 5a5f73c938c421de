use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use crate::dedup::dedupe;
use crate::error::{QuoteError, Result};
use crate::record::QuoteRecord;
use crate::settings::Settings;
use crate::source::{DedupKey, Source};
use crate::store;

/// Combined file read by the quote-of-the-day page.
pub const MERGED_FILE: &str = "quotes.json";

#[derive(Debug)]
pub struct MergeReport {
    pub per_source: Vec<(Source, usize)>,
    pub total: usize,
    pub path: Option<PathBuf>,
}

/// Concatenate every per-source file present, in `Source::ALL` order, and
/// write the deduplicated result to `quotes.json`.
pub fn merge(settings: &Settings) -> Result<MergeReport> {
    let mut all = Vec::new();
    let mut per_source = Vec::new();

    for source in Source::ALL {
        let path = settings.output_path(source.config().output_file);
        if !path.exists() {
            warn!(%source, "No output at {}, skipping", path.display());
            continue;
        }
        let records = store::read_records(&path)?;
        per_source.push((source, records.len()));
        all.extend(records);
    }

    let merged = dedupe(all, DedupKey::Text);
    let path = settings.output_path(MERGED_FILE);
    let written = store::write_records(&path, &merged)?;
    info!(total = merged.len(), "Merged quotes");

    Ok(MergeReport {
        per_source,
        total: merged.len(),
        path: written.then_some(path),
    })
}

/// Entry at `(day_of_year - 1) % len`.
pub fn quote_for(records: &[QuoteRecord], date: NaiveDate) -> Option<&QuoteRecord> {
    if records.is_empty() {
        return None;
    }
    records.get(date.ordinal0() as usize % records.len())
}

pub fn daily_quote(settings: &Settings, date: NaiveDate) -> Result<QuoteRecord> {
    let path = settings.output_path(MERGED_FILE);
    let records = store::read_records(&path)?;
    quote_for(&records, date)
        .cloned()
        .ok_or(QuoteError::NoQuotes(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(text: &str) -> QuoteRecord {
        QuoteRecord::new(text.into(), format!("src of {}", text), "Various")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_of_year_indexes_from_zero() {
        let records = vec![rec("a"), rec("b"), rec("c")];
        assert_eq!(quote_for(&records, date(2024, 1, 1)).unwrap().text, "a");
        assert_eq!(quote_for(&records, date(2024, 1, 2)).unwrap().text, "b");
        // day 32 -> index 31 % 3 == 1
        assert_eq!(quote_for(&records, date(2024, 2, 1)).unwrap().text, "b");
        // leap year: day 366 -> index 365 % 3 == 2
        assert_eq!(quote_for(&records, date(2024, 12, 31)).unwrap().text, "c");
        assert!(quote_for(&[], date(2024, 1, 1)).is_none());
    }

    #[test]
    fn merge_orders_by_source_and_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default().with_data_dir(Some(dir.path().to_path_buf()));

        let kjv = vec![rec("Jesus wept."), rec("Shared line")];
        let dhp = vec![rec("Hatred ceases by love."), rec("Shared  line")];
        store::write_records(&settings.output_path(Source::Kjv.config().output_file), &kjv).unwrap();
        store::write_records(&settings.output_path(Source::Dhammapada.config().output_file), &dhp).unwrap();

        let report = merge(&settings).unwrap();
        assert_eq!(report.per_source, vec![(Source::Dhammapada, 2), (Source::Kjv, 2)]);
        assert_eq!(report.total, 3);

        let merged = store::read_records(&settings.output_path(MERGED_FILE)).unwrap();
        let texts: Vec<&str> = merged.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["Hatred ceases by love.", "Shared  line", "Jesus wept."]);

        let today = daily_quote(&settings, date(2025, 1, 3)).unwrap();
        assert_eq!(today.text, "Jesus wept.");
    }

    #[test]
    fn daily_without_merged_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default().with_data_dir(Some(dir.path().to_path_buf()));
        assert!(daily_quote(&settings, date(2025, 1, 1)).is_err());

        std::fs::write(settings.output_path(MERGED_FILE), "[]").unwrap();
        let err = daily_quote(&settings, date(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, QuoteError::NoQuotes(_)));
    }
}
