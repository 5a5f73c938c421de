use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::dedup::dedupe;
use crate::error::{QuoteError, Result};
use crate::fetch::{decode_body, Fetcher};
use crate::parser;
use crate::settings::Settings;
use crate::source::{Source, SourceConfig};
use crate::store;

/// Outcome of one extractor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub source: Source,
    pub parsed: usize,
    pub unique: usize,
    /// `None` when nothing was written.
    pub path: Option<PathBuf>,
}

/// Fetch, parse, dedupe and persist one source.
pub async fn run(source: Source, settings: &Settings) -> Result<RunReport> {
    let config = source.config();
    info!(%source, "Starting {} quote extraction", config.title);
    let t0 = Instant::now();

    let fetcher = Fetcher::new(settings, config)?;
    let body = fetcher.fetch(config.url, config.encodings).await?;
    let report = process(config, &body, &settings.output_path(config.output_file))?;

    info!(
        %source,
        unique = report.unique,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Extraction finished"
    );
    Ok(report)
}

/// Same as `run` but reads the document from disk.
pub fn run_file(
    source: Source,
    input: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<RunReport> {
    let config = source.config();
    let bytes = fs::read(input).map_err(|e| QuoteError::io(input, e))?;
    let (body, encoding) = decode_body(&bytes, config.encodings)?;
    info!(%source, encoding = encoding.label(), "Parsing {}", input.display());

    let path = match output {
        Some(p) => p.to_path_buf(),
        None => settings.output_path(config.output_file),
    };
    process(config, &body, &path)
}

/// Parse → dedupe → persist. Parse errors abort before anything is written.
pub fn process(config: &SourceConfig, body: &str, path: &Path) -> Result<RunReport> {
    let records = parser::parse(config, body)?;
    let parsed = records.len();
    let unique = dedupe(records, config.dedup);
    let written = store::write_records(path, &unique)?;

    Ok(RunReport {
        source: config.source,
        parsed,
        unique: unique.len(),
        path: written.then(|| path.to_path_buf()),
    })
}
