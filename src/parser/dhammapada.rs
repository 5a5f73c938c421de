use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use super::unit::{Accumulator, Unit};
use crate::error::{QuoteError, Result};
use crate::record::QuoteRecord;
use crate::source::SourceConfig;

static START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)chapter i\. the twin-verses").unwrap());
static ALT_START_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)dhammapada").unwrap());
static CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^chapter\s+[IVXLCDM]+\.\s*(.*)").unwrap());
static VERSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d+)\.\s*(.+)").unwrap());
static END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:end of the project gutenberg ebook|\*\*\* end of the project gutenberg ebook)")
        .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
struct VerseLabel {
    chapter: String,
    number: String,
}

pub fn parse(config: &SourceConfig, document: &str) -> Result<Vec<QuoteRecord>> {
    let body = locate_start(document)?;
    Ok(scan(config, body))
}

/// Text from "Chapter I. The Twin-Verses" on, else from the line after the
/// first "DHAMMAPADA". Neither present means there is nothing to parse.
pub fn locate_start(document: &str) -> Result<&str> {
    if let Some(m) = START_RE.find(document) {
        return Ok(&document[m.start()..]);
    }
    if let Some(offset) = super::text::line_after(document, &ALT_START_RE) {
        return Ok(&document[offset..]);
    }
    Err(QuoteError::MarkerNotFound("Chapter I. The Twin-Verses / DHAMMAPADA"))
}

/// Line scan: chapter headings and numbered verses are boundaries, anything
/// else continues the open verse.
pub fn scan(config: &SourceConfig, body: &str) -> Vec<QuoteRecord> {
    let mut acc = Accumulator::new();
    acc.begin();
    let mut chapter = String::new();
    let mut quotes = Vec::new();

    for raw in body.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if END_RE.is_match(line) {
            info!("Found end of ebook marker");
            break;
        }

        if let Some(caps) = CHAPTER_RE.captures(line) {
            if let Some(unit) = acc.close() {
                quotes.push(to_record(config, unit));
            }
            chapter = caps[1].trim().to_string();
            info!(chapter = %chapter, "Processing chapter");
            continue;
        }

        if let Some(caps) = VERSE_RE.captures(line) {
            let label = VerseLabel {
                chapter: chapter.clone(),
                number: caps[1].to_string(),
            };
            if let Some(unit) = acc.start(label, &caps[2]) {
                quotes.push(to_record(config, unit));
            }
        } else {
            acc.append(line);
        }
    }

    if let Some(unit) = acc.finish() {
        quotes.push(to_record(config, unit));
    }

    info!("Successfully parsed {} Dhammapada verses", quotes.len());
    quotes
}

fn to_record(config: &SourceConfig, unit: Unit<VerseLabel>) -> QuoteRecord {
    let Unit { label, text } = unit;
    let source = if label.chapter.is_empty() {
        format!("{}, Verse {}", config.title, label.number)
    } else {
        format!("{}, {}, Verse {}", config.title, label.chapter, label.number)
    };
    let mut record = QuoteRecord::new(text, source, config.author);
    record.tradition = config.tradition.map(str::to_string);
    record
}
