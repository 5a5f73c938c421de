use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use super::text::line_after;
use super::unit::{Accumulator, Unit};
use crate::error::Result;
use crate::record::QuoteRecord;
use crate::source::SourceConfig;

static START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*\* START OF (?:THE|THIS) PROJECT GUTENBERG EBOOK").unwrap());
static ALT_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)The Old Testament of the King James Version of the Bible").unwrap()
});
static END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*\* END OF (?:THE|THIS) PROJECT GUTENBERG EBOOK").unwrap());
static VERSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d+):(\d+)\s+(.*)").unwrap());
static BOOK_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:",
        r"The\s+(?:First|Second|Third|Fourth|Fifth)\s+Book\s+of\s+\w+.*?",
        r"|The\s+Book\s+of\s+\w+.*?",
        r"|The\s+(?:Gospel|Acts|Epistle|Lamentations|Revelation|Song)\s+.*?",
        r"|Ezra|Nehemiah|Esther|Job|Psalms|Proverbs|Ecclesiastes|Hosea|Joel|Amos|Obadiah",
        r"|Jonah|Micah|Nahum|Habakkuk|Zephaniah|Haggai|Zechariah|Malachi",
        r")$"
    ))
    .unwrap()
});

/// Physical lines examined above a `1:1` verse when looking for its book.
pub const BOOK_LOOKBACK: usize = 5;
pub const UNKNOWN_BOOK: &str = "Unknown Book";

#[derive(Debug, Clone, PartialEq, Eq)]
struct VerseRef {
    book: String,
    chapter: String,
    verse: String,
}

pub fn parse(config: &SourceConfig, document: &str) -> Result<Vec<QuoteRecord>> {
    Ok(scan(config, locate_start(document)))
}

/// After the Gutenberg start banner, else after the Old Testament title line,
/// else the whole document (header text may leak in).
pub fn locate_start(document: &str) -> &str {
    if let Some(offset) = line_after(document, &START_RE) {
        return &document[offset..];
    }
    warn!("Could not find Gutenberg start marker, trying Old Testament title");
    if let Some(offset) = line_after(document, &ALT_START_RE) {
        return &document[offset..];
    }
    warn!("Could not find any start marker, processing from the beginning");
    document
}

pub fn scan(config: &SourceConfig, body: &str) -> Vec<QuoteRecord> {
    let lines: Vec<&str> = body.lines().collect();
    let mut acc = Accumulator::new();
    acc.begin();
    let mut book: Option<String> = None;
    let mut quotes = Vec::new();

    for (idx, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if END_RE.is_match(line) {
            info!("Found end of ebook marker");
            break;
        }

        if let Some(caps) = VERSE_RE.captures(line) {
            let chapter = caps[1].to_string();
            let verse = caps[2].to_string();

            if chapter == "1" && verse == "1" {
                match infer_book(&lines, idx) {
                    Some(title) => {
                        info!(book = %title, "Identified book");
                        book = Some(title);
                    }
                    None => {
                        warn!(
                            "Could not determine book name for {}:{}, using last known or '{}'",
                            chapter, verse, UNKNOWN_BOOK
                        );
                        book.get_or_insert_with(|| UNKNOWN_BOOK.to_string());
                    }
                }
            }

            let flushed = match &book {
                Some(title) => acc.start(
                    VerseRef {
                        book: title.clone(),
                        chapter,
                        verse,
                    },
                    &caps[3],
                ),
                // verses ahead of the first book are not attributable
                None => acc.close(),
            };
            if let Some(unit) = flushed {
                quotes.push(to_record(config, unit));
            }
        } else if !BOOK_TITLE_RE.is_match(line) {
            acc.append(line);
        }
    }

    if let Some(unit) = acc.finish() {
        quotes.push(to_record(config, unit));
    }

    info!("Successfully parsed {} KJV Bible verses", quotes.len());
    quotes
}

/// Scan up to `BOOK_LOOKBACK` lines above `idx` for a book title.
pub fn infer_book(lines: &[&str], idx: usize) -> Option<String> {
    lines[idx.saturating_sub(BOOK_LOOKBACK)..idx]
        .iter()
        .rev()
        .map(|l| l.trim())
        .find(|l| is_book_title(l))
        .map(str::to_string)
}

fn is_book_title(line: &str) -> bool {
    let len = line.chars().count();
    if !(4..100).contains(&len) || VERSE_RE.is_match(line) {
        return false;
    }
    let upper = line.to_uppercase();
    if ["PROJECT GUTENBERG", "BIBLE", "TESTAMENT"]
        .iter()
        .any(|w| upper.contains(w))
    {
        return false;
    }
    BOOK_TITLE_RE.is_match(line)
}

fn to_record(config: &SourceConfig, unit: Unit<VerseRef>) -> QuoteRecord {
    let Unit { label, text } = unit;
    let reference = format!("{}:{}", label.chapter, label.verse);
    let mut record = QuoteRecord::new(text, format!("{}, {}", label.book, reference), config.author);
    record.tradition = config.tradition.map(str::to_string);
    record.book = Some(label.book);
    record.reference = Some(reference);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    fn cfg() -> &'static SourceConfig {
        Source::Kjv.config()
    }

    #[test]
    fn book_found_within_lookback() {
        let lines = vec![
            "The First Book of Moses:  Called Genesis",
            "",
            "",
            "1:1 In the beginning God created the heaven and the earth.",
        ];
        assert_eq!(
            infer_book(&lines, 3).as_deref(),
            Some("The First Book of Moses:  Called Genesis")
        );
    }

    #[test]
    fn book_beyond_lookback_is_missed() {
        let mut lines = vec!["The Book of Ruth"];
        lines.extend(std::iter::repeat("").take(BOOK_LOOKBACK));
        lines.push("1:1 Now it came to pass in the days when the judges ruled,");
        assert!(infer_book(&lines, lines.len() - 1).is_none());
        assert_eq!(infer_book(&lines, 5).as_deref(), Some("The Book of Ruth"));
    }

    #[test]
    fn boilerplate_titles_rejected() {
        assert!(!is_book_title("The Old Testament of the King James Version of the Bible"));
        assert!(!is_book_title("The Book of Project Gutenberg"));
        assert!(!is_book_title("Job"));
        assert!(is_book_title("Psalms"));
        assert!(is_book_title("The Gospel According to Saint Matthew"));
    }

    #[test]
    fn verses_attributed_and_continued() {
        let body = "The Book of Ruth\n\n1:1 Now it came to pass in the days when the judges ruled,\nthat there was a famine in the land.\n\n1:2 And the name of the man was Elimelech,";
        let quotes = scan(cfg(), body);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].source, "The Book of Ruth, 1:1");
        assert_eq!(
            quotes[0].text,
            "Now it came to pass in the days when the judges ruled, that there was a famine in the land."
        );
        assert_eq!(quotes[1].reference.as_deref(), Some("1:2"));
        assert_eq!(quotes[1].book.as_deref(), Some("The Book of Ruth"));
    }

    #[test]
    fn unknown_book_fallback_then_previous_book() {
        let body = "1:1 First verse of a mystery book here.\n\nsome stray heading text\n\n1:1 Another first verse.";
        let quotes = scan(cfg(), body);
        assert_eq!(quotes[0].book.as_deref(), Some(UNKNOWN_BOOK));
        assert_eq!(quotes[1].book.as_deref(), Some(UNKNOWN_BOOK));

        let body = "Ezra\n\n1:1 Now in the first year of Cyrus king of Persia.\n\nno title here\n\n1:1 Then the first verse again.";
        let quotes = scan(cfg(), body);
        assert_eq!(quotes[1].source, "Ezra, 1:1");
    }

    #[test]
    fn verses_before_any_book_dropped() {
        let body = "3:4 Orphan verse text.\n\nThe Book of Ruth\n\n1:1 Now it came to pass.";
        let quotes = scan(cfg(), body);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].source, "The Book of Ruth, 1:1");
    }

    #[test]
    fn start_marker_fallbacks() {
        let doc = "Header\n*** START OF THE PROJECT GUTENBERG EBOOK 10 ***\nBody";
        assert_eq!(locate_start(doc), "Body");
        let alt = "Header\nThe Old Testament of the King James Version of the Bible\nBody";
        assert_eq!(locate_start(alt), "Body");
        assert_eq!(locate_start("Body only"), "Body only");
    }

    #[test]
    fn fixture_document() {
        let doc = std::fs::read_to_string("tests/fixtures/kjv.txt").unwrap();
        let quotes = parse(cfg(), &doc).unwrap();
        let sources: Vec<&str> = quotes.iter().map(|q| q.source.as_str()).collect();
        assert_eq!(
            sources,
            vec![
                "The First Book of Moses: Called Genesis, 1:1",
                "The First Book of Moses: Called Genesis, 1:2",
                "The First Book of Moses: Called Genesis, 2:1",
                "The Gospel According to Saint John, 1:1",
                "The Gospel According to Saint John, 1:2",
                "The Gospel According to Saint John, 11:35",
            ]
        );
        assert_eq!(quotes[5].text, "Jesus wept.");
        assert!(quotes.iter().all(|q| !q.text.contains("Gutenberg")));
    }
}
