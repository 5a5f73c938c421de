use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use super::text::{collapse_whitespace, is_all_upper, is_title_case, line_start_of, word_count};
use super::unit::Accumulator;
use crate::error::Result;
use crate::record::QuoteRecord;
use crate::source::SourceConfig;

static START_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bCHAPTER I\b").unwrap());
static CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*CHAPTER\s+([IVXLCDM]+)\s*$").unwrap());
static SPEAKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*([a-z]+(?:\s+[a-z]+){0,2})\s*[:.]\s*(.*)$").unwrap());
static FOOTNOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\[FN#\d+\]\s*").unwrap());
static END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*\* END OF (?:THE|THIS) PROJECT GUTENBERG EBOOK").unwrap()
});

const NARRATIVE: &str = "Narrative";
const MIN_WORDS: usize = 4;

/// Position inside the poem while walking paragraphs.
struct Context {
    chapter: Option<String>,
    chapter_name: String,
    speaker: String,
    paragraph: usize,
    expecting_name: bool,
}

impl Context {
    fn new() -> Self {
        Context {
            chapter: None,
            chapter_name: String::new(),
            speaker: NARRATIVE.to_string(),
            paragraph: 0,
            expecting_name: false,
        }
    }

    fn enter_chapter(&mut self, roman: &str) {
        self.chapter = Some(format!("Chapter {}", roman));
        self.chapter_name.clear();
        self.speaker = NARRATIVE.to_string();
        self.paragraph = 0;
        self.expecting_name = true;
    }
}

pub fn parse(config: &SourceConfig, document: &str) -> Result<Vec<QuoteRecord>> {
    Ok(scan(config, locate_start(document)))
}

/// From the line holding the first "CHAPTER I"; the whole document when it is
/// missing.
pub fn locate_start(document: &str) -> &str {
    match line_start_of(document, &START_RE) {
        Some(offset) => &document[offset..],
        None => {
            info!("No CHAPTER I marker, scanning the whole document");
            document
        }
    }
}

/// Blank-line separated paragraphs, each joined onto one line.
pub fn paragraphs(body: &str) -> Vec<String> {
    let mut acc = Accumulator::new();
    acc.begin();
    let mut out = Vec::new();
    for line in body.lines() {
        if line.trim().is_empty() {
            if let Some(unit) = acc.close() {
                out.push(unit.text);
            }
        } else if !acc.append(line) {
            if let Some(unit) = acc.start((), line) {
                out.push(unit.text);
            }
        }
    }
    if let Some(unit) = acc.finish() {
        out.push(unit.text);
    }
    out
}

pub fn scan(config: &SourceConfig, body: &str) -> Vec<QuoteRecord> {
    let mut ctx = Context::new();
    let mut quotes = Vec::new();

    for para in paragraphs(body) {
        let upper = para.to_uppercase();
        let endeth = upper.contains("HERE ENDETH CHAPTER") && upper.contains("OF THE BHAGAVAD-GITA");

        if END_RE.is_match(&para) || (endeth && upper.contains("HERE ENDETH CHAPTER XVIII")) {
            info!("Found end of ebook marker");
            break;
        }
        if endeth {
            ctx.speaker = NARRATIVE.to_string();
            continue;
        }

        if let Some(caps) = CHAPTER_RE.captures(&para) {
            ctx.enter_chapter(&caps[1]);
            info!(chapter = ctx.chapter.as_deref().unwrap_or_default(), "Processing chapter");
            continue;
        }

        let speaker = SPEAKER_RE.captures(&para);
        if ctx.expecting_name && speaker.is_none() && (2..10).contains(&word_count(&para)) {
            if is_all_upper(&para) || is_title_case(&para) {
                info!(name = %para, "Chapter name");
                ctx.chapter_name = para.clone();
            }
            ctx.expecting_name = false;
            continue;
        }

        let mut text = para.as_str();
        if let Some(caps) = &speaker {
            ctx.speaker = normalize_speaker(&caps[1]);
            ctx.paragraph = 0;
            let rest = caps.get(2).map_or("", |m| m.as_str().trim());
            if rest.is_empty() {
                continue;
            }
            text = rest;
        }

        let Some(chapter) = ctx.chapter.clone() else {
            debug!("Paragraph before first chapter skipped");
            continue;
        };

        let cleaned = clean_paragraph(text);
        if word_count(&cleaned) < MIN_WORDS {
            continue;
        }
        ctx.paragraph += 1;
        quotes.push(to_record(config, &ctx, &chapter, cleaned));
    }

    info!("Successfully parsed {} paragraphs from Bhagavad-Gita", quotes.len());
    quotes
}

fn normalize_speaker(raw: &str) -> String {
    let name = collapse_whitespace(raw);
    if name.contains("Arjun") {
        "Arjuna".to_string()
    } else {
        name
    }
}

/// Drop footnote anchors and underscore emphasis.
fn clean_paragraph(text: &str) -> String {
    let without_notes = FOOTNOTE_RE.replace_all(text, " ");
    collapse_whitespace(&without_notes.replace('_', ""))
}

fn to_record(config: &SourceConfig, ctx: &Context, chapter: &str, text: String) -> QuoteRecord {
    let mut source = format!("{}, {}", config.title, chapter);
    if !ctx.chapter_name.is_empty() {
        source.push_str(&format!(": {}", ctx.chapter_name));
    }
    if ctx.speaker != NARRATIVE && !ctx.speaker.eq_ignore_ascii_case("krishna") {
        source.push_str(&format!(" (Speaker: {})", ctx.speaker));
    }
    source.push_str(&format!(", Para. {}", ctx.paragraph));

    let mut record = QuoteRecord::new(text, source, config.author);
    record.speaker = Some(ctx.speaker.clone());
    record.translator = config.translator.map(str::to_string);
    record.tradition = config.tradition.map(str::to_string);
    record.book = Some(config.title.to_string());
    record.reference = Some(format!("{}, {} Para. {}", chapter, ctx.speaker, ctx.paragraph));
    record
}
