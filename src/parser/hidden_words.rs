//! The Hidden Words page has shipped in two markups over time. Each layout is
//! its own strategy; `detect_layout` picks whichever the document carries.
//!
//! Flat (legacy):
//! ```text
//! div[data-media-id=HW]
//!   h2.TitleSub      "FROM THE ARABIC"
//!   h3.HeadNumbered  "1."
//!   p.Para           saying
//!   p.Para           <em>(citation)</em>
//! ```
//!
//! Nested (current):
//! ```text
//! div.library-document-content
//!   div.section
//!     h2             "Part One: From the Arabic"
//!     div.hidden-word
//!       h3           "1"
//!       p            saying, lines split by <br>
//! ```

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::text::collapse_whitespace;
use crate::error::{QuoteError, Result};
use crate::record::QuoteRecord;
use crate::source::SourceConfig;

static FLAT_ROOT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[data-media-id="HW"]"#).unwrap());
static NESTED_ROOT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.library-document-content").unwrap());
static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());
static H3: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static P: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static CITE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("em, cite").unwrap());
static AUTHOR_ARTIFACT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*바하올라\s*").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Nested,
    Flat,
}

pub fn parse(config: &SourceConfig, html: &str) -> Result<Vec<QuoteRecord>> {
    let document = Html::parse_document(html);
    let quotes = match detect_layout(&document) {
        Some((Layout::Nested, root)) => parse_nested(config, root),
        Some((Layout::Flat, root)) => parse_flat(config, root),
        None => {
            return Err(QuoteError::MarkerNotFound(
                "div.library-document-content / div[data-media-id=HW]",
            ))
        }
    };
    info!("Successfully parsed {} Hidden Words", quotes.len());
    Ok(quotes)
}

/// Current markup first, then the legacy one.
pub fn detect_layout(document: &Html) -> Option<(Layout, ElementRef<'_>)> {
    if let Some(root) = document.select(&NESTED_ROOT).next() {
        if child_elements(root).any(|el| has_class(el, "section")) {
            return Some((Layout::Nested, root));
        }
    }
    document
        .select(&FLAT_ROOT)
        .next()
        .map(|root| (Layout::Flat, root))
}

pub fn parse_flat(config: &SourceConfig, root: ElementRef<'_>) -> Vec<QuoteRecord> {
    let mut quotes = Vec::new();
    let mut part = String::new();

    for el in child_elements(root) {
        match el.value().name() {
            "h2" if has_class(el, "TitleSub") => {
                if let Some(p) = part_name(&element_text(el)) {
                    info!("Processing: {} - From the {}", config.title, p);
                    part = p.to_string();
                }
            }
            "h3" if has_class(el, "HeadNumbered") => {
                let number = element_text(el).replace('.', "");
                let text = join_saying(flat_paragraphs(el));
                if text.is_empty() {
                    debug!(number = %number, "No paragraph after numbered heading");
                    continue;
                }
                quotes.push(to_record(config, &part, number.trim(), text));
            }
            _ => {}
        }
    }

    quotes
}

/// `p.Para` siblings after a numbered heading. Once the saying has started,
/// a citation or any element other than `p.Para` ends it.
fn flat_paragraphs(heading: ElementRef<'_>) -> Vec<String> {
    let mut parts = Vec::new();
    for sib in heading.next_siblings().filter_map(ElementRef::wrap) {
        let name = sib.value().name();
        if name == "h2" || name == "h3" {
            break;
        }
        if name == "p" && has_class(sib, "Para") {
            if is_citation(sib) {
                break;
            }
            parts.push(element_text(sib));
        } else if !parts.is_empty() {
            break;
        }
    }
    parts
}

pub fn parse_nested(config: &SourceConfig, root: ElementRef<'_>) -> Vec<QuoteRecord> {
    let mut quotes = Vec::new();

    for section in child_elements(root).filter(|el| has_class(*el, "section")) {
        let Some(part) = section
            .select(&H2)
            .next()
            .and_then(|h| part_name(&element_text(h)))
        else {
            debug!("Section without a recognised part heading skipped");
            continue;
        };
        info!("Processing: {} - From the {}", config.title, part);

        for block in child_elements(section).filter(|el| has_class(*el, "hidden-word")) {
            let Some(number) = block.select(&H3).next().map(element_text) else {
                debug!("Hidden word block without a number skipped");
                continue;
            };
            let paragraphs = block
                .select(&P)
                .filter(|p| !is_citation(*p))
                .map(element_text)
                .collect();
            let text = join_saying(paragraphs);
            if text.is_empty() {
                debug!(number = %number, "Hidden word block without text skipped");
                continue;
            }
            quotes.push(to_record(config, part, number.replace('.', "").trim(), text));
        }
    }

    quotes
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children().filter_map(ElementRef::wrap)
}

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Text nodes joined by single spaces, so `<br>` and inline tags never glue
/// words together.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A paragraph that only attributes the saying, e.g. `<em>(‘Abdu’l‑Bahá, …)</em>`.
fn is_citation(p: ElementRef<'_>) -> bool {
    let text = element_text(p);
    p.select(&CITE).next().is_some() && text.contains('(') && text.contains(')')
}

fn part_name(heading: &str) -> Option<&'static str> {
    let upper = heading.to_uppercase();
    if upper.contains("ARABIC") {
        Some("Arabic")
    } else if upper.contains("PERSIAN") {
        Some("Persian")
    } else {
        None
    }
}

fn join_saying(paragraphs: Vec<String>) -> String {
    let joined = paragraphs.join(" ");
    collapse_whitespace(&AUTHOR_ARTIFACT_RE.replace_all(&joined, " "))
}

fn to_record(config: &SourceConfig, part: &str, number: &str, text: String) -> QuoteRecord {
    let source = format!("{}, From the {} #{}", config.title, part, number);
    let mut record = QuoteRecord::new(text, source, config.author);
    record.tradition = config.tradition.map(str::to_string);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    fn cfg() -> &'static SourceConfig {
        Source::HiddenWords.config()
    }

    #[test]
    fn flat_layout_stops_at_citation() {
        let html = r#"<html><body><div data-media-id="HW">
            <h2 class="TitleSub">FROM THE ARABIC</h2>
            <h3 class="HeadNumbered">1.</h3>
            <p class="Para">O SON OF SPIRIT!</p>
            <p class="Para">My first counsel is this: Possess a pure, kindly and radiant heart.</p>
            <p class="Para"><em>(‘Abdu’l‑Bahá, Some Talk, p. 1)</em></p>
            <p class="Para">Never reached.</p>
        </div></body></html>"#;
        let quotes = parse(cfg(), html).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(
            quotes[0].text,
            "O SON OF SPIRIT! My first counsel is this: Possess a pure, kindly and radiant heart."
        );
        assert_eq!(quotes[0].source, "The Hidden Words, From the Arabic #1");
        assert_eq!(quotes[0].author, "Bahá’u’lláh");
        assert!(quotes[0].tradition.is_none());
    }

    #[test]
    fn flat_saying_ends_at_non_para_sibling() {
        let html = r#"<div data-media-id="HW">
            <h2 class="TitleSub">FROM THE ARABIC</h2>
            <h3 class="HeadNumbered">1.</h3>
            <div class="Anchor"></div>
            <p class="Para">O SON OF SPIRIT! My first counsel is this.</p>
            <div class="Separator"></div>
            <p class="Para">Editorial note that is not part of the saying.</p>
        </div>"#;
        let quotes = parse(cfg(), html).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].text, "O SON OF SPIRIT! My first counsel is this.");
    }

    #[test]
    fn flat_heading_without_paragraph_is_skipped() {
        let html = r#"<div data-media-id="HW">
            <h2 class="TitleSub">FROM THE PERSIAN</h2>
            <h3 class="HeadNumbered">5.</h3>
            <h3 class="HeadNumbered">6.</h3>
            <p class="Para">O FRIEND! In the garden of thy heart plant naught but the rose of love.</p>
        </div>"#;
        let quotes = parse(cfg(), html).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].source, "The Hidden Words, From the Persian #6");
    }

    #[test]
    fn nested_layout_drops_br_and_citations() {
        let html = r#"<div class="library-document-content">
          <div class="section"><h2>Part One: From the Arabic</h2>
            <div class="hidden-word"><h3>2</h3>
              <p>O SON OF SPIRIT!<br/>The best beloved of all things<br>in My sight is Justice;</p>
              <p><cite>(Bahá’u’lláh, Tablets, p. 2)</cite></p>
            </div>
          </div>
        </div>"#;
        let quotes = parse(cfg(), html).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(
            quotes[0].text,
            "O SON OF SPIRIT! The best beloved of all things in My sight is Justice;"
        );
        assert_eq!(quotes[0].source, "The Hidden Words, From the Arabic #2");
    }

    #[test]
    fn korean_author_artifact_removed() {
        assert_eq!(
            join_saying(vec!["O SON OF MAN!".into(), "바하올라".into(), "Veiled in My immemorial being".into()]),
            "O SON OF MAN! Veiled in My immemorial being"
        );
    }

    #[test]
    fn unknown_markup_is_marker_not_found() {
        let err = parse(cfg(), "<html><body><p>Nothing here</p></body></html>").unwrap_err();
        assert!(matches!(err, QuoteError::MarkerNotFound(_)));
    }

    #[test]
    fn layouts_detected_from_fixtures() {
        let flat = std::fs::read_to_string("tests/fixtures/hidden_words_flat.html").unwrap();
        let nested = std::fs::read_to_string("tests/fixtures/hidden_words_nested.html").unwrap();
        assert_eq!(detect_layout(&Html::parse_document(&flat)).map(|(l, _)| l), Some(Layout::Flat));
        assert_eq!(detect_layout(&Html::parse_document(&nested)).map(|(l, _)| l), Some(Layout::Nested));
    }

    #[test]
    fn both_layouts_yield_the_same_sayings() {
        let flat = std::fs::read_to_string("tests/fixtures/hidden_words_flat.html").unwrap();
        let nested = std::fs::read_to_string("tests/fixtures/hidden_words_nested.html").unwrap();
        let a = parse(cfg(), &flat).unwrap();
        let b = parse(cfg(), &nested).unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a, b);
        let sources: Vec<&str> = a.iter().map(|q| q.source.as_str()).collect();
        assert_eq!(
            sources,
            vec![
                "The Hidden Words, From the Arabic #1",
                "The Hidden Words, From the Arabic #2",
                "The Hidden Words, From the Persian #1",
                "The Hidden Words, From the Persian #3",
            ]
        );
    }
}
