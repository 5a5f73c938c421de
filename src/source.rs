use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use clap::ValueEnum;

use crate::parser::text::collapse_whitespace;
use crate::record::QuoteRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Source {
    Dhammapada,
    Gita,
    HiddenWords,
    Kjv,
}

impl Source {
    /// Every source, in the order `all` and `merge` process them.
    pub const ALL: [Source; 4] = [
        Source::Dhammapada,
        Source::Gita,
        Source::HiddenWords,
        Source::Kjv,
    ];

    pub fn config(self) -> &'static SourceConfig {
        match self {
            Source::Dhammapada => &DHAMMAPADA,
            Source::Gita => &GITA,
            Source::HiddenWords => &HIDDEN_WORDS,
            Source::Kjv => &KJV,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Dhammapada => "dhammapada",
            Source::Gita => "gita",
            Source::HiddenWords => "hidden-words",
            Source::Kjv => "kjv",
        };
        f.write_str(name)
    }
}

const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Text encodings tried, in order, when decoding a fetched body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl TextEncoding {
    /// Strict decode: `None` when the bytes are not valid in this encoding.
    pub fn decode<'a>(self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            TextEncoding::Utf8 => {
                encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
            }
            // encoding_rs maps the ISO-8859-1 label to windows-1252, so true
            // Latin-1 goes through the byte-to-code-point helper.
            TextEncoding::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes)),
            // The WHATWG table fills 0x81, 0x8D, 0x8F, 0x90 and 0x9D with C1
            // controls; they are unassigned in cp1252 proper.
            TextEncoding::Windows1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                encoding_rs::WINDOWS_1252.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Windows1252 => "cp1252",
        }
    }
}

/// Which fields make two records duplicates of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupKey {
    Text,
    TextAndSource,
}

impl DedupKey {
    pub fn key_for(self, record: &QuoteRecord) -> String {
        let text = collapse_whitespace(&record.text);
        match self {
            DedupKey::Text => text,
            DedupKey::TextAndSource => format!("{}||{}", text, record.source),
        }
    }
}

/// Fixed per-source parameters: where to fetch, where to write, and the
/// metadata stamped on every record.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub source: Source,
    pub url: &'static str,
    pub output_file: &'static str,
    pub author: &'static str,
    pub title: &'static str,
    pub tradition: Option<&'static str>,
    pub translator: Option<&'static str>,
    pub timeout: Duration,
    pub encodings: &'static [TextEncoding],
    pub dedup: DedupKey,
}

pub static DHAMMAPADA: SourceConfig = SourceConfig {
    source: Source::Dhammapada,
    url: "https://www.gutenberg.org/cache/epub/2017/pg2017.txt",
    output_file: "quotes_dhammapada.json",
    author: "Buddha",
    title: "The Dhammapada",
    tradition: Some("Buddhism"),
    translator: None,
    timeout: Duration::from_secs(20),
    encodings: &[TextEncoding::Utf8, TextEncoding::Latin1],
    dedup: DedupKey::Text,
};

pub static GITA: SourceConfig = SourceConfig {
    source: Source::Gita,
    url: "https://www.gutenberg.org/cache/epub/2388/pg2388.txt",
    output_file: "quotes_gita_arnold.json",
    author: "Krishna (Bhagavad-Gita)",
    title: "The Song Celestial (Bhagavad-Gita)",
    tradition: Some("Hinduism"),
    translator: Some("Sir Edwin Arnold"),
    timeout: Duration::from_secs(30),
    encodings: &[
        TextEncoding::Utf8,
        TextEncoding::Latin1,
        TextEncoding::Windows1252,
    ],
    dedup: DedupKey::TextAndSource,
};

pub static HIDDEN_WORDS: SourceConfig = SourceConfig {
    source: Source::HiddenWords,
    url: "https://www.bahai.org/library/authoritative-texts/bahaullah/hidden-words/hidden-words.xhtml",
    output_file: "quotes_hidden_words.json",
    author: "Bahá’u’lláh",
    title: "The Hidden Words",
    tradition: None,
    translator: None,
    timeout: Duration::from_secs(10),
    encodings: &[TextEncoding::Utf8, TextEncoding::Windows1252],
    dedup: DedupKey::Text,
};

pub static KJV: SourceConfig = SourceConfig {
    source: Source::Kjv,
    url: "https://www.gutenberg.org/ebooks/10.txt.utf-8",
    output_file: "quotes_kjv_bible.json",
    author: "Various (King James Version)",
    title: "The Holy Bible (King James Version)",
    tradition: Some("Christianity/Judaism"),
    translator: None,
    timeout: Duration::from_secs(30),
    encodings: &[TextEncoding::Utf8, TextEncoding::Latin1],
    dedup: DedupKey::Text,
};
