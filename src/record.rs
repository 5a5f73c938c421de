use serde::{Deserialize, Serialize};

/// One quotable unit with its provenance. Field order is the JSON field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub text: String,
    pub source: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tradition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl QuoteRecord {
    pub fn new(text: String, source: String, author: &str) -> Self {
        QuoteRecord {
            text,
            source,
            author: author.to_string(),
            speaker: None,
            translator: None,
            tradition: None,
            book: None,
            reference: None,
        }
    }
}
