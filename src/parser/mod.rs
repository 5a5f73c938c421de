pub mod dhammapada;
pub mod gita;
pub mod hidden_words;
pub mod kjv;
pub mod text;
pub mod unit;

use crate::error::Result;
use crate::record::QuoteRecord;
use crate::source::{Source, SourceConfig};

/// Turn a decoded document into records for `config.source`.
pub fn parse(config: &SourceConfig, body: &str) -> Result<Vec<QuoteRecord>> {
    match config.source {
        Source::Dhammapada => dhammapada::parse(config, body),
        Source::Gita => gita::parse(config, body),
        Source::HiddenWords => hidden_words::parse(config, body),
        Source::Kjv => kjv::parse(config, body),
    }
}
