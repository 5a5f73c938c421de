pub mod daily;
pub mod dedup;
pub mod error;
pub mod fetch;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod settings;
pub mod source;
pub mod store;

pub use error::{QuoteError, Result};
pub use record::QuoteRecord;
pub use settings::Settings;
pub use source::{DedupKey, Source, SourceConfig, TextEncoding};
