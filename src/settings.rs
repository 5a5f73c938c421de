use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::source::SourceConfig;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const DEFAULT_DATA_DIR: &str = "data";

/// Run-wide settings: defaults, then `quotes.toml` if present, then `QUOTES_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub user_agent: String,
    /// Replaces every source's own request timeout when set.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("data_dir", DEFAULT_DATA_DIR)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .add_source(File::with_name("quotes").required(false))
            .add_source(Environment::with_prefix("QUOTES").try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn with_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.data_dir = dir;
        }
        self
    }

    pub fn timeout_for(&self, source: &SourceConfig) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(source.timeout)
    }

    pub fn output_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
