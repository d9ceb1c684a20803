use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub delimiter:      char,
    pub include_header: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter:      ',',
            include_header: true,
        }
    }
}

impl ExportConfig {
    /// CSV needs a single-byte delimiter; anything else falls back to a comma.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// SQLite file. `:memory:` keeps everything in process.
    pub database_path: String,
    /// Run the overdue sweep before dashboard, campaign detail and
    /// placement listing reads.
    pub sweep_before_reads: bool,
    pub top_bloggers_limit: usize,
    pub export: ExportConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            database_path:      "data/desk.sqlite3".into(),
            sweep_before_reads: true,
            top_bloggers_limit: 10,
            export:             ExportConfig::default(),
        }
    }
}

impl DeskConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    /// In tests, use DeskConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DeskConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        if config.top_bloggers_limit == 0 {
            anyhow::bail!("{path}: top_bloggers_limit must be at least 1");
        }
        Ok(config)
    }

    pub fn default_test() -> Self {
        Self {
            database_path: ":memory:".into(),
            ..Self::default()
        }
    }
}
