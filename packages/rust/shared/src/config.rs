//! Application configuration for kfdeck.
//!
//! User config lives at `~/.kfdeck/kfdeck.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KfDeckError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "kfdeck.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".kfdeck";

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One row block per deck, comma separated.
    #[default]
    Csv,
    /// CRLF plain-text blocks.
    Text,
}

impl FromStr for OutputFormat {
    type Err = KfDeckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            other => Err(KfDeckError::config(format!(
                "unknown output format '{other}': expected 'csv' or 'text'"
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Text => f.write_str("text"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config structs (matching kfdeck.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Which sites to query and where they live.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Batch behaviour.
    #[serde(default)]
    pub run: RunPolicyConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Newline-delimited file of deck links.
    #[serde(default = "default_input")]
    pub input: String,

    /// Report file to write.
    #[serde(default = "default_output")]
    pub output: String,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            format: OutputFormat::default(),
        }
    }
}

fn default_input() -> String {
    "kf_deck_links.txt".into()
}
fn default_output() -> String {
    "deck_info_output.csv".into()
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Scrape the KeyForge Compendium deck page (ABCE stats).
    #[serde(default = "default_true")]
    pub compendium: bool,

    /// Query the Decks of KeyForge API (SAS / AERC).
    #[serde(default = "default_true")]
    pub decks_of_keyforge: bool,

    /// Query the official KeyForge API (record, houses, cards).
    #[serde(default = "default_true")]
    pub keyforge_game: bool,

    #[serde(default = "default_compendium_base")]
    pub compendium_base: String,

    #[serde(default = "default_dok_base")]
    pub dok_base: String,

    #[serde(default = "default_kfg_base")]
    pub kfg_base: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            compendium: true,
            decks_of_keyforge: true,
            keyforge_game: true,
            compendium_base: default_compendium_base(),
            dok_base: default_dok_base(),
            kfg_base: default_kfg_base(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_compendium_base() -> String {
    "https://keyforge-compendium.com".into()
}
fn default_dok_base() -> String {
    "https://decksofkeyforge.com".into()
}
fn default_kfg_base() -> String {
    "https://www.keyforgegame.com".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("kfdeck/", env!("CARGO_PKG_VERSION")).into()
}

impl SourcesConfig {
    /// At least one site must be enabled for a deck to produce anything.
    pub fn validate(&self) -> Result<()> {
        if !(self.compendium || self.decks_of_keyforge || self.keyforge_game) {
            return Err(KfDeckError::config("all sources are disabled"));
        }
        for base in [&self.compendium_base, &self.dok_base, &self.kfg_base] {
            url::Url::parse(base)
                .map_err(|e| KfDeckError::config(format!("invalid base URL '{base}': {e}")))?;
        }
        Ok(())
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunPolicyConfig {
    /// Record failing decks and continue instead of aborting the batch.
    #[serde(default)]
    pub keep_going: bool,
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime batch configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub keep_going: bool,
    pub sources: SourcesConfig,
}

impl From<&AppConfig> for RunConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            input: PathBuf::from(&config.defaults.input),
            output: PathBuf::from(&config.defaults.output),
            format: config.defaults.format,
            keep_going: config.run.keep_going,
            sources: config.sources.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.kfdeck/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| KfDeckError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.kfdeck/kfdeck.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| KfDeckError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| KfDeckError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| KfDeckError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| KfDeckError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| KfDeckError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
