use crate::input::{LineLimits, OversizedLinePolicy};
use crate::matcher::MatchMode;
use crate::record::NumericPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Placeholder replaced by the shard number in `verbose.collection_path`
pub const SHARD_PLACEHOLDER: &str = "{shard}";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub parsing: ParsingConfig,
    #[serde(default)]
    pub verbose: VerboseConfig,
}

/// Which records each pass evaluates
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdsConfig {
    /// Minimum run score (inclusive) for the precision pass
    #[serde(default = "default_rank_threshold")]
    pub rank: f64,
    /// Minimum qrels relevance (inclusive) for the recall pass
    #[serde(default = "default_relevance_threshold")]
    pub relevance: i32,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            rank: default_rank_threshold(),
            relevance: default_relevance_threshold(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub mode: MatchMode,
}

/// Line reading and numeric field handling
#[derive(Debug, Clone, Deserialize)]
pub struct ParsingConfig {
    #[serde(default)]
    pub numeric_policy: NumericPolicy,
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
    #[serde(default)]
    pub oversized_lines: OversizedLinePolicy,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            numeric_policy: NumericPolicy::default(),
            max_line_bytes: default_max_line_bytes(),
            oversized_lines: OversizedLinePolicy::default(),
        }
    }
}

/// Verbose mode: where to find query text and collection documents
#[derive(Debug, Clone, Deserialize)]
pub struct VerboseConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_query_path")]
    pub query_path: PathBuf,
    /// Shard file path with a `{shard}` placeholder
    #[serde(default = "default_collection_path")]
    pub collection_path: String,
    #[serde(default = "default_closing_delimiter")]
    pub closing_delimiter: String,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for VerboseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            query_path: default_query_path(),
            collection_path: default_collection_path(),
            closing_delimiter: default_closing_delimiter(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_rank_threshold() -> f64 {
    9.0
}

fn default_relevance_threshold() -> i32 {
    1
}

fn default_max_line_bytes() -> usize {
    64 * 1024
}

fn default_query_path() -> PathBuf {
    PathBuf::from("./input/French/Queries/train.tsv")
}

fn default_collection_path() -> String {
    "./input/French/Documents/Trec/collector_kodicare_{shard}.txt".to_string()
}

fn default_closing_delimiter() -> String {
    "</DOC>".to_string()
}

fn default_cache_capacity() -> usize {
    64
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for a config file in this order:
    /// 1. Path specified in TELLME_CONFIG environment variable (must exist)
    /// 2. ./tellme.toml in current directory (optional)
    ///
    /// Without either, built-in defaults are used.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        match std::env::var("TELLME_CONFIG") {
            Ok(path) => Self::from_file(&PathBuf::from(path)),
            Err(_) => {
                let local = PathBuf::from("tellme.toml");
                if local.is_file() {
                    Self::from_file(&local)
                } else {
                    log::debug!("No tellme.toml found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and validate a specific config file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;
        log::debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.thresholds.rank.is_finite() {
            anyhow::bail!("thresholds.rank must be a finite number");
        }

        if self.parsing.max_line_bytes == 0 {
            anyhow::bail!("parsing.max_line_bytes must be greater than 0");
        }

        if !self.verbose.collection_path.contains(SHARD_PLACEHOLDER) {
            anyhow::bail!(
                "verbose.collection_path must contain the {} placeholder: {}",
                SHARD_PLACEHOLDER,
                self.verbose.collection_path
            );
        }

        if self.verbose.closing_delimiter.is_empty() {
            anyhow::bail!("verbose.closing_delimiter must not be empty");
        }

        Ok(())
    }

    pub fn line_limits(&self) -> LineLimits {
        LineLimits {
            max_line_bytes: self.parsing.max_line_bytes,
            oversized: self.parsing.oversized_lines,
        }
    }
}
