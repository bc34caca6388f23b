use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::{info, warn};

use crate::error::{Result, ScanError};
use crate::paths::get_default_config_path;

// ============ Option Types ============

/// How each input line is turned into a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFormat {
    /// `0x`-prefixed hex, else decimal, else hash of the text
    #[default]
    Auto,
    Decimal,
    Hex,
    /// CRC32 of the line text
    Text,
}

/// Which steps produce an output event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitMode {
    /// Only steps where the reported period changed
    #[default]
    Transitions,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Text,
}

impl FromStr for TokenFormat {
    type Err = String;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name {
            "auto" => Ok(TokenFormat::Auto),
            "decimal" => Ok(TokenFormat::Decimal),
            "hex" => Ok(TokenFormat::Hex),
            "text" => Ok(TokenFormat::Text),
            other => Err(format!(
                "unknown token format '{}' (expected auto, decimal, hex or text)",
                other
            )),
        }
    }
}

impl FromStr for EmitMode {
    type Err = String;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name {
            "transitions" => Ok(EmitMode::Transitions),
            "all" => Ok(EmitMode::All),
            other => Err(format!("unknown emit mode '{}' (expected transitions or all)", other)),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "text" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format '{}' (expected jsonl or text)", other)),
        }
    }
}

impl fmt::Display for TokenFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenFormat::Auto => "auto",
            TokenFormat::Decimal => "decimal",
            TokenFormat::Hex => "hex",
            TokenFormat::Text => "text",
        })
    }
}

impl fmt::Display for EmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmitMode::Transitions => "transitions",
            EmitMode::All => "all",
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Text => "text",
        })
    }
}

// ============ Settings ============

/// Scanner settings, loaded from a json5 file and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Largest cycle length tracked by the detector
    #[serde(default = "default_max_period", alias = "max_pattern_size")]
    pub max_period: usize,
    /// Keep reporting a larger period while it stays confirmed
    #[serde(default, alias = "priority_to_bigger_patterns")]
    pub prefer_larger_period: bool,
    #[serde(default)]
    pub token_format: TokenFormat,
    /// Regex applied to each line; the token is capture group 1, or the
    /// whole match when the pattern has no groups
    #[serde(default)]
    pub extract_pattern: Option<String>,
    #[serde(default)]
    pub emit: EmitMode,
    #[serde(default)]
    pub output: OutputFormat,
    /// Treat unparsable lines as errors instead of skipping them
    #[serde(default)]
    pub strict: bool,
}

fn default_max_period() -> usize {
    32
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_period: default_max_period(),
            prefer_larger_period: false,
            token_format: TokenFormat::default(),
            extract_pattern: None,
            emit: EmitMode::default(),
            output: OutputFormat::default(),
            strict: false,
        }
    }
}

impl ScanSettings {
    /// Reject settings the scanner cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_period == 0 {
            return Err(ScanError::InvalidSettings(
                "max_period must be at least 1".to_string(),
            ));
        }
        if let Some(pattern) = &self.extract_pattern {
            Regex::new(pattern)?;
        }
        Ok(())
    }
}

/// Parse settings from json5 text (comments and trailing commas allowed).
pub fn parse_settings(contents: &str) -> std::result::Result<ScanSettings, json5::Error> {
    json5::from_str(contents)
}

/// Load settings from `explicit_path`, or from the default config file.
///
/// An explicit path must exist and parse. A missing or broken default file
/// falls back to defaults.
pub async fn load_settings(explicit_path: Option<&Path>) -> Result<ScanSettings> {
    if let Some(path) = explicit_path {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| ScanError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let settings = parse_settings(&contents).map_err(|e| ScanError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        info!("Settings loaded from {:?}", path);
        return Ok(settings);
    }

    let config_path = get_default_config_path();
    let settings = match fs::read_to_string(&config_path).await {
        Ok(contents) => match parse_settings(&contents) {
            Ok(settings) => {
                info!("Settings loaded from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse settings: {}, using defaults", e);
                ScanSettings::default()
            }
        },
        Err(e) => {
            info!(
                "No config file found at {:?}: {}, using defaults",
                config_path, e
            );
            ScanSettings::default()
        }
    };

    Ok(settings)
}
