//! Command-line argument parsing and launch configuration.
//!
//! This module handles CLI argument parsing using clap, and applies
//! launch-time overrides to the loaded settings.

use crate::settings::{EmitMode, OutputFormat, ScanSettings, TokenFormat};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// CLI arguments for pattern-scan
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "pattern-scan", about = "Detect repeating cycles in token streams")]
pub struct CliArgs {
    /// Files to scan, one token per line. Reads stdin when empty or '-'
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,
    /// Settings file (json5). Defaults to the platform config directory
    #[arg(long, value_name = "PATH", env = "PATTERN_SCAN_CONFIG")]
    pub config: Option<PathBuf>,
    /// Largest cycle length to look for
    #[arg(long, value_name = "INT", env = "PATTERN_SCAN_MAX_PERIOD")]
    pub max_period: Option<usize>,
    /// Keep reporting a larger period while it stays confirmed
    #[arg(long, value_name = "BOOL", env = "PATTERN_SCAN_PREFER_LARGER", value_parser = clap::builder::BoolishValueParser::new())]
    pub prefer_larger: Option<bool>,
    /// Token format (auto, decimal, hex, text)
    #[arg(long, value_name = "FORMAT", env = "PATTERN_SCAN_FORMAT")]
    pub format: Option<TokenFormat>,
    /// Regex selecting the token in each line (capture group 1, or the whole match).
    /// Pass an empty string to clear a configured pattern
    #[arg(long, value_name = "REGEX", env = "PATTERN_SCAN_EXTRACT")]
    pub extract: Option<String>,
    /// Which steps to report (transitions, all)
    #[arg(long, value_name = "MODE", env = "PATTERN_SCAN_EMIT")]
    pub emit: Option<EmitMode>,
    /// Output format (jsonl, text)
    #[arg(long, value_name = "FORMAT", env = "PATTERN_SCAN_OUTPUT")]
    pub output: Option<OutputFormat>,
    /// Fail on unparsable lines instead of skipping them
    #[arg(long, value_name = "BOOL", env = "PATTERN_SCAN_STRICT", value_parser = clap::builder::BoolishValueParser::new())]
    pub strict: Option<bool>,
    /// Print the effective settings as JSON and exit
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}

/// Where a stream of tokens comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Name used in events and summaries
    pub fn name(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }
}

/// Map positional inputs to sources; no inputs means stdin.
///
/// Stdin can only be drained once, so repeated `-` entries after the first
/// are dropped.
pub fn resolve_inputs(inputs: &[PathBuf]) -> Vec<InputSource> {
    if inputs.is_empty() {
        return vec![InputSource::Stdin];
    }

    let mut seen_stdin = false;
    let mut sources = Vec::with_capacity(inputs.len());
    for path in inputs {
        if path.as_path() == Path::new("-") {
            if seen_stdin {
                warn!("[Launch] stdin listed more than once, ignoring repeat");
                continue;
            }
            seen_stdin = true;
            sources.push(InputSource::Stdin);
        } else {
            sources.push(InputSource::File(path.clone()));
        }
    }
    sources
}

/// Settings changed by command-line flags, as `name=value` entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOverrides {
    pub applied: Vec<String>,
}

impl LaunchOverrides {
    fn record(&mut self, name: &str, value: impl std::fmt::Display) {
        let entry = format!("{}={}", name, value);
        info!("[Launch] override {}", entry);
        self.applied.push(entry);
    }
}

/// Apply CLI overrides to settings without persisting them.
pub fn apply_cli_overrides(args: &CliArgs, settings: &mut ScanSettings) -> LaunchOverrides {
    let mut overrides = LaunchOverrides::default();

    if let Some(max_period) = args.max_period {
        settings.max_period = max_period;
        overrides.record("max_period", max_period);
    }
    if let Some(v) = args.prefer_larger {
        settings.prefer_larger_period = v;
        overrides.record("prefer_larger_period", v);
    }
    if let Some(format) = args.format {
        settings.token_format = format;
        overrides.record("token_format", format);
    }
    if let Some(raw) = &args.extract {
        if raw.is_empty() {
            settings.extract_pattern = None;
            overrides.record("extract_pattern", "<none>");
        } else {
            settings.extract_pattern = Some(raw.clone());
            overrides.record("extract_pattern", raw);
        }
    }
    if let Some(emit) = args.emit {
        settings.emit = emit;
        overrides.record("emit", emit);
    }
    if let Some(output) = args.output {
        settings.output = output;
        overrides.record("output", output);
    }
    if let Some(v) = args.strict {
        settings.strict = v;
        overrides.record("strict", v);
    }

    overrides
}
