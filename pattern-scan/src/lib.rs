pub mod cli;
pub mod error;
pub mod output;
pub mod paths;
pub mod scanner;
pub mod settings;
pub mod tokenizer;

#[cfg(test)]
mod tests;

use cli::{apply_cli_overrides, resolve_inputs, CliArgs, InputSource};
use pattern_detector::PatternDetector;
use scanner::{scan_stream, ScanSummary};
use settings::{load_settings, ScanSettings};
use tokenizer::TokenParser;
use tokio::io::{AsyncWrite, BufReader, BufWriter};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use error::{Result, ScanError};

/// Install the global log subscriber. Logs go to stderr so stdout stays
/// machine-readable; the level comes from `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Scan one input with a detector reset for it.
pub async fn scan_input<W>(
    input: &InputSource,
    writer: &mut W,
    detector: &mut PatternDetector,
    parser: &TokenParser,
    settings: &ScanSettings,
) -> Result<ScanSummary>
where
    W: AsyncWrite + Unpin,
{
    let name = input.name();
    match input {
        InputSource::Stdin => {
            info!("Reading tokens from stdin");
            let reader = BufReader::new(tokio::io::stdin());
            scan_stream(&name, reader, writer, detector, parser, settings).await
        }
        InputSource::File(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|source| ScanError::Input {
                    path: path.clone(),
                    source,
                })?;
            info!("Scanning {:?}", path);
            scan_stream(&name, BufReader::new(file), writer, detector, parser, settings).await
        }
    }
}

/// Resolve settings from the config file and CLI, then scan every input.
pub async fn run(args: CliArgs) -> Result<Vec<ScanSummary>> {
    let mut settings = load_settings(args.config.as_deref()).await?;
    let overrides = apply_cli_overrides(&args, &mut settings);
    settings.validate()?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(Vec::new());
    }

    let parser = TokenParser::from_settings(&settings)?;
    let mut detector = PatternDetector::new(settings.max_period, settings.prefer_larger_period)?;
    info!(
        max_period = settings.max_period,
        prefer_larger_period = settings.prefer_larger_period,
        overrides = overrides.applied.len(),
        "Detector ready"
    );

    // scan_stream flushes after each input's summary
    let mut stdout = BufWriter::new(tokio::io::stdout());
    let mut summaries = Vec::new();
    for input in resolve_inputs(&args.inputs) {
        summaries.push(scan_input(&input, &mut stdout, &mut detector, &parser, &settings).await?);
    }

    Ok(summaries)
}
