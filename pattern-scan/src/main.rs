use clap::Parser;
use pattern_scan_lib::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    pattern_scan_lib::init_logging();

    let args = CliArgs::parse();
    pattern_scan_lib::run(args).await?;
    Ok(())
}
