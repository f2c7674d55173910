use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use chartscan::params::{CONFIDENCE, PERIOD, TIMEFRAME_CHOICES};
use chartscan::prelude::*;

const SYMBOL_HINT: &str = "Please check your symbol again (if crypto need '-usd' e.g. btc-usd)";

#[derive(Parser, Debug)]
#[command(author, version, about = "Scan price history for chart patterns", long_about = None)]
struct Cli {
    /// Asset symbol (crypto needs a -USD suffix, e.g. btc-usd)
    #[arg(long, default_value = "BTC-USD")]
    symbol: String,

    /// Days of history to scan (30..=300, step 30)
    #[arg(long, default_value_t = 30)]
    period: u32,

    /// Candle interval (1h, 4h, 1d)
    #[arg(long, default_value = "1h")]
    timeframe: String,

    /// Minimum detection confidence (0.1..=1.0, step 0.1); overrides the config file
    #[arg(long)]
    confidence: Option<f64>,

    /// Only inspect the most recent window
    #[arg(long, default_value_t = false)]
    latest_only: bool,

    /// Directory holding <SYMBOL>_<interval>.csv price files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// JSON scan configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model weights passed to the detector; overrides the config file
    #[arg(long)]
    model: Option<PathBuf>,

    /// Detector program
    #[arg(long)]
    detector: PathBuf,

    /// Where to write the annotated chart
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Extra arguments for the detector program
    #[arg(last = true)]
    detector_args: Vec<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ScanConfig::default(),
    };

    if let Some(confidence) = cli.confidence {
        config.confidence = CONFIDENCE.ratio_value(confidence)?;
    }
    if cli.latest_only {
        config.latest_only = true;
    }
    if let Some(model) = &cli.model {
        config.model_path = model.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let period = PERIOD.period_value(f64::from(cli.period))?;
    let timeframe = Timeframe::from(cli.timeframe.clone());
    if !TIMEFRAME_CHOICES.contains(&timeframe.as_str()) {
        warn!(timeframe = %timeframe, "unusual timeframe, using default window size");
    }
    let config = load_config(cli)?;

    let now = chrono::Local::now().naive_local();
    let request = FetchRequest::lookback(&cli.symbol, period, timeframe.clone(), now);
    info!(symbol = %request.symbol, start = %request.start, end = %request.end, "fetching prices");
    let series = CsvPriceSource::new(&cli.data_dir).fetch(&request)?;

    let renderer = SvgRenderer::new(config.image_width, config.image_height);
    let detector = CommandDetector::new(&cli.detector, &config.model_path)
        .args(cli.detector_args.iter().cloned());
    let scanner = ScannerBuilder::new(renderer, detector).config(config).build()?;

    let result = scanner.scan_at(&series, &timeframe, now)?;
    let report = Report::from(&result);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    if let Some(path) = &cli.output {
        result
            .image
            .save(path)
            .with_context(|| format!("writing chart to {}", path.display()))?;
        info!(path = %path.display(), "chart saved");
    }

    Ok(())
}

/// Whether `err` came from loading price data for the requested symbol
fn is_fetch_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<FetchError>().is_some()
        || matches!(err.downcast_ref::<Error>(), Some(Error::Fetch(_)))
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if is_fetch_failure(&err) {
                error!("{err}");
                eprintln!("{SYMBOL_HINT}");
                ExitCode::from(2)
            } else {
                error!("{err:#}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_are_classified() {
        let missing = FetchError::SymbolNotFound { symbol: "XYZ".to_string() };
        assert!(is_fetch_failure(&anyhow::Error::new(missing)));

        let wrapped = Error::Fetch(FetchError::SymbolNotFound { symbol: "XYZ".to_string() });
        assert!(is_fetch_failure(&anyhow::Error::new(wrapped).context("loading prices")));
    }

    #[test]
    fn test_other_errors_are_not_fetch_failures() {
        let detect = Error::Detect("model missing".to_string());
        assert!(!is_fetch_failure(&anyhow::Error::new(detect)));
        assert!(!is_fetch_failure(&anyhow::anyhow!("writing chart failed")));
    }
}
