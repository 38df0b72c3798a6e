use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio::io::{AsyncBufRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coin_signal::config::{self, AppConfig};
use coin_signal::engine::IndicatorEngine;
use coin_signal::feed::{self, FeedFormat};
use coin_signal::error::FeedError;
use coin_signal::follow::{analysis_loop, check_follow_format, ingest};
use coin_signal::notifier::json::JsonNotifier;
use coin_signal::notifier::terminal::TerminalNotifier;
use coin_signal::notifier::{Notifier, SignalReport};
use coin_signal::series::SharedSeries;
use coin_signal::signal::SignalState;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("feed error")]
    Feed,
    #[display("indicator error")]
    Engine,
    #[display("runtime error")]
    Runtime,
}

#[derive(Parser)]
#[command(name = "coin-signal", about = "RSI / Bollinger Band trading signal")]
struct Cli {
    /// Path to the TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Price feed to read; stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Feed format: closes | upbit | lines [default: closes]
    #[arg(short, long)]
    format: Option<String>,

    /// Print reports as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Keep reading one price per line and re-evaluate after each one
    #[arg(long)]
    follow: bool,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load(path).change_context(AppError::Config)?,
        None => AppConfig::default(),
    };

    init_tracing(&config);

    let engine = IndicatorEngine::from_config(&config).change_context(AppError::Config)?;
    let notifier: Arc<dyn Notifier> = if cli.json {
        Arc::new(JsonNotifier::stdout())
    } else {
        Arc::new(TerminalNotifier)
    };

    if cli.follow {
        return run_follow(&cli, &config, engine, notifier).await;
    }

    let format_name = cli.format.as_deref().unwrap_or(FeedFormat::Closes.as_str());
    let format = FeedFormat::parse(format_name)
        .ok_or_else(|| {
            Report::new(FeedError::UnsupportedFormat {
                name: format_name.to_owned(),
            })
        })
        .change_context(AppError::Feed)?;
    let input = read_input(cli.input.as_deref()).await?;
    let series = feed::decode_series(format, &input).change_context(AppError::Feed)?;

    info!(
        symbol = %config.market.symbol,
        format = %format,
        closes = series.len(),
        "price feed loaded"
    );

    let outcome = match engine.compute(&series) {
        Err(e) if !e.current_context().is_insufficient_data() => {
            return Err(e.change_context(AppError::Engine));
        }
        outcome => outcome,
    };

    let mut state = SignalState::Pending;
    state.observe(&outcome);
    notifier.notify(&SignalReport::new(
        &config.market.symbol,
        state,
        series.len(),
        engine.required_prices(),
        outcome.ok(),
    ));

    Ok(())
}

async fn run_follow(
    cli: &Cli,
    config: &AppConfig,
    engine: IndicatorEngine,
    notifier: Arc<dyn Notifier>,
) -> Result<(), Report<AppError>> {
    check_follow_format(cli.format.as_deref()).change_context(AppError::Feed)?;

    let series = SharedSeries::with_retention(config.general.retention);
    let reader = open_reader(cli.input.as_deref()).await?;
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel::<usize>(1024);

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl+c received, shutting down");
            ctrl_c_cancel.cancel();
        }
    });

    let ingest_handle = tokio::spawn(ingest(reader, series.clone(), tx, cancel));
    let analysis_handle = tokio::spawn(analysis_loop(
        rx,
        series,
        engine,
        config.market.symbol.clone(),
        notifier,
    ));

    // Ingestion ends on EOF or ctrl+c; dropping its sender then drains the analysis loop.
    let appended = ingest_handle
        .await
        .change_context(AppError::Runtime)?
        .change_context(AppError::Feed)?;

    let final_state = tokio::time::timeout(Duration::from_secs(5), analysis_handle)
        .await
        .change_context(AppError::Runtime)?
        .change_context(AppError::Runtime)?;

    info!(appended, state = %final_state, "follow mode finished");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn read_input(path: Option<&Path>) -> Result<String, Report<AppError>> {
    let mut input = String::new();
    match path {
        Some(path) => {
            input = tokio::fs::read_to_string(path)
                .await
                .change_context(AppError::Feed)
                .attach_with(|| format!("path: {}", path.display()))?;
        }
        None => {
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .change_context(AppError::Feed)?;
        }
    }
    Ok(input)
}

async fn open_reader(
    path: Option<&Path>,
) -> Result<Box<dyn AsyncBufRead + Send + Unpin>, Report<AppError>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .change_context(AppError::Feed)
                .attach_with(|| format!("path: {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}
