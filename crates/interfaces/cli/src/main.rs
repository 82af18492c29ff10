mod console;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use appscout_config::{AppConfig, DEFAULT_CONFIG_PATH, Secrets, TelemetryConfig, mask};
use appscout_llm::GeminiClient;
use appscout_runtime::{Pipeline, RunReport};
use appscout_store::PlayStoreScraper;
use appscout_telegram::{ChatSink, TelegramBot};

use console::ConsoleSink;

#[derive(Debug, Parser)]
#[command(
    name = "appscout",
    version,
    about = "Daily Play Store market reports, written by Gemini and delivered to Telegram"
)]
struct Cli {
    /// Path to the TOML config file; a missing file means built-in defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Force debug-level logging.
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape live listings for a niche and send a market report.
    Research(ReportArgs),
    /// Send a competitor/opportunity report from the niche description alone.
    Analysis(ReportArgs),
    /// Send one app idea with a motivation quote.
    Idea {
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the niche catalog.
    Niches,
    /// Show configuration and which secrets are set.  No network access.
    Doctor,
}

#[derive(Debug, Args)]
struct ReportArgs {
    /// Niche id from the catalog; random when omitted.
    #[arg(long)]
    niche: Option<String>,
    /// Print the message to stdout instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy)]
enum ReportKind {
    Research,
    Analysis,
    Idea,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let loaded = AppConfig::load_from(&cli.config);
    let telemetry = loaded
        .as_ref()
        .map(|config| config.telemetry.clone())
        .unwrap_or_default();
    let _guard = init_tracing(&telemetry, cli.debug)?;

    let result = match loaded {
        Ok(config) => run(cli.command, &cli.config, config).await,
        Err(err) => Err(err),
    };
    if let Err(err) = &result {
        error!("{err:#}");
    }
    result
}

async fn run(command: Commands, config_path: &Path, config: AppConfig) -> Result<()> {
    match command {
        Commands::Research(args) => {
            report(ReportKind::Research, args.niche.as_deref(), args.dry_run, &config).await
        }
        Commands::Analysis(args) => {
            report(ReportKind::Analysis, args.niche.as_deref(), args.dry_run, &config).await
        }
        Commands::Idea { dry_run } => report(ReportKind::Idea, None, dry_run, &config).await,
        Commands::Niches => {
            print_niches(&config);
            Ok(())
        }
        Commands::Doctor => {
            print_doctor(config_path, &config, &Secrets::from_env());
            Ok(())
        }
    }
}

async fn report(
    kind: ReportKind,
    niche: Option<&str>,
    dry_run: bool,
    config: &AppConfig,
) -> Result<()> {
    let secrets = Secrets::from_env();
    info!(?kind, niche = niche.unwrap_or("<random>"), dry_run, "starting run");
    debug!(?secrets, "secrets loaded");

    let source = PlayStoreScraper::new(&config.scraper).context("failed to build store client")?;
    let generator =
        GeminiClient::new(&config.llm, &secrets).context("failed to build Gemini client")?;
    let sink: Box<dyn ChatSink> = if dry_run {
        Box::new(ConsoleSink::new(io::stdout()))
    } else {
        Box::new(
            TelegramBot::new(&config.telegram, &secrets)
                .context("failed to build Telegram client")?,
        )
    };

    let pipeline = Pipeline {
        config,
        source: &source,
        generator: &generator,
        sink: sink.as_ref(),
    };
    let mut rng = StdRng::from_entropy();
    let now = Utc::now();

    let outcome: RunReport = match kind {
        ReportKind::Research => pipeline.research(niche, &mut rng, now).await?,
        ReportKind::Analysis => pipeline.analysis(niche, &mut rng, now).await?,
        ReportKind::Idea => pipeline.idea(&mut rng, now).await?,
    };

    info!(
        ?kind,
        niche = outcome.niche_id.as_deref().unwrap_or("-"),
        listings = outcome.listings,
        generated = outcome.generated,
        chunks = outcome.chunks,
        "run complete"
    );
    Ok(())
}

fn print_niches(config: &AppConfig) {
    for niche in &config.catalog.niches {
        println!("{:<24} {}", niche.id, niche.label);
        println!("{:<24} keywords: {}", "", niche.keywords.join(", "));
    }
}

fn print_doctor(config_path: &Path, config: &AppConfig, secrets: &Secrets) {
    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", config_path.display())
    };

    println!("appscout doctor");
    println!("- config: {source}");
    println!("- niches: {}", config.catalog.niches.len());
    println!(
        "- models: research={} analysis={} idea={}",
        config.llm.research_model, config.llm.analysis_model, config.llm.idea_model
    );
    println!(
        "- scraper: {} listings max, hl={} gl={}",
        config.scraper.max_listings, config.scraper.language, config.scraper.region
    );
    println!("- telegram chunk size: {}", config.telegram.chunk_size);
    println!("- log filter: {}", config.log_filter());

    let values = [
        secrets.telegram_bot_token(),
        secrets.telegram_chat_id(),
        secrets.gemini_api_key(),
    ];
    for ((name, _), value) in secrets.presence().into_iter().zip(values) {
        match value {
            Ok(value) => println!("- {name}: set ({})", mask(value)),
            Err(err) => println!("- {name}: {err}"),
        }
    }
}

/// Filter directive: the debug switch wins, then `RUST_LOG`, then the
/// configured level.
fn filter_directive(cli_debug: bool, rust_log: Option<String>, telemetry: &TelemetryConfig) -> String {
    if cli_debug || telemetry.debug {
        return "debug".to_string();
    }
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| telemetry.log_level.clone())
}

fn init_tracing(telemetry: &TelemetryConfig, cli_debug: bool) -> Result<Option<WorkerGuard>> {
    let directive = filter_directive(cli_debug, std::env::var("RUST_LOG").ok(), telemetry);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter '{directive}'"))?;

    let (file_layer, guard) = match telemetry.log_file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("telemetry.log_file has no file name"))?;
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .try_init()?;
    Ok(guard)
}
