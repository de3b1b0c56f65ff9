use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod batch;
mod cli;
mod config;
mod dedupe;
mod extractor;
mod filing_cache;
mod ner;
mod normalizer;
mod processor;
mod registry;
mod snippet;
mod validator;

use batch::{BatchInput, BatchOptions, BatchOrchestrator};
use cli::{Cli, Commands};
use config::AppConfig;
use extractor::EntityExtractor;
use filing_cache::FilingCache;
use ner::EntityRecognizer;
use processor::RowProcessor;
use registry::LenderRegistry;
use snippet::SnippetSelector;
use validator::{UnmatchedNames, Validator};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.init {
        let path = AppConfig::create_default_config()?;
        println!("Created default configuration at {}", path.display());
        return Ok(());
    }

    let config = load_config()?;

    match cli.command {
        Some(Commands::Extract { ref input }) => extract(&config, &cli, input).await,
        Some(Commands::Dedupe { dir }) => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(&config.batch.output_dir));
            let processed = dedupe::dedupe_output_dir(&dir)?;
            println!("Deduplicated {} batch file(s) in {}", processed, dir.display());
            Ok(())
        }
        None => match cli.input.clone() {
            Some(input) => extract(&config, &cli, &input).await,
            None => bail!("no input file given; use --input or the 'extract' subcommand"),
        },
    }
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "lenderfinder=info",
        1 => "lenderfinder=debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config() -> Result<AppConfig> {
    match AppConfig::load() {
        Ok(config) => Ok(config),
        Err(config::ConfigError::FileNotFound(path)) => {
            match AppConfig::prompt_create_config()? {
                Some(created) => {
                    println!("Created default configuration at {}", created.display());
                    Ok(AppConfig::load()?)
                }
                None => bail!(
                    "configuration file not found at {}; run with --init to create it",
                    path.display()
                ),
            }
        }
        Err(e) => Err(e.into()),
    }
}

async fn extract(config: &AppConfig, cli: &Cli, input_path: &Path) -> Result<()> {
    let input = BatchInput::from_csv_path(input_path)
        .with_context(|| format!("failed to load input {}", input_path.display()))?;
    info!("Loaded {} input row(s) from {}", input.rows().len(), input_path.display());

    let registry = Arc::new(LenderRegistry::with_extra_aliases(&config.aliases));
    let cache = Arc::new(FilingCache::new(
        &config.http.base_url,
        &config.http.user_agent,
        Duration::from_secs(config.http.request_timeout_secs),
    )?);
    let recognizer = build_recognizer(config)?;
    let unmatched = UnmatchedNames::new();

    let processor = Arc::new(RowProcessor::new(
        cache,
        SnippetSelector::new(registry.clone(), config.extraction.snippet_window_chars),
        EntityExtractor::new(registry.clone(), recognizer),
        Validator::new(
            registry,
            config.extraction.fuzzy_threshold,
            unmatched.clone(),
        ),
    ));

    let options = BatchOptions {
        chunk_size: cli.chunk_size.unwrap_or(config.batch.chunk_size),
        parallel_jobs: cli.parallel_jobs.unwrap_or(config.batch.parallel_jobs),
        output_dir: cli
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.batch.output_dir)),
        unmatched_dir: cli
            .unmatched_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.batch.unmatched_dir)),
    };

    let orchestrator = BatchOrchestrator::new(processor, unmatched, options);
    let artifacts = orchestrator.run(&input).await?;

    println!("Processed {} batch(es):", artifacts.len());
    for artifact in &artifacts {
        println!(
            "  batch {}: {} rows -> {}, unmatched -> {}",
            artifact.batch_num,
            artifact.row_count,
            artifact.output_path.display(),
            artifact.unmatched_path.display()
        );
    }
    Ok(())
}

#[cfg(feature = "embedded-ner")]
fn build_recognizer(config: &AppConfig) -> Result<Arc<dyn EntityRecognizer>> {
    Ok(Arc::new(ner::GlinerRecognizer::new(
        config.extraction.min_confidence,
    )?))
}

#[cfg(not(feature = "embedded-ner"))]
fn build_recognizer(_config: &AppConfig) -> Result<Arc<dyn EntityRecognizer>> {
    tracing::warn!(
        "Built without the embedded-ner feature; no entities will be extracted \
         and every filing will be routed to manual review"
    );
    Ok(Arc::new(ner::NoopRecognizer))
}
