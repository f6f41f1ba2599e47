//! cmm-mi - Music Intake batch tool
//!
//! Reconciles competitor registrations against submitted music, refreshes
//! the local media cache and writes report projection data plus run
//! diagnostics for the operator.

use anyhow::{Context, Result};
use clap::Parser;
use cmm_common::config::{resolve_data_folder, TomlConfig};
use cmm_mi::services::media_cache::MediaCache;
use cmm_mi::services::media_converter::FfmpegConverter;
use cmm_mi::services::media_fetcher::HttpFetcher;
use cmm_mi::services::media_pipeline::MediaPipeline;
use cmm_mi::services::media_tagger::LoftyTagger;
use cmm_mi::services::submission_matcher::{SubmissionMatcher, DEFAULT_THRESHOLD};
use cmm_mi::snapshot::Snapshot;
use cmm_mi::workflow::BatchRunner;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cmm-mi", about = "Competition music reconciliation batch")]
struct Args {
    /// Data folder holding the input snapshot and cache namespaces
    #[arg(long)]
    data_folder: Option<PathBuf>,

    /// Input snapshot path (default: <data folder>/snapshot.json)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Report data output path (default: <data folder>/music/report.json)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Diagnostics output path (default: <data folder>/diagnostics.json)
    #[arg(long)]
    diagnostics: Option<PathBuf>,

    /// Config file path (default: platform config locations)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TomlConfig::load(path)?,
        None => TomlConfig::load_default_locations(),
    };

    // Initialize tracing; RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting cmm-mi (Music Intake)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), &config);
    info!("Data folder: {}", data_folder.display());

    let snapshot_path = args
        .snapshot
        .unwrap_or_else(|| data_folder.join("snapshot.json"));
    let snapshot = Snapshot::load(&snapshot_path)
        .with_context(|| format!("Loading snapshot {}", snapshot_path.display()))?;

    let cache = MediaCache::new(&data_folder);
    let report_path = args
        .report
        .unwrap_or_else(|| cache.converted_dir().join("report.json"));
    let diagnostics_path = args
        .diagnostics
        .unwrap_or_else(|| data_folder.join("diagnostics.json"));

    let pipeline = MediaPipeline::new(
        cache,
        Box::new(HttpFetcher::new(config.fetch_timeout_secs)?),
        Box::new(FfmpegConverter::new(config.encode_bitrate.clone())),
        Box::new(LoftyTagger::new()),
    );
    let matcher =
        SubmissionMatcher::with_threshold(config.match_threshold.unwrap_or(DEFAULT_THRESHOLD));

    let runner = BatchRunner::new(matcher, pipeline);
    let outcome = runner.run(&snapshot).await?;

    let report_json = serde_json::to_string_pretty(&outcome.report)?;
    std::fs::write(&report_path, report_json)
        .with_context(|| format!("Writing report {}", report_path.display()))?;
    info!("Report data: {}", report_path.display());

    let diagnostics_json = serde_json::to_string_pretty(outcome.diagnostics.entries())?;
    std::fs::write(&diagnostics_path, diagnostics_json)
        .with_context(|| format!("Writing diagnostics {}", diagnostics_path.display()))?;
    info!(
        entries = outcome.diagnostics.len(),
        "Diagnostics: {}",
        diagnostics_path.display()
    );

    Ok(())
}
