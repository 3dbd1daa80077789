//! Product intelligence CLI
//!
//! Loads the catalog and its feeds from a data directory, scores every product
//! and writes the prioritized report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;

use prodintel_infra::{AnalysisPipeline, DirectorySource, EngineConfig, JsonFileReportWriter, PipelineReport};
use prodintel_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "prodintel")]
#[command(version)]
#[command(about = "Merge product feeds and rank products by restock and pricing priority", long_about = None)]
struct Cli {
    /// Directory holding the catalog, movement, metrics and marketplace files
    #[arg(long, value_name = "DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Report output path
    #[arg(long, value_name = "FILE", default_value = "./outputs/analysis_report.json")]
    output: PathBuf,

    /// Evaluation instant (RFC 3339 or YYYY-MM-DD); defaults to now
    #[arg(long, value_name = "INSTANT", value_parser = parse_as_of)]
    as_of: Option<DateTime<Utc>>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log output format (text, json)
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Also write the run summary and counters as JSON to this path
    #[arg(long, value_name = "FILE")]
    metrics_out: Option<PathBuf>,
}

fn parse_as_of(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("expected RFC 3339 or YYYY-MM-DD, got '{raw}'"))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::load(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn write_metrics(path: &Path, report: &PipelineReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(report)?;
    std::fs::write(path, body).with_context(|| format!("writing metrics to {}", path.display()))?;
    Ok(())
}

fn run(cli: Cli) -> Result<PipelineReport> {
    let config = load_config(cli.config.as_deref())?;

    if !cli.data_dir.is_dir() {
        bail!("data directory {} does not exist", cli.data_dir.display());
    }

    let as_of = cli.as_of.unwrap_or_else(Utc::now);
    let source = DirectorySource::new(&cli.data_dir, config.sources.clone(), config.normalizer());
    let writer = JsonFileReportWriter::new(&cli.output);

    let report = AnalysisPipeline::new(config)
        .run(&source, &writer, as_of)
        .context("analysis run failed")?;

    if let Some(path) = cli.metrics_out.as_deref() {
        write_metrics(path, &report)?;
    }

    Ok(report)
}

fn main() {
    let cli = Cli::parse();
    prodintel_observability::init_with(cli.log_format, "info");

    match run(cli) {
        Ok(report) => {
            println!(
                "{} products analysed: {} high, {} medium, {} low",
                report.summary.total, report.summary.high, report.summary.medium, report.summary.low
            );
        }
        Err(e) => {
            tracing::error!("run aborted: {e:#}");
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
