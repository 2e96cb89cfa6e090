//! MalDetect: command-line client for a MalDetect scanning server.
//!
//! This is the main entry point for the CLI application.

use chrono::Local;
use maldetect::client::{DashboardStats, HttpScanClient, SingleScanReport};
use maldetect::core::config::Config;
use maldetect::core::error::{Error, Result};
use maldetect::core::types::{Algorithm, RunReport};
use maldetect::scanner::{ConsoleProgressReporter, NoopView, ScanPipeline, ScanView, UploadQueue};
use maldetect::ui::cli::{Cli, Commands, ConfigAction, OutputFormat};
use maldetect::ui::report::{generate_report, render_table, CsvExporter, ReportFormat, ResultSummary};
use maldetect::utils::format::dated_file_name;
use maldetect::utils::logging::{init_logging, LogConfig};
use maldetect::utils::{format_bytes, HashCalculator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{} error: {:?}", e.category(), e);
            eprintln!("Error: {}", e);
            if let Some(suggestion) = e.suggestion() {
                eprintln!("  {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let (config_path, mut config) = match cli.config.clone() {
        Some(path) => {
            let config = Config::load_explicit(&path)?;
            (path, config)
        }
        None => {
            let path = Config::default_config_path();
            let config = Config::load_from_or_default(&path);
            (path, config)
        }
    };

    // Initialize logging based on configuration and verbosity
    let log_config = LogConfig::from_config(&config);
    let log_config = if cli.verbose {
        log_config.overridden_by(LogConfig::verbose())
    } else if cli.format == OutputFormat::Json {
        log_config.overridden_by(LogConfig::quiet())
    } else {
        log_config
    };
    init_logging(log_config)?;

    log::info!("MalDetect v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Configuration loaded from {}", config_path.display());

    if let Some(server) = cli.server {
        config.server.base_url = server;
    }

    // Handle commands
    match cli.command {
        Some(Commands::BulkScan {
            paths,
            algo,
            recursive,
            csv,
            html,
            json,
            delay_ms,
        }) => {
            if let Some(ms) = delay_ms {
                config.pipeline.inter_item_delay_ms = ms;
            }
            config.validate()?;
            let exports = Exports { csv, html, json };
            run_bulk_scan(&config, &paths, algo, recursive, exports, cli.format, cli.verbose).await
        }
        Some(Commands::Scan { path, algo }) => {
            config.validate()?;
            run_scan(&config, &path, algo, cli.format).await
        }
        Some(Commands::Health) => {
            config.validate()?;
            run_health(&config, cli.format).await
        }
        Some(Commands::Dashboard { export }) => {
            config.validate()?;
            run_dashboard(&config, export, cli.format).await
        }
        Some(Commands::Config { action }) => run_config(action, &config, &config_path),
        Some(Commands::Info) => run_info(&config, &config_path),
        None => {
            // No command specified, show help
            println!("MalDetect - Machine-learning malware scanning client");
            println!();
            println!("Use --help for usage information");
            println!();
            println!("Quick start:");
            println!("  maldetect health                      Check the server");
            println!("  maldetect scan sample.exe             Scan one file");
            println!("  maldetect bulk-scan ./samples -r --csv  Scan a folder, export CSV");
            Ok(())
        }
    }
}

/// Export targets requested for a bulk scan; `Some(None)` means the default filename.
struct Exports {
    csv: Option<Option<PathBuf>>,
    html: Option<Option<PathBuf>>,
    json: Option<PathBuf>,
}

fn export_path(config: &Config, requested: Option<PathBuf>, format: ReportFormat) -> PathBuf {
    requested.unwrap_or_else(|| {
        config
            .reports
            .resolve(&format.default_file_name(Local::now().date_naive()))
    })
}

/// Run a bulk scan.
async fn run_bulk_scan(
    config: &Config,
    paths: &[PathBuf],
    algo: Option<Algorithm>,
    recursive: bool,
    exports: Exports,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let queue = UploadQueue::from_paths(paths, recursive)?;
    log::info!(
        "Queued {} file(s), {} total",
        queue.len(),
        format_bytes(queue.total_bytes())
    );

    let client = Arc::new(HttpScanClient::new(&config.server)?);
    let view: Arc<dyn ScanView> = match format {
        OutputFormat::Text if verbose => Arc::new(ConsoleProgressReporter::new().verbose()),
        OutputFormat::Text => Arc::new(ConsoleProgressReporter::new()),
        OutputFormat::Json => Arc::new(NoopView),
    };

    let pipeline = ScanPipeline::new(client)
        .with_config(&config.pipeline)
        .with_view(view);
    pipeline.add_files(queue.snapshot())?;

    let algorithm = algo.or(config.server.default_algorithm);
    let report = pipeline
        .start(algorithm)
        .await?
        .ok_or_else(|| Error::Internal("a bulk scan is already running".to_string()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_run_summary(&report),
    }

    if let Some(requested) = exports.csv {
        let path = export_path(config, requested, ReportFormat::Csv);
        generate_report(&report, ReportFormat::Csv, &path)?;
        eprintln!("Results exported to {}", path.display());
    }
    if let Some(requested) = exports.html {
        let path = export_path(config, requested, ReportFormat::Html);
        generate_report(&report, ReportFormat::Html, &path)?;
        eprintln!("Report written to {}", path.display());
    }
    if let Some(path) = exports.json {
        generate_report(&report, ReportFormat::Json, &path)?;
        eprintln!("Run report written to {}", path.display());
    }

    Ok(())
}

fn print_run_summary(report: &RunReport) {
    let summary = ResultSummary::from_outcomes(&report.outcomes);

    println!();
    println!("=== Bulk Scan Complete ===");
    println!("Run ID:          {}", report.run_id);
    println!("Status:          {}", report.state);
    println!("Total Files:     {}", summary.total);
    println!("Threats:         {}", summary.malicious);
    println!("Clean:           {}", summary.benign);
    println!("Errors:          {}", summary.errors);
    println!("Threat Rate:     {}", summary.threat_rate_text());
    println!("Duration:        {:.1} seconds", report.duration_secs());
    println!();
    print!("{}", render_table(&report.outcomes));
}

/// Scan a single file.
async fn run_scan(
    config: &Config,
    path: &Path,
    algo: Option<Algorithm>,
    format: OutputFormat,
) -> Result<()> {
    let client = HttpScanClient::new(&config.server)?;
    let algorithm = algo.or(config.server.default_algorithm);

    log::info!("Scanning {} via {}", path.display(), client.base_url());
    let report = client.scan_file(path, algorithm).await?;

    let verified = match report.stats {
        Some(ref stats) => Some(HashCalculator::verify_sha256(path, &stats.sha256)?),
        None => None,
    };
    if verified == Some(false) {
        log::warn!("Server SHA-256 does not match the local file");
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_single_report(path, &report, verified),
    }
    Ok(())
}

fn print_single_report(path: &Path, report: &SingleScanReport, verified: Option<bool>) {
    println!();
    println!("=== Scan Result ===");
    println!("File:            {}", path.display());
    println!("Prediction:      {}", report.label);
    println!("Confidence:      {}", report.confidence_percent());
    println!("Risk:            {}", report.risk());

    let model_name = report.model.name.as_deref().unwrap_or("unknown");
    match report.model.version {
        Some(ref version) => println!("Model:           {} v{}", model_name, version),
        None => println!("Model:           {}", model_name),
    }
    if let Some(ref algo) = report.algo {
        println!("Algorithm:       {}", algo.to_uppercase());
    }

    if let Some(ref stats) = report.stats {
        let check = match verified {
            Some(true) => "verified",
            Some(false) => "MISMATCH",
            None => "unchecked",
        };
        println!("SHA-256:         {} ({})", stats.sha256, check);
        println!("Size:            {}", format_bytes(stats.file_size as u64));
        println!("Entropy:         {:.2}", stats.entropy);
    }
}

/// Check server health.
async fn run_health(config: &Config, format: OutputFormat) -> Result<()> {
    let client = HttpScanClient::new(&config.server)?;
    let health = client.health().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
        OutputFormat::Text => println!("Server {}: {}", client.base_url(), health.status),
    }

    if health.is_ok() {
        Ok(())
    } else {
        Err(Error::Network(format!("server reported status '{}'", health.status)))
    }
}

/// Show dashboard statistics.
async fn run_dashboard(
    config: &Config,
    export: Option<Option<PathBuf>>,
    format: OutputFormat,
) -> Result<()> {
    let client = HttpScanClient::new(&config.server)?;
    let stats = client.dashboard_stats().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => print_dashboard(&stats),
    }

    if let Some(requested) = export {
        let path = requested.unwrap_or_else(|| {
            config.reports.resolve(&dated_file_name(
                "maldetect-dashboard",
                Local::now().date_naive(),
                "csv",
            ))
        });
        CsvExporter::new().export_recent_scans(&stats.recent_scans, &path)?;
        eprintln!("Data exported to {}", path.display());
    }
    Ok(())
}

fn print_dashboard(stats: &DashboardStats) {
    let totals = &stats.statistics;
    println!("=== Scan Statistics ===");
    println!("Total Scans:     {}", totals.total_scans);
    println!("Malicious:       {}", totals.malicious_count);
    println!("Benign:          {}", totals.benign_count);
    println!("Malicious Rate:  {:.1}%", totals.malicious_percentage);

    if !totals.algorithm_usage.is_empty() {
        println!();
        println!("Algorithm Usage:");
        for (algorithm, count) in &totals.algorithm_usage {
            println!("  {:<6} {}", algorithm.to_uppercase(), count);
        }
    }

    if !totals.daily_scans.is_empty() {
        println!();
        println!("Daily Scans (last 30 days):");
        for day in &totals.daily_scans {
            println!("  {}  {}", day.date, day.count);
        }
    }

    if !stats.model_performance.is_empty() {
        println!();
        println!("Model Performance:");
        for model in &stats.model_performance {
            println!(
                "  {:<6} accuracy {:.1}%  precision {:.1}%  recall {:.1}%  F1 {:.1}%",
                model.algorithm.to_uppercase(),
                model.accuracy * 100.0,
                model.precision * 100.0,
                model.recall * 100.0,
                model.f1_score * 100.0
            );
        }
    }

    if !stats.recent_scans.is_empty() {
        println!();
        println!("Recent Scans:");
        for scan in &stats.recent_scans {
            println!(
                "  {}  {:<32}  {:<9}  {:>6.1}%  {}",
                scan.scan_timestamp.as_deref().unwrap_or("-"),
                scan.filename,
                scan.label,
                scan.confidence * 100.0,
                scan.algorithm.to_uppercase()
            );
        }
    }
}

/// Handle configuration commands.
fn run_config(action: ConfigAction, config: &Config, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigAction::Reset { yes } => {
            if !yes {
                println!("This will overwrite {}.", config_path.display());
                println!("Re-run with --yes to confirm.");
                return Ok(());
            }
            log::info!("Resetting configuration to defaults...");
            Config::default().save(config_path)?;
            println!("Configuration reset to defaults.");
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }
    Ok(())
}

/// Show application information.
fn run_info(config: &Config, config_path: &Path) -> Result<()> {
    let algorithm = config
        .server
        .default_algorithm
        .map(|a| a.as_str().to_uppercase())
        .unwrap_or_else(|| "server default".to_string());
    let output_dir = config
        .reports
        .output_dir
        .as_ref()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "current directory".to_string());

    println!("MalDetect - Machine-learning malware scanning client");
    println!();
    println!("Version:          {}", env!("CARGO_PKG_VERSION"));
    println!("Config Path:      {}", config_path.display());
    println!("Data Directory:   {}", Config::data_dir().display());
    println!();
    println!("Server Settings:");
    println!("  Base URL:       {}", config.server.base_url);
    println!("  Timeout:        {} s", config.server.timeout_secs);
    println!("  Algorithm:      {}", algorithm);
    println!();
    println!("Bulk Scan Settings:");
    println!("  Upload Pause:   {} ms", config.pipeline.inter_item_delay_ms);
    println!("  Reports To:     {}", output_dir);
    Ok(())
}
