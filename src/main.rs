//! HRPulse - engagement metrics for HR analytics backends
//!
//! A CLI tool that pulls employee survey data from the HR REST API,
//! computes eNPS, mean satisfaction and headcount rollups per area,
//! and writes a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success (company eNPS at or above --fail-below, or no threshold set)
//!   1 - Runtime error (connection, config, pagination failure, etc.)
//!   2 - Company eNPS below the --fail-below threshold

use anyhow::{bail, Context, Result};
use chrono::Utc;
use hrpulse::api::{self, ApiClient, PaginationOptions};
use hrpulse::cli::{Args, OutputFormat};
use hrpulse::config::{Config, CONFIG_FILE};
use hrpulse::models::{EmployeeRecord, HierarchyEntry, Report, ReportMetadata, ScoreScale};
use hrpulse::{metrics, report};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config comes first so `[general].verbose` can set the log level
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config)?;

    info!("HRPulse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    match run_report(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .hrpulse.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to point at your backend and tune pagination.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level(config.general.verbose))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Run the fetch → aggregate → report workflow. Returns exit code (0 or 2).
async fn run_report(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let scale = config.metrics.scale;
    if scale == ScoreScale::Legacy10 {
        warn!(
            "Using the {} scale. 1-7 Likert is canonical; data recorded on 0-10 should be migrated.",
            scale
        );
    }

    let client = ApiClient::new(&config.api).context("Failed to create HTTP client")?;

    // Step 1: Work out which areas to fetch
    let (company, entries, areas) = resolve_areas(&client, &args).await?;
    println!("🏢 Fetching {} areas from {}", areas.len(), client.base_url());

    // Step 2: Pull every page of every area
    let progress = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(areas.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} areas")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let collected = api::collect_areas(
        &client,
        areas,
        &PaginationOptions::from(&config.api),
        config.general.concurrency,
        progress.as_ref(),
    )
    .await
    .context("Failed to fetch employees")?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    // Step 3: Aggregate
    let all_records: Vec<EmployeeRecord> = collected
        .iter()
        .flat_map(|(_, _, records)| records.iter().cloned())
        .collect();
    info!("Fetched {} employees", all_records.len());

    let areas_fetched = collected.len();
    let overall = metrics::aggregate(&all_records, scale);
    let rollup = metrics::rollup_areas(collected, scale);

    let counts: HashMap<String, usize> = rollup
        .employee_counts()
        .into_iter()
        .map(|c| (c.area_id, c.total_employees))
        .collect();
    let hierarchy = metrics::rollup_hierarchy(&entries, &counts);
    let tenure = metrics::tenure_distribution(&all_records);

    // Step 4: Build and write the report
    let report = Report {
        metadata: ReportMetadata {
            api_url: client.base_url().to_string(),
            company,
            generated_at: Utc::now(),
            scale,
            areas_fetched,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        overall,
        rollup,
        hierarchy,
        tenure,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    let output_path = output_path(&args, &config);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    print_summary(&report);
    println!("\n✅ Report saved to: {}", output_path.display());

    // Check --fail-below threshold
    if let Some(threshold) = args.fail_below {
        match report.overall.enps_score {
            Some(score) if score < threshold => {
                eprintln!(
                    "\n⛔ Company eNPS {} is below {}. Failing (exit code 2).",
                    score, threshold
                );
                return Ok(2);
            }
            None => warn!("No retention responses; --fail-below not evaluated"),
            _ => {}
        }
    }

    Ok(0)
}

/// Areas to fetch: the explicit `--area` list, or every area of the company
/// (optionally narrowed to one `--directorate`).
async fn resolve_areas(
    client: &ApiClient,
    args: &Args,
) -> Result<(Option<String>, Vec<HierarchyEntry>, Vec<(String, Option<String>)>)> {
    if let Some(ref ids) = args.area {
        let areas = dedup_area_ids(ids);
        info!("Using {} areas from --area", areas.len());
        return Ok((args.company.clone(), Vec::new(), areas));
    }

    let company = client
        .resolve_company(args.company.as_deref())
        .await
        .context("Failed to resolve company")?;
    info!("Company: {}", company);

    let mut entries = client
        .hierarchy(&company)
        .await
        .context("Failed to fetch area hierarchy")?;

    if let Some(ref directorate) = args.directorate {
        entries = metrics::filter_directorate(&entries, directorate);
        if entries.is_empty() {
            bail!("No areas found under directorate '{}'", directorate);
        }
        info!("Directorate {}: {} areas", directorate, entries.len());
    }

    let areas = unique_areas(&entries);
    Ok((Some(company), entries, areas))
}

/// `--area` ids, trimmed and deduplicated in first-seen order.
fn dedup_area_ids(ids: &[String]) -> Vec<(String, Option<String>)> {
    let mut areas: Vec<(String, Option<String>)> = Vec::new();
    for id in ids.iter().map(|id| id.trim()) {
        if !areas.iter().any(|(seen, _)| seen == id) {
            areas.push((id.to_string(), None));
        }
    }
    areas
}

/// Area ids from hierarchy entries, deduplicated in first-seen order.
fn unique_areas(entries: &[HierarchyEntry]) -> Vec<(String, Option<String>)> {
    let mut areas: Vec<(String, Option<String>)> = Vec::new();
    for entry in entries {
        if !areas.iter().any(|(id, _)| *id == entry.area_id) {
            areas.push((entry.area_id.clone(), Some(entry.area_name.clone())));
        }
    }
    areas
}

/// Output path, switching the default extension for JSON output.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    if let Some(ref explicit) = args.output {
        return explicit.clone();
    }

    let path = PathBuf::from(&config.general.output);
    match args.format {
        OutputFormat::Json => path.with_extension("json"),
        OutputFormat::Markdown => path,
    }
}

fn print_summary(report: &Report) {
    let overall = &report.overall;

    println!("\n📊 Engagement Summary:");
    println!("   Employees: {}", overall.total_employees);
    println!("   Responses: {}", overall.valid_responses());
    match overall.enps_score {
        Some(score) => println!(
            "   eNPS: {} ({})",
            score,
            overall.band().map(|b| b.to_string()).unwrap_or_default()
        ),
        None => println!("   eNPS: N/A"),
    }
    match overall.average_score {
        Some(avg) => println!("   Avg. score: {:.2}", avg),
        None => println!("   Avg. score: N/A"),
    }
    if let Some(best) = report.rollup.best_area() {
        println!("   Best area: {}", best.label());
    }
    if let Some(worst) = report.rollup.worst_area() {
        println!("   Worst area: {}", worst.label());
    }
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);
}

/// Where the configuration came from. Logged once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    Unreadable(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE),
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Unreadable(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Unreadable(e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn entry(area_id: &str, area_name: &str) -> HierarchyEntry {
        HierarchyEntry {
            directorate_id: "d".to_string(),
            directorate: "D".to_string(),
            management_id: "g".to_string(),
            management: "G".to_string(),
            coordination_id: "c".to_string(),
            coordination: "C".to_string(),
            area_id: area_id.to_string(),
            area_name: area_name.to_string(),
        }
    }

    #[test]
    fn test_unique_areas_keeps_first_seen_order() {
        let entries = vec![entry("b", "Beta"), entry("a", "Alpha"), entry("b", "Beta")];
        let areas = unique_areas(&entries);

        assert_eq!(
            areas,
            vec![
                ("b".to_string(), Some("Beta".to_string())),
                ("a".to_string(), Some("Alpha".to_string())),
            ]
        );
    }

    #[test]
    fn test_repeated_area_ids_fetched_once() {
        let ids: Vec<String> = ["a1", " a2", "a1", "a2 ", "a3"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let areas = dedup_area_ids(&ids);
        let ids: Vec<_> = areas.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
        assert!(areas.iter().all(|(_, name)| name.is_none()));
    }

    #[test]
    fn test_config_verbose_reaches_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hrpulse.toml");
        std::fs::write(&path, "[general]\nverbose = true\n").unwrap();

        let args = Args::parse_from(["hrpulse", "--config", path.to_str().unwrap()]);
        let (mut config, _) = load_config(&args).unwrap();
        config.merge_with_args(&args);

        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);
    }

    #[test]
    fn test_output_path_follows_format() {
        let config = Config::default();

        let args = Args::parse_from(["hrpulse", "--format", "json"]);
        assert_eq!(output_path(&args, &config), PathBuf::from("hrpulse_report.json"));

        let args = Args::parse_from(["hrpulse"]);
        assert_eq!(output_path(&args, &config), PathBuf::from("hrpulse_report.md"));

        let args = Args::parse_from(["hrpulse", "--format", "json", "-o", "out.txt"]);
        assert_eq!(output_path(&args, &config), PathBuf::from("out.txt"));
    }
}
