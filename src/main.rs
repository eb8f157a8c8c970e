use anyhow::{bail, Context, Result};
use canloss::fetch::boundaries;
use canloss::pipeline::{run, RunOptions, RunOutcome, RunSummary};
use canloss::process::{distinct_years, load_all, Dataset, Metric};
use canloss::region::UnknownRegionPolicy;
use clap::{Parser, Subcommand};
use glob::glob;
use reqwest::Client;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "canloss")]
#[command(about = "Aggregates Canadian catastrophe losses per province")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate losses per province and print the summary table
    Run {
        /// CSV files to load
        paths: Vec<PathBuf>,
        /// Directory to scan for *.csv datasets
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Dataset names (file stems) to keep, comma-separated. Default: all
        #[arg(long)]
        dataset: Option<String>,
        /// Years to keep, comma-separated (e.g. 2019,2020). Default: every observed year
        #[arg(long)]
        years: Option<String>,
        /// Figure to report: total-loss or severity
        #[arg(long, default_value = "total-loss")]
        metric: String,
        /// Drop rows naming unknown regions instead of aborting
        #[arg(long)]
        skip_unknown_regions: bool,
        /// Write the summary as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write the summary as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Verify summary names against the boundary file
        #[arg(long)]
        check_boundaries: bool,
        /// Cache directory for the boundary file
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
    },
    /// List the distinct years present in the given datasets
    Years {
        /// CSV files to inspect
        paths: Vec<PathBuf>,
        /// Directory to scan for *.csv datasets
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Prefetch the province boundary file into the cache
    Boundaries {
        /// Cache directory for the boundary file
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
        /// Refresh even when a cached copy exists
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            paths,
            data_dir,
            dataset,
            years,
            metric,
            skip_unknown_regions,
            json,
            csv,
            check_boundaries,
            cache_dir,
        } => {
            let datasets = collect_datasets(&paths, data_dir.as_deref(), dataset.as_deref())?;
            if datasets.is_empty() {
                println!("No datasets selected; nothing to do.");
                return Ok(());
            }

            let metric = parse_metric(&metric)?;
            let options = RunOptions {
                years: years.as_deref().map(parse_years).transpose()?,
                metric,
                unknown_region: if skip_unknown_regions {
                    UnknownRegionPolicy::Skip
                } else {
                    UnknownRegionPolicy::Fail
                },
            };

            let summary = match run(&datasets, &options)? {
                RunOutcome::Summary(summary) => summary,
                RunOutcome::NoData => {
                    println!("No records match the selection.");
                    return Ok(());
                }
            };

            print_summary(&summary, metric);

            if let Some(path) = json {
                export_json(&path, &summary)?;
                info!(path = %path.display(), "wrote JSON summary");
            }
            if let Some(path) = csv {
                export_csv(&path, &summary)?;
                info!(path = %path.display(), "wrote CSV summary");
            }
            if check_boundaries {
                report_missing_boundaries(&cache_dir, &summary).await?;
            }
            Ok(())
        }
        Commands::Years { paths, data_dir } => {
            let datasets = collect_datasets(&paths, data_dir.as_deref(), None)?;
            if datasets.is_empty() {
                println!("No datasets selected; nothing to do.");
                return Ok(());
            }
            let records = load_all(&datasets)?;
            let years = distinct_years(&records);
            if years.is_empty() {
                println!("No usable years found.");
            } else {
                for year in years {
                    println!("{year}");
                }
            }
            Ok(())
        }
        Commands::Boundaries { cache_dir, force } => {
            let client = Client::new();
            let path = if force {
                boundaries::download(&client, &cache_dir).await?
            } else {
                boundaries::cached_or_fetch(&client, &cache_dir).await?
            };
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Gather datasets from explicit paths plus an optional directory scan,
/// keeping only the named ones when a selection is given.
fn collect_datasets(
    paths: &[PathBuf],
    data_dir: Option<&Path>,
    selection: Option<&str>,
) -> Result<Vec<Dataset>> {
    let mut files: Vec<PathBuf> = paths.to_vec();
    if let Some(dir) = data_dir {
        let pattern = dir.join("*.csv");
        let pattern = pattern
            .to_str()
            .context("data directory path is not valid UTF-8")?;
        let mut discovered: Vec<PathBuf> = glob(pattern)?.filter_map(Result::ok).collect();
        discovered.sort();
        files.extend(discovered);
    }

    let selected: Option<Vec<&str>> =
        selection.map(|list| list.split(',').map(str::trim).collect());

    let mut datasets = Vec::with_capacity(files.len());
    for path in files {
        if let Some(ref names) = selected {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            if !names.contains(&stem) {
                debug!(path = %path.display(), "not selected, skipping");
                continue;
            }
        }
        datasets.push(Dataset::from_csv_path(&path)?);
    }
    Ok(datasets)
}

fn parse_metric(value: &str) -> Result<Metric> {
    match value {
        "total-loss" => Ok(Metric::TotalLoss),
        "severity" => Ok(Metric::Severity),
        other => bail!("unknown metric `{other}`; use total-loss or severity"),
    }
}

/// Parse a comma-separated year list such as "2019,2020".
fn parse_years(list: &str) -> Result<BTreeSet<i32>> {
    let mut years = BTreeSet::new();
    for token in list.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let year: i32 = token
            .parse()
            .with_context(|| format!("invalid year `{token}`"))?;
        years.insert(year);
    }
    Ok(years)
}

fn print_summary(summary: &RunSummary, metric: Metric) {
    let report = &summary.report;
    let years: Vec<String> = report.years.iter().map(|y| y.to_string()).collect();
    println!(
        "Records: {} of {} | Years: {}",
        report.records_selected,
        report.records_loaded,
        years.join(", ")
    );
    println!();

    match metric {
        Metric::TotalLoss => {
            println!(
                "{:<6} {:<26} {:>12} {:>7}",
                "Code", "Province", "Total (B$)", "Events"
            );
            for row in &summary.rows {
                println!(
                    "{:<6} {:<26} {:>12.3} {:>7}",
                    row.code, row.display_name, row.total_loss, row.event_count
                );
            }
        }
        Metric::Severity => {
            println!(
                "{:<6} {:<26} {:>12} {:>7} {:>12}",
                "Code", "Province", "Total (B$)", "Events", "Severity"
            );
            for row in &summary.rows {
                println!(
                    "{:<6} {:<26} {:>12.3} {:>7} {:>12.3}",
                    row.code,
                    row.display_name,
                    row.total_loss,
                    row.event_count,
                    row.severity.unwrap_or(f64::NAN)
                );
            }
        }
    }
}

fn export_json(path: &Path, summary: &RunSummary) -> Result<()> {
    let body = serde_json::to_string_pretty(summary)?;
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn export_csv(path: &Path, summary: &RunSummary) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("writing {}", path.display()))?;
    writer.write_record([
        "code",
        "province",
        "total_loss_billions",
        "event_count",
        "severity",
    ])?;
    for row in &summary.rows {
        writer.write_record([
            row.code.code().to_string(),
            row.display_name.to_string(),
            row.total_loss.to_string(),
            row.event_count.to_string(),
            row.severity.map(|s| s.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Fetch (or reuse) the boundary file and warn about any summary province
/// the choropleth would fail to draw.
async fn report_missing_boundaries(cache_dir: &Path, summary: &RunSummary) -> Result<()> {
    let client = Client::new();
    let path = boundaries::cached_or_fetch(&client, cache_dir).await?;
    let index = boundaries::BoundaryIndex::load(&path)?;
    let missing = index.missing_names(&summary.rows);
    if missing.is_empty() {
        info!(
            features = index.len(),
            "all summary provinces present in boundary file"
        );
    } else {
        for name in missing {
            warn!(name, "province missing from boundary file");
        }
    }
    Ok(())
}
