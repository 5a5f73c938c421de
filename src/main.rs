use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use quote_scraper::daily::{self, MERGED_FILE};
use quote_scraper::pipeline::{self, RunReport};
use quote_scraper::{store, Settings, Source};

#[derive(Parser)]
#[command(name = "quote_scraper", about = "Scripture quote extractor for the quote-of-the-day page")]
struct Cli {
    /// Output directory (overrides quotes.toml and QUOTES_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and extract one source
    Scrape {
        #[arg(value_enum)]
        source: Source,
    },
    /// Extract every source, one after another
    All,
    /// Extract from a local copy of a source document
    Parse {
        #[arg(value_enum)]
        source: Source,
        input: PathBuf,
        /// Write here instead of the source's default file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Combine per-source files into quotes.json
    Merge,
    /// Print the quote of the day
    Daily {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Show record counts per output file
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()
        .context("loading settings")?
        .with_data_dir(cli.data_dir);

    let result = match cli.command {
        Commands::Scrape { source } => {
            let report = pipeline::run(source, &settings)
                .await
                .with_context(|| format!("extracting {}", source))?;
            print_report(&report);
            Ok(())
        }
        Commands::All => run_all(&settings).await,
        Commands::Parse { source, input, output } => {
            let report = pipeline::run_file(source, &input, output.as_deref(), &settings)
                .with_context(|| format!("parsing {}", input.display()))?;
            print_report(&report);
            Ok(())
        }
        Commands::Merge => {
            let report = daily::merge(&settings).context("merging quotes")?;
            for (source, count) in &report.per_source {
                println!("{:<13} {:>6}", source.to_string(), count);
            }
            match &report.path {
                Some(path) => println!("Merged {} unique quotes into {}", report.total, path.display()),
                None => println!("No quotes to merge. Run 'scrape' or 'all' first."),
            }
            Ok(())
        }
        Commands::Daily { date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let quote = daily::daily_quote(&settings, date)
                .with_context(|| format!("reading {}", MERGED_FILE))?;
            println!("\"{}\"", quote.text);
            println!("  - {}, {}", quote.author, quote.source);
            Ok(())
        }
        Commands::Stats => {
            let mut total = 0;
            for source in Source::ALL {
                let file = source.config().output_file;
                let count = count_records(&settings, file)?;
                total += count.unwrap_or(0);
                println!("{:<26} {}", file, fmt_count(count));
            }
            println!("{:<26} {}", "(sum)", total);
            println!("{:<26} {}", MERGED_FILE, fmt_count(count_records(&settings, MERGED_FILE)?));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// A failing source is logged and the rest still run.
async fn run_all(settings: &Settings) -> anyhow::Result<()> {
    let pb = ProgressBar::new(Source::ALL.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut reports = Vec::new();
    let mut failed = Vec::new();
    for source in Source::ALL {
        pb.set_message(source.to_string());
        match pipeline::run(source, settings).await {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(%source, "Extraction failed: {}", e);
                failed.push(source);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    for report in &reports {
        print_report(report);
    }
    if failed.is_empty() {
        info!("All sources extracted");
    } else {
        let names: Vec<String> = failed.iter().map(Source::to_string).collect();
        println!("Failed: {}", names.join(", "));
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    match &report.path {
        Some(path) => println!(
            "{}: {} quotes ({} parsed, {} duplicates) -> {}",
            report.source,
            report.unique,
            report.parsed,
            report.parsed - report.unique,
            path.display()
        ),
        None => println!("{}: no quotes extracted, nothing written", report.source),
    }
}

fn count_records(settings: &Settings, file: &str) -> anyhow::Result<Option<usize>> {
    let path = settings.output_path(file);
    if !path.exists() {
        return Ok(None);
    }
    let records = store::read_records(&path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Some(records.len()))
}

fn fmt_count(count: Option<usize>) -> String {
    count.map(|c| c.to_string()).unwrap_or_else(|| "-".into())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
