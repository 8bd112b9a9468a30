//! stockrisk CLI binary.
//!
//! Scrapes ratio tables and risk scores and writes the spreadsheet.

mod logging;
mod progress;

use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use stockrisk::data::period::DATE_FORMAT;
use stockrisk::data::stockanalysis::{RatioProvider, ScoreProvider, StockAnalysisClient};
use stockrisk::output::{ExportFormat, Layout, RunReport};
use stockrisk::{Category, Config, Pipeline, TickerList, resolve_format, write_book};

#[derive(Parser)]
#[command(name = "stockrisk")]
#[command(about = "Financial ratios and Altman Z / Piotroski F scores to a spreadsheet", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every configured ticker and write the output file
    Run {
        /// Config file (defaults to the platform config file, then built-ins)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Spreadsheet layout (consolidated or per-ticker)
        #[arg(long)]
        layout: Option<Layout>,

        /// Output format (xlsx, csv or json); guessed from the extension if omitted
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Also write a JSON run report here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Fetch and print one ratio table
    Ratios {
        /// Stock symbol
        symbol: String,

        /// Ratio page URL override
        #[arg(long)]
        url: Option<String>,

        /// Config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Fetch and print one ticker's risk scores
    Scores {
        /// Stock symbol
        symbol: String,

        /// Config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the configured tickers
    Tickers {
        /// Only show one category (mills, distributor or supplier)
        #[arg(long)]
        category: Option<Category>,

        /// Config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write the built-in defaults as a config file
    InitConfig {
        /// Destination (defaults to the platform config file)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Commands::Run {
            config,
            output,
            layout,
            format,
            report,
        } => {
            let mut config = Config::resolve(config.as_deref())?;
            if let Some(output) = output {
                config.output = output;
            }
            if let Some(layout) = layout {
                config.layout = layout;
            }
            scrape(&config, format, report.as_deref()).await?;
        }
        Commands::Ratios {
            symbol,
            url,
            config,
        } => {
            let config = Config::resolve(config.as_deref())?;
            show_ratios(&config, &symbol, url).await?;
        }
        Commands::Scores { symbol, config } => {
            let config = Config::resolve(config.as_deref())?;
            show_scores(&config, &symbol).await?;
        }
        Commands::Tickers { category, config } => {
            let config = Config::resolve(config.as_deref())?;
            list_tickers(&config.tickers, category);
        }
        Commands::InitConfig { path, force } => {
            let path = path
                .or_else(Config::default_path)
                .ok_or("no platform config directory; pass a path")?;
            init_config(&path, force)?;
        }
    }

    Ok(())
}

async fn scrape(
    config: &Config,
    format: Option<ExportFormat>,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = resolve_format(&config.output, format);
    let pipeline = Pipeline::from_config(config)?;

    println!(
        "Scraping {} tickers ({} layout, {})",
        pipeline.tickers().len(),
        config.layout,
        format
    );

    let pb = progress::ticker_bar(pipeline.tickers().len());
    pb.set_message("Fetching ratio tables...");
    let book = pipeline
        .run_with_progress(Local::now().date_naive(), |entry, block| {
            let outcome = if block.is_placeholder() {
                "no data"
            } else {
                "ok"
            };
            pb.set_message(format!("{} ({}) {}", entry.name, entry.symbol, outcome));
            pb.inc(1);
        })
        .await;
    pb.finish_with_message("Done");

    write_book(&book, &config.output, format)?;

    let report = RunReport::from_book(&book).with_output(config.output.display().to_string());
    println!("\n{}", report.summary());
    if let Some(path) = report_path {
        report.write_json(path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

/// Ratio page override for `symbol`: explicit, else the configured one.
fn ratio_url(config: &Config, symbol: &str, explicit: Option<String>) -> Option<String> {
    explicit.or_else(|| config.tickers.get(symbol).and_then(|e| e.url.clone()))
}

async fn show_ratios(
    config: &Config,
    symbol: &str,
    url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = StockAnalysisClient::with_settings(config.fetch.clone())?;
    let provider = RatioProvider::new(client, config.metrics.clone(), config.dates.clone());
    let url = ratio_url(config, symbol, url);

    let table = provider.fetch_ratios(symbol, url.as_deref()).await?;

    println!("Ratio table for {}", table.symbol());
    println!("{}", "=".repeat(60));
    println!("{:<12} {}", "Date", table.metrics().join(" | "));
    for row in table.rows() {
        let date = row.date.format(DATE_FORMAT).to_string();
        println!("{:<12} {}", date, row.values.join(" | "));
    }
    println!("\n{} periods", table.len());

    Ok(())
}

async fn show_scores(config: &Config, symbol: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = StockAnalysisClient::with_settings(config.fetch.clone())?;
    let url = ratio_url(config, symbol, None);
    let scores = ScoreProvider::new(client)
        .fetch_scores(symbol, url.as_deref())
        .await;

    if scores.is_empty() {
        println!("No scores found for {}", symbol);
    } else {
        println!("Altman Z-Score:    {}", scores.altman_z);
        println!("Piotroski F-Score: {}", scores.piotroski_f);
    }

    Ok(())
}

fn list_tickers(tickers: &TickerList, category: Option<Category>) {
    let entries = match category {
        Some(category) => tickers.in_category(category),
        None => tickers.entries().iter().collect(),
    };

    println!("{:<8} {:<32} {:<12} URL", "Symbol", "Name", "Category");
    println!("{}", "-".repeat(72));
    for entry in &entries {
        println!(
            "{:<8} {:<32} {:<12} {}",
            entry.symbol,
            entry.name,
            entry.category.map(|c| c.name()).unwrap_or("-"),
            entry.url.as_deref().unwrap_or("")
        );
    }
    println!("\n{} tickers", entries.len());

    let counts = tickers.category_counts();
    let by_category: Vec<String> = Category::all()
        .into_iter()
        .filter_map(|c| counts.get(&c).map(|n| format!("{} {}", n, c)))
        .collect();
    if !by_category.is_empty() {
        println!("By category: {}", by_category.join(", "));
    }
}

fn init_config(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    Config::default().save(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
