mod config;
mod dataset;
mod insights;
mod loader;
mod models;
mod pipeline;
mod report;
mod scraper;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;
use crate::dataset::DuplicatePolicy;
use crate::insights::InsightEngine;
use crate::loader::load_dataset;
use crate::models::{RegionRecord, SummaryRecord};
use crate::pipeline::Pipeline;
use crate::scraper::parsers::TableExtractor;

#[derive(Parser)]
#[command(name = "election-insights", about = "Election results scraper and report", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape both result views, then write tables, insights and charts
    Run,

    /// Recompute insights from previously exported CSV files
    Insights {
        /// National summary CSV (Party,Won,Leading,Total)
        #[arg(short, long)]
        summary: PathBuf,

        /// Party-wise CSV (Party,Seats,Total Votes)
        #[arg(short, long)]
        region: Option<PathBuf>,
    },

    /// Run the row extractor over a saved page
    Extract {
        /// Saved HTML file
        #[arg(long)]
        html: PathBuf,

        /// Use the party-wise extraction rules
        #[arg(long)]
        region: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "election_insights=info,warn",
        1 => "election_insights=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Run => {
            let stats = Pipeline::new(config).run().await?;
            info!(
                "Done: {} seats across {} rows, {} insights",
                stats.total_seats, stats.summary_rows, stats.insights
            );
        }

        Command::Insights { summary, region } => {
            let policy = DuplicatePolicy::from_flag(config.dataset.merge_duplicates);
            let summary = load_dataset::<SummaryRecord>(&summary, policy)?;
            let region = region
                .map(|path| load_dataset::<RegionRecord>(&path, policy))
                .transpose()?;

            let report = InsightEngine::new(&config.insights).run(&summary, region.as_ref());
            println!("The total number of seats in the parliamentary elections is {}.", report.total_seats);
            for line in report.lines() {
                println!("{}", line);
            }
        }

        Command::Extract { html, region } => {
            let markup = std::fs::read_to_string(&html)
                .with_context(|| format!("Failed to read {:?}", html))?;
            let extractor = TableExtractor::new(&config.browser.table_selector)?;
            let rows = if region {
                extractor.region_rows(&markup)
            } else {
                extractor.summary_rows(&markup)?
            };

            println!("{} rows:", rows.len());
            for row in &rows {
                println!("  {}", row.join(" | "));
            }
        }
    }

    Ok(())
}
