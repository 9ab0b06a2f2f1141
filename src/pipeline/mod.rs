//! Pipeline orchestrator: ties navigator → datasets → insights → report.
//!
//! ## Run
//!
//! 1. Traverse the national summary (anchor page + every state sub-page),
//!    then the party-wise page, each with its own browser session. Both run
//!    on one blocking thread, strictly in sequence.
//! 2. Build both datasets.
//! 3. Compute the insight battery.
//! 4. Write CSVs, insights, and charts.
//!
//! A navigation failure in step 1 aborts before anything is written.

use crate::config::AppConfig;
use crate::dataset::{Dataset, DuplicatePolicy};
use crate::insights::InsightEngine;
use crate::models::{RegionRecord, SummaryRecord};
use crate::report::ReportSink;
use crate::scraper::chrome::ChromeLauncher;
use crate::scraper::{scrape_all, SessionFactory};
use crate::utils::{format_table, StepClock};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub struct Pipeline<F> {
    config: AppConfig,
    factory: F,
}

impl Pipeline<ChromeLauncher> {
    pub fn new(config: AppConfig) -> Self {
        let factory = ChromeLauncher::new(&config.browser);
        Self { config, factory }
    }
}

impl<F> Pipeline<F>
where
    F: SessionFactory + Send + 'static,
{
    pub fn with_factory(config: AppConfig, factory: F) -> Self {
        Self { config, factory }
    }

    pub async fn run(self) -> Result<RunSummary> {
        let mut clock = StepClock::start("election results run");
        let Pipeline { config, factory } = self;

        // ── 1. Traverse ───────────────────────────────────────────────────────
        info!("=== Step 1: Traversing result pages ===");
        let browser = config.browser.clone();
        let (summary_rows, region_rows) =
            tokio::task::spawn_blocking(move || scrape_all(&factory, &browser))
                .await
                .context("Traversal task panicked")?
                .context("Traversal failed")?;
        clock.lap("traverse");

        // ── 2. Build datasets ─────────────────────────────────────────────────
        info!("=== Step 2: Building datasets ===");
        let policy = DuplicatePolicy::from_flag(config.dataset.merge_duplicates);
        let summary: Dataset<SummaryRecord> =
            Dataset::build(summary_rows, policy).context("Summary table broke its schema")?;
        let region: Dataset<RegionRecord> =
            Dataset::build(region_rows, policy).context("Party-wise table broke its schema")?;
        clock.lap("build");

        println!("\nMain Results Table:\n{}", format_table(&summary));
        println!("\nParty-wise Results Table:\n{}", format_table(&region));

        // ── 3. Insights ───────────────────────────────────────────────────────
        info!("=== Step 3: Computing insights ===");
        let report = InsightEngine::new(&config.insights).run(&summary, Some(&region));
        clock.lap("insights");
        println!();
        for line in report.lines() {
            println!("{}", line);
        }

        // ── 4. Report ─────────────────────────────────────────────────────────
        info!("=== Step 4: Writing report to {:?} ===", config.report.output_dir);
        let written = ReportSink::new(&config.report)
            .write_all(&summary, &region, &report)
            .context("Report generation failed")?;
        clock.lap("report");

        let stats = RunSummary {
            summary_rows: summary.len(),
            region_rows: region.len(),
            insights: report.insights.len(),
            total_seats: report.total_seats,
            written,
            timings: clock.steps().to_vec(),
        };
        info!(
            "=== Done: {} summary rows | {} party-wise rows | {} insights | {} files ===",
            stats.summary_rows,
            stats.region_rows,
            stats.insights,
            stats.written.len(),
        );
        Ok(stats)
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub summary_rows: usize,
    pub region_rows: usize,
    pub insights: usize,
    pub total_seats: i64,
    pub written: Vec<PathBuf>,
    pub timings: Vec<(&'static str, Duration)>,
}
