//! Report sink: CSV snapshots, the insight text file, and two PNG charts.
//!
//! The exported CSV is the normalized dataset after numeric coercion; a cell
//! that failed to parse is written empty.

pub mod chart;

use crate::config::ReportConfig;
use crate::dataset::Dataset;
use crate::insights::{InsightReport, PartyShare};
use crate::models::{Record, RegionRecord, SummaryRecord};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use self::chart::{bar_svg, pie_svg, svg_to_png, Bar, BAR_SIZE, PIE_SIZE};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot draw {chart} from an empty selection")]
    EmptyChart { chart: &'static str },

    #[error("writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("rendering {chart}: {message}")]
    Render { chart: &'static str, message: String },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
    move |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_err(path: &Path) -> impl FnOnce(csv::Error) -> ReportError + '_ {
    move |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

// ── Writers ───────────────────────────────────────────────────────────────────

/// Header row, then one line per record; header is written even when empty.
pub fn write_dataset<R: Record>(dataset: &Dataset<R>, path: &Path) -> Result<(), ReportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err(path))?;

    wtr.write_record(R::COLUMNS).map_err(csv_err(path))?;
    for row in dataset.rows() {
        wtr.serialize(row).map_err(csv_err(path))?;
    }
    wtr.flush().map_err(io_err(path))?;

    info!("Wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

/// "Insight N: …" lines, numbered from 1.
pub fn write_insights(report: &InsightReport, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path).map_err(io_err(path))?;
    let mut out = BufWriter::new(file);
    for line in report.lines() {
        writeln!(out, "{}", line).map_err(io_err(path))?;
    }
    out.flush().map_err(io_err(path))?;

    info!("Wrote {} insights to {}", report.insights.len(), path.display());
    Ok(())
}

fn save_png(png: &[u8], path: &Path) -> Result<(), ReportError> {
    fs::write(path, png).map_err(io_err(path))?;
    info!("Wrote chart {}", path.display());
    Ok(())
}

/// Seats won per party, in dataset order.
pub fn write_bar_chart(dataset: &Dataset<SummaryRecord>, path: &Path) -> Result<(), ReportError> {
    let bars: Vec<Bar> = dataset
        .rows()
        .iter()
        .map(|r| Bar {
            label: r.party.clone(),
            value: r.won,
        })
        .collect();
    let svg = bar_svg("Seats Won by Each Party", "Seats Won", &bars)?;
    save_png(&svg_to_png(&svg, BAR_SIZE, "bar chart")?, path)
}

/// Share of the top parties, as selected by the insight engine.
pub fn write_pie_chart(top: &[PartyShare], path: &Path) -> Result<(), ReportError> {
    let title = format!("Proportion of Seats Won by Top {} Parties", top.len());
    let svg = pie_svg(&title, top)?;
    save_png(&svg_to_png(&svg, PIE_SIZE, "pie chart")?, path)
}

// ── Sink ──────────────────────────────────────────────────────────────────────

pub struct ReportSink {
    config: ReportConfig,
}

impl ReportSink {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Everything, in a fixed order: both CSVs, the insights, then the
    /// charts. A chart over an empty selection fails the run after the
    /// tabular files are on disk.
    pub fn write_all(
        &self,
        summary: &Dataset<SummaryRecord>,
        region: &Dataset<RegionRecord>,
        report: &InsightReport,
    ) -> Result<Vec<PathBuf>, ReportError> {
        let dir = &self.config.output_dir;
        fs::create_dir_all(dir).map_err(io_err(dir))?;

        let summary_csv = self.config.summary_csv_path();
        let region_csv = self.config.region_csv_path();
        let insights = self.config.insights_path();
        let bar = self.config.bar_chart_path();
        let pie = self.config.pie_chart_path();

        write_dataset(summary, &summary_csv)?;
        write_dataset(region, &region_csv)?;
        write_insights(report, &insights)?;
        write_bar_chart(summary, &bar)?;
        write_pie_chart(&report.top_parties, &pie)?;

        Ok(vec![summary_csv, region_csv, insights, bar, pie])
    }
}
