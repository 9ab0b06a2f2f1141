use crate::dataset::Dataset;
use crate::models::Record;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Per-step wall-clock timings for a run; logs the total when dropped.
pub struct StepClock {
    run: &'static str,
    started: Instant,
    lap: Instant,
    steps: Vec<(&'static str, Duration)>,
}

impl StepClock {
    pub fn start(run: &'static str) -> Self {
        info!("Starting {}", run);
        let now = Instant::now();
        Self {
            run,
            started: now,
            lap: now,
            steps: Vec::new(),
        }
    }

    /// Close the current step under `step` and start the next one.
    pub fn lap(&mut self, step: &'static str) -> Duration {
        let took = self.lap.elapsed();
        self.lap = Instant::now();
        debug!("{} took {:.2?}", step, took);
        self.steps.push((step, took));
        took
    }

    pub fn steps(&self) -> &[(&'static str, Duration)] {
        &self.steps
    }
}

impl Drop for StepClock {
    fn drop(&mut self) {
        let breakdown: Vec<String> = self
            .steps
            .iter()
            .map(|(step, took)| format!("{step} {took:.2?}"))
            .collect();
        info!(
            "Finished {} in {:.2?} [{}]",
            self.run,
            self.started.elapsed(),
            breakdown.join(", ")
        );
    }
}

/// Vote count with comma thousands separators, as the results site prints it.
pub fn fmt_votes(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Plain-text table with an index column, columns padded to width.
pub fn format_table<R: Record>(dataset: &Dataset<R>) -> String {
    let header: Vec<String> = std::iter::once(String::new())
        .chain(dataset.columns().iter().map(|c| c.to_string()))
        .collect();
    let body: Vec<Vec<String>> = dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(i, r)| std::iter::once(i.to_string()).chain(r.cells()).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = line(header.as_slice());
    for row in &body {
        out.push('\n');
        out.push_str(&line(row.as_slice()));
    }
    out
}
