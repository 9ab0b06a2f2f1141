//! Insight engine: a fixed battery of statistics over finalized datasets.
//!
//! Every insight is computed independently from an immutable snapshot. An
//! insight needing an extremum is omitted when no row has a defined value;
//! count-style insights are always emitted. Missing cells never count as
//! zero.

use crate::config::InsightConfig;
use crate::dataset::Dataset;
use crate::models::{RegionRecord, SummaryRecord};
use crate::utils::fmt_votes;
use tracing::{debug, info};

// ── Types ─────────────────────────────────────────────────────────────────────

/// Declared position in the battery, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    MostSeats,
    HighestTotal,
    AboveThreshold,
    TopSeats,
    MeanSeats,
    NoSeats,
    PartyCount,
    FewestSeats,
    LargestShare,
    LeadingOverWon,
    RegionMostSeats,
    RegionAboveThreshold,
    RegionMostVotes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub kind: InsightKind,
    pub text: String,
}

/// One slice of the top-K pie.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyShare {
    pub party: String,
    pub won: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightReport {
    pub insights: Vec<Insight>,
    /// Sum of every defined `Won` cell.
    pub total_seats: i64,
    /// Top-K parties by `Won`, as used by the top-K insight.
    pub top_parties: Vec<PartyShare>,
}

impl InsightReport {
    /// "Insight 1: …", numbered over the insights actually emitted.
    pub fn lines(&self) -> Vec<String> {
        self.insights
            .iter()
            .enumerate()
            .map(|(i, insight)| format!("Insight {}: {}", i + 1, insight.text))
            .collect()
    }

    pub fn kinds(&self) -> Vec<InsightKind> {
        self.insights.iter().map(|i| i.kind).collect()
    }

    pub fn get(&self, kind: InsightKind) -> Option<&str> {
        self.insights
            .iter()
            .find(|i| i.kind == kind)
            .map(|i| i.text.as_str())
    }
}

// ── Reductions ────────────────────────────────────────────────────────────────

/// First row holding the largest defined value.
pub fn first_max<R, T: Ord + Copy>(rows: &[R], key: impl Fn(&R) -> Option<T>) -> Option<(&R, T)> {
    let mut best: Option<(&R, T)> = None;
    for row in rows {
        if let Some(v) = key(row) {
            if best.is_none_or(|(_, b)| v > b) {
                best = Some((row, v));
            }
        }
    }
    best
}

/// First row holding the smallest defined value.
pub fn first_min<R, T: Ord + Copy>(rows: &[R], key: impl Fn(&R) -> Option<T>) -> Option<(&R, T)> {
    let mut best: Option<(&R, T)> = None;
    for row in rows {
        if let Some(v) = key(row) {
            if best.is_none_or(|(_, b)| v < b) {
                best = Some((row, v));
            }
        }
    }
    best
}

/// Up to `k` rows with the largest defined values; ties keep row order.
pub fn top_k<R, T: Ord + Copy>(rows: &[R], key: impl Fn(&R) -> Option<T>, k: usize) -> Vec<(&R, T)> {
    let mut ranked: Vec<(&R, T)> = rows
        .iter()
        .filter_map(|row| key(row).map(|v| (row, v)))
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(k);
    ranked
}

fn count_where<R>(rows: &[R], pred: impl Fn(&R) -> bool) -> usize {
    rows.iter().filter(|r| pred(r)).count()
}

// ── Engine ────────────────────────────────────────────────────────────────────

pub struct InsightEngine {
    won_threshold: i64,
    region_seats_threshold: u64,
    top_k: usize,
}

impl InsightEngine {
    pub fn new(config: &InsightConfig) -> Self {
        Self {
            won_threshold: config.won_threshold,
            region_seats_threshold: config.region_seats_threshold,
            top_k: config.top_k,
        }
    }

    pub fn run(
        &self,
        summary: &Dataset<SummaryRecord>,
        region: Option<&Dataset<RegionRecord>>,
    ) -> InsightReport {
        let rows = summary.rows();
        let mut out = Vec::new();
        let mut push = |kind: InsightKind, text: String| {
            debug!("{:?}: {}", kind, text);
            out.push(Insight { kind, text });
        };

        let total_seats: i64 = rows.iter().filter_map(|r| r.won).sum();
        info!("The total number of seats in the parliamentary elections is {}.", total_seats);

        let most_seats = first_max(rows, |r| r.won);
        if let Some((party, won)) = most_seats {
            push(
                InsightKind::MostSeats,
                format!("The party with most seats is {} with {} seats.", party.party, won),
            );
        }

        if let Some((party, total)) = first_max(rows, |r| r.total) {
            push(
                InsightKind::HighestTotal,
                format!(
                    "The party with the highest total (won + leading) is {} with {} seats.",
                    party.party, total
                ),
            );
        }

        let above = count_where(rows, |r| r.won.is_some_and(|w| w > self.won_threshold));
        push(
            InsightKind::AboveThreshold,
            format!("There are {} parties with more than {} seats.", above, self.won_threshold),
        );

        let top = top_k(rows, |r| r.won, self.top_k);
        let top_parties: Vec<PartyShare> = top
            .iter()
            .map(|(r, won)| PartyShare {
                party: r.party.clone(),
                won: *won,
            })
            .collect();
        if !top_parties.is_empty() {
            let top_sum: i64 = top_parties.iter().map(|p| p.won).sum();
            push(
                InsightKind::TopSeats,
                format!("The total seats won by the top {} parties are {}.", self.top_k, top_sum),
            );
        }

        let defined: Vec<i64> = rows.iter().filter_map(|r| r.won).collect();
        let mean = if defined.is_empty() {
            0.0
        } else {
            defined.iter().sum::<i64>() as f64 / defined.len() as f64
        };
        push(
            InsightKind::MeanSeats,
            format!("The average seats won by all parties are {:.2}.", mean),
        );

        let no_seats = count_where(rows, |r| r.won == Some(0));
        push(
            InsightKind::NoSeats,
            format!("There are {} parties with no seats won.", no_seats),
        );

        push(
            InsightKind::PartyCount,
            format!("The total number of parties contesting the election is {}.", rows.len()),
        );

        if let Some((party, won)) = first_min(rows, |r| r.won.filter(|w| *w > 0)) {
            push(
                InsightKind::FewestSeats,
                format!(
                    "The party with the smallest number of seats won is {} with {} seats.",
                    party.party, won
                ),
            );
        }

        if let Some((_, won)) = most_seats {
            if total_seats > 0 {
                let share = won as f64 / total_seats as f64 * 100.0;
                push(
                    InsightKind::LargestShare,
                    format!("The proportion of seats won by the largest party is {:.2}%.", share),
                );
            }
        }

        let leading_over_won =
            count_where(rows, |r| matches!((r.leading, r.won), (Some(l), Some(w)) if l > w));
        push(
            InsightKind::LeadingOverWon,
            format!("There are {} parties with more seats leading than won.", leading_over_won),
        );

        if let Some(region) = region {
            let rows = region.rows();

            if let Some((party, seats)) = first_max(rows, |r| r.seats) {
                push(
                    InsightKind::RegionMostSeats,
                    format!(
                        "The party with most seats in party-wise results is {} with {} seats.",
                        party.party, seats
                    ),
                );
            }

            let above = count_where(rows, |r| r.seats.is_some_and(|s| s > self.region_seats_threshold));
            push(
                InsightKind::RegionAboveThreshold,
                format!(
                    "There are {} parties with more than {} seats in party-wise results.",
                    above, self.region_seats_threshold
                ),
            );

            if let Some((party, votes)) = first_max(rows, |r| r.total_votes) {
                push(
                    InsightKind::RegionMostVotes,
                    format!(
                        "The party with the highest votes in party-wise results is {} with {} votes.",
                        party.party,
                        fmt_votes(votes)
                    ),
                );
            }
        }

        info!("{} insights computed", out.len());
        InsightReport {
            insights: out,
            total_seats,
            top_parties,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DuplicatePolicy;
    use InsightKind::*;

    fn summary(rows: &[[&str; 4]]) -> Dataset<SummaryRecord> {
        Dataset::build(
            rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect(),
            DuplicatePolicy::Preserve,
        )
        .unwrap()
    }

    fn region(rows: &[[&str; 3]]) -> Dataset<RegionRecord> {
        Dataset::build(
            rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect(),
            DuplicatePolicy::Preserve,
        )
        .unwrap()
    }

    fn engine() -> InsightEngine {
        InsightEngine::new(&InsightConfig::default())
    }

    #[test]
    fn three_party_scenario() {
        let ds = summary(&[["X", "10", "2", "12"], ["Y", "5", "0", "5"], ["Z", "0", "1", "1"]]);
        let report = engine().run(&ds, None);

        assert_eq!(report.total_seats, 15);
        assert_eq!(report.get(MostSeats), Some("The party with most seats is X with 10 seats."));
        assert_eq!(report.get(AboveThreshold), Some("There are 0 parties with more than 10 seats."));
        assert_eq!(report.get(TopSeats), Some("The total seats won by the top 3 parties are 15."));
        assert_eq!(report.get(MeanSeats), Some("The average seats won by all parties are 5.00."));
        assert_eq!(report.get(NoSeats), Some("There are 1 parties with no seats won."));
        assert_eq!(
            report.get(PartyCount),
            Some("The total number of parties contesting the election is 3.")
        );
        assert_eq!(
            report.get(FewestSeats),
            Some("The party with the smallest number of seats won is Y with 5 seats.")
        );
        assert_eq!(
            report.get(LargestShare),
            Some("The proportion of seats won by the largest party is 66.67%.")
        );
        assert_eq!(
            report.get(LeadingOverWon),
            Some("There are 1 parties with more seats leading than won.")
        );
        assert_eq!(report.insights.len(), 10);
        assert_eq!(
            report.top_parties,
            vec![
                PartyShare { party: "X".into(), won: 10 },
                PartyShare { party: "Y".into(), won: 5 },
                PartyShare { party: "Z".into(), won: 0 },
            ]
        );
    }

    #[test]
    fn empty_dataset_emits_only_guarded_insights() {
        let ds = summary(&[]);
        let report = engine().run(&ds, None);

        assert_eq!(report.total_seats, 0);
        assert_eq!(
            report.kinds(),
            vec![AboveThreshold, MeanSeats, NoSeats, PartyCount, LeadingOverWon]
        );
        assert_eq!(report.get(MeanSeats), Some("The average seats won by all parties are 0.00."));
        assert!(report.top_parties.is_empty());
        assert_eq!(report.lines()[0], "Insight 1: There are 0 parties with more than 10 seats.");
    }

    #[test]
    fn missing_won_is_not_zero() {
        let ds = summary(&[["A", "N/A", "5", "5"], ["B", "3", "0", "3"], ["C", "0", "0", "0"]]);
        let report = engine().run(&ds, None);

        assert_eq!(report.get(MostSeats), Some("The party with most seats is B with 3 seats."));
        assert_eq!(report.get(NoSeats), Some("There are 1 parties with no seats won."));
        assert_eq!(
            report.get(PartyCount),
            Some("The total number of parties contesting the election is 3.")
        );
        // A leads 5 but has no defined Won, so it is not compared.
        assert_eq!(
            report.get(LeadingOverWon),
            Some("There are 0 parties with more seats leading than won.")
        );
        assert_eq!(report.top_parties.len(), 2);
    }

    #[test]
    fn ties_resolve_to_first_row() {
        let ds = summary(&[["P", "7", "0", "7"], ["Q", "7", "0", "9"], ["R", "7", "0", "9"]]);
        let report = engine().run(&ds, None);
        assert_eq!(report.get(MostSeats), Some("The party with most seats is P with 7 seats."));
        assert_eq!(
            report.get(HighestTotal),
            Some("The party with the highest total (won + leading) is Q with 9 seats.")
        );
        assert_eq!(
            report.get(FewestSeats),
            Some("The party with the smallest number of seats won is P with 7 seats.")
        );
    }

    #[test]
    fn max_is_at_least_every_defined_value() {
        let rows: Vec<SummaryRecord> = (0..50)
            .map(|i| SummaryRecord {
                party: format!("P{i}"),
                won: if i % 7 == 0 { None } else { Some((i * 37) % 23) },
                leading: None,
                total: None,
            })
            .collect();
        let (best, v) = first_max(&rows, |r| r.won).unwrap();
        assert!(rows.iter().filter_map(|r| r.won).all(|w| w <= v));
        let first = rows.iter().position(|r| r.won == Some(v)).unwrap();
        assert_eq!(best.party, rows[first].party);
    }

    #[test]
    fn top_k_is_bounded_by_rows_and_total() {
        let ds = summary(&[["X", "4", "0", "4"], ["Y", "6", "0", "6"]]);
        let report = engine().run(&ds, None);
        assert_eq!(report.top_parties.len(), 2);
        assert_eq!(report.top_parties[0].party, "Y");
        let top_sum: i64 = report.top_parties.iter().map(|p| p.won).sum();
        assert!(top_sum <= report.total_seats);
    }

    #[test]
    fn zero_total_omits_share() {
        let ds = summary(&[["X", "0", "3", "3"]]);
        let report = engine().run(&ds, None);
        assert!(report.get(LargestShare).is_none());
        assert!(report.get(FewestSeats).is_none());
        assert!(report.get(MostSeats).is_some());
    }

    #[test]
    fn region_battery() {
        let ds = summary(&[["X", "1", "0", "1"]]);
        let up = region(&[
            ["SP", "37", "29,600,000"],
            ["BJP", "33", "29,800,000"],
            ["INC", "6", "N/A"],
            ["BSP", "0", "9,000,000"],
        ]);
        let report = engine().run(&ds, Some(&up));
        assert_eq!(
            report.get(RegionMostSeats),
            Some("The party with most seats in party-wise results is SP with 37 seats.")
        );
        assert_eq!(
            report.get(RegionAboveThreshold),
            Some("There are 3 parties with more than 5 seats in party-wise results.")
        );
        assert_eq!(
            report.get(RegionMostVotes),
            Some("The party with the highest votes in party-wise results is BJP with 29,800,000 votes.")
        );
    }

    #[test]
    fn empty_region_keeps_count_insight_only() {
        let ds = summary(&[["X", "1", "0", "1"]]);
        let report = engine().run(&ds, Some(&region(&[])));
        assert!(report.get(RegionMostSeats).is_none());
        assert!(report.get(RegionMostVotes).is_none());
        assert_eq!(
            report.get(RegionAboveThreshold),
            Some("There are 0 parties with more than 5 seats in party-wise results.")
        );
    }
}
