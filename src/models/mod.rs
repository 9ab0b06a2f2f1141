use crate::scraper::cleaner::{parse_count, parse_signed_count};
use serde::Serialize;

// ── Raw rows ──────────────────────────────────────────────────────────────────

/// Trimmed cell texts of one table row, in column order.
pub type RawRow = Vec<String>;

// ── Record schema ─────────────────────────────────────────────────────────────

/// A typed row bound positionally from a [`RawRow`].
///
/// Column 0 is always the party name; every other column is numeric and
/// `None` when the source cell did not parse.
pub trait Record: Serialize + Clone {
    /// Header names, exactly as exported.
    const COLUMNS: &'static [&'static str];

    /// Bind cells to fields. `None` when the width differs from `COLUMNS`.
    fn from_cells(cells: &[String]) -> Option<Self>;

    fn party(&self) -> &str;

    /// Display form of every column; missing values render as `NaN`.
    fn cells(&self) -> Vec<String>;

    /// Fold another row for the same party into this one.
    fn absorb(&mut self, other: &Self);
}

fn show<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "NaN".to_string())
}

/// Sum of two optional counts; missing only when both are.
fn add_opt<T: std::ops::Add<Output = T>>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (a, None) => a,
        (None, b) => b,
    }
}

// ── National summary ──────────────────────────────────────────────────────────

/// Party | Won | Leading | Total
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryRecord {
    #[serde(rename = "Party")]
    pub party: String,
    #[serde(rename = "Won")]
    pub won: Option<i64>,
    #[serde(rename = "Leading")]
    pub leading: Option<i64>,
    #[serde(rename = "Total")]
    pub total: Option<i64>,
}

impl Record for SummaryRecord {
    const COLUMNS: &'static [&'static str] = &["Party", "Won", "Leading", "Total"];

    fn from_cells(cells: &[String]) -> Option<Self> {
        let [party, won, leading, total] = cells else {
            return None;
        };
        Some(Self {
            party: party.trim().to_string(),
            won: parse_signed_count(won),
            leading: parse_signed_count(leading),
            total: parse_signed_count(total),
        })
    }

    fn party(&self) -> &str {
        &self.party
    }

    fn cells(&self) -> Vec<String> {
        vec![self.party.clone(), show(self.won), show(self.leading), show(self.total)]
    }

    fn absorb(&mut self, other: &Self) {
        self.won = add_opt(self.won, other.won);
        self.leading = add_opt(self.leading, other.leading);
        self.total = add_opt(self.total, other.total);
    }
}

// ── Region party-wise ─────────────────────────────────────────────────────────

/// Party | Seats | Total Votes
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegionRecord {
    #[serde(rename = "Party")]
    pub party: String,
    #[serde(rename = "Seats")]
    pub seats: Option<u64>,
    #[serde(rename = "Total Votes")]
    pub total_votes: Option<u64>,
}

impl Record for RegionRecord {
    const COLUMNS: &'static [&'static str] = &["Party", "Seats", "Total Votes"];

    fn from_cells(cells: &[String]) -> Option<Self> {
        let [party, seats, total_votes] = cells else {
            return None;
        };
        Some(Self {
            party: party.trim().to_string(),
            seats: parse_count(seats),
            total_votes: parse_count(total_votes),
        })
    }

    fn party(&self) -> &str {
        &self.party
    }

    fn cells(&self) -> Vec<String> {
        vec![self.party.clone(), show(self.seats), show(self.total_votes)]
    }

    fn absorb(&mut self, other: &Self) {
        self.seats = add_opt(self.seats, other.seats);
        self.total_votes = add_opt(self.total_votes, other.total_votes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn summary_binds_positionally() {
        let r = SummaryRecord::from_cells(&cells(&["BJP", "240", "0", "240"])).unwrap();
        assert_eq!(r.party, "BJP");
        assert_eq!(r.won, Some(240));
        assert_eq!(r.total, Some(240));
    }

    #[test]
    fn width_mismatch_is_rejected() {
        assert!(SummaryRecord::from_cells(&cells(&["BJP", "240", "0"])).is_none());
        assert!(RegionRecord::from_cells(&cells(&["SP", "37"])).is_none());
    }

    #[test]
    fn non_numeric_cell_becomes_missing() {
        let r = RegionRecord::from_cells(&cells(&["SP", "N/A", "33,587,202"])).unwrap();
        assert_eq!(r.seats, None);
        assert_eq!(r.total_votes, Some(33_587_202));
    }

    #[test]
    fn absorb_sums_defined_values() {
        let mut a = SummaryRecord::from_cells(&cells(&["X", "3", "N/A", "3"])).unwrap();
        let b = SummaryRecord::from_cells(&cells(&["X", "2", "1", "N/A"])).unwrap();
        a.absorb(&b);
        assert_eq!(a.won, Some(5));
        assert_eq!(a.leading, Some(1));
        assert_eq!(a.total, Some(3));
    }
}
