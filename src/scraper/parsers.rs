use crate::models::RawRow;
use crate::scraper::cleaner::normalise_cell;
use crate::scraper::ScrapeError;
use ::scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Minimum cells for a party-wise row: Party | Seats | Total Votes.
pub const REGION_ROW_WIDTH: usize = 3;

fn selector(s: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(s).map_err(|e| ScrapeError::Selector {
        selector: s.to_string(),
        message: format!("{:?}", e),
    })
}

// ── Row extractor ─────────────────────────────────────────────────────────────

/// Pulls data rows out of the first table matching a fixed selector.
pub struct TableExtractor {
    table: Selector,
    row: Selector,
    cell: Selector,
    table_selector: String,
}

impl TableExtractor {
    pub fn new(table_selector: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            table: selector(table_selector)?,
            row: selector("tr")?,
            cell: selector("td")?,
            table_selector: table_selector.to_string(),
        })
    }

    /// All rows after the header row, cell text trimmed. `None` when the
    /// page has no matching table.
    fn table_rows(&self, html: &str) -> Option<Vec<RawRow>> {
        let doc = Html::parse_document(html);
        let table = doc.select(&self.table).next()?;

        let rows = table
            .select(&self.row)
            .skip(1)
            .map(|tr| self.cells(tr))
            .collect();
        Some(rows)
    }

    fn cells(&self, tr: ElementRef<'_>) -> RawRow {
        tr.select(&self.cell)
            .map(|td| normalise_cell(&td.text().collect::<String>()))
            .collect()
    }

    /// Rows of the national summary table, as rendered.
    ///
    /// The caller has already waited for the table, so its absence here is
    /// an error rather than an empty page.
    pub fn summary_rows(&self, html: &str) -> Result<Vec<RawRow>, ScrapeError> {
        let rows = self
            .table_rows(html)
            .ok_or_else(|| ScrapeError::MissingTable(self.table_selector.clone()))?;
        debug!("Summary table: {} rows", rows.len());
        Ok(rows)
    }

    /// Rows of the party-wise table, truncated to three cells. Short rows
    /// are dropped; a page without the table yields nothing.
    pub fn region_rows(&self, html: &str) -> Vec<RawRow> {
        let Some(rows) = self.table_rows(html) else {
            warn!("No {} on party-wise page, treating as empty", self.table_selector);
            return vec![];
        };

        let total = rows.len();
        let kept: Vec<RawRow> = rows
            .into_iter()
            .filter(|cells| cells.len() >= REGION_ROW_WIDTH)
            .map(|mut cells| {
                cells.truncate(REGION_ROW_WIDTH);
                cells
            })
            .collect();

        if kept.len() < total {
            debug!("Dropped {} short rows from party-wise table", total - kept.len());
        }
        kept
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = r#"
        <html><body>
        <table class="other"><tr><td>ignore</td></tr></table>
        <table class="table">
          <thead><tr><th>Party</th><th>Won</th><th>Leading</th><th>Total</th></tr></thead>
          <tbody>
            <tr><td> Bharatiya Janata Party - BJP </td><td>240</td><td>0</td><td>240</td></tr>
            <tr><td>Indian National
                Congress - INC</td><td>99</td><td>0</td><td>99</td></tr>
          </tbody>
        </table>
        <table class="table"><tr><th>x</th></tr><tr><td>second</td></tr></table>
        </body></html>"#;

    #[test]
    fn summary_skips_header_and_trims() {
        let ex = TableExtractor::new("table.table").unwrap();
        let rows = ex.summary_rows(SUMMARY).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Bharatiya Janata Party - BJP", "240", "0", "240"]);
        assert_eq!(rows[1][0], "Indian National\n                Congress - INC");
    }

    #[test]
    fn summary_without_table_is_an_error() {
        let ex = TableExtractor::new("table.table").unwrap();
        let err = ex.summary_rows("<html><body><p>loading</p></body></html>").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingTable(_)));
    }

    #[test]
    fn region_drops_short_rows_and_truncates() {
        let html = r#"<table class="table">
            <tr><th>Party</th><th>Won</th><th>Votes</th></tr>
            <tr><td>Samajwadi Party - SP</td><td>37</td><td>29,600,000</td><td>extra</td></tr>
            <tr><td colspan="3">Total</td></tr>
            <tr><td>Bharatiya Janata Party - BJP</td><td>33</td><td>29,400,000</td></tr>
        </table>"#;
        let ex = TableExtractor::new("table.table").unwrap();
        let rows = ex.region_rows(html);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Samajwadi Party - SP", "37", "29,600,000"]);
        assert_eq!(rows[1][0], "Bharatiya Janata Party - BJP");
    }

    #[test]
    fn region_without_table_is_empty() {
        let ex = TableExtractor::new("table.table").unwrap();
        assert!(ex.region_rows("<p>no data yet</p>").is_empty());
    }

    #[test]
    fn bad_selector_is_reported() {
        assert!(matches!(
            TableExtractor::new("table[["),
            Err(ScrapeError::Selector { .. })
        ));
    }
}
