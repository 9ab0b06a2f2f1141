pub mod chrome;
pub mod cleaner;
pub mod parsers;
#[cfg(test)]
pub mod testing;

use crate::config::BrowserConfig;
use crate::models::RawRow;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use self::parsers::TableExtractor;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("timed out after {timeout:?} waiting for {awaiting} on {page}")]
    NavigationTimeout {
        awaiting: String,
        page: String,
        timeout: Duration,
    },

    #[error("browser session failed during {action}: {message}")]
    Session {
        action: &'static str,
        message: String,
    },

    #[error("link #{index} matching {xpath:?} is gone from the anchor page")]
    LinkMissing { xpath: String, index: usize },

    #[error("no table matching {0:?} in the rendered page")]
    MissingTable(String),

    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
}

// ── Browser seam ──────────────────────────────────────────────────────────────

/// A link on the anchor page, addressed by its position among the elements
/// matching `xpath`. Resolved again on every activation, so it survives
/// leaving and re-rendering the anchor page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHandle {
    pub xpath: String,
    pub index: usize,
}

/// One automation session driving one page at a time.
pub trait Browser {
    /// Load `url`; returns once the new document has committed.
    fn navigate_to(&mut self, url: &str) -> Result<(), ScrapeError>;
    /// Like `activate`, may return before the previous document is back.
    fn navigate_back(&mut self) -> Result<(), ScrapeError>;
    /// Location of the document currently committed in the page.
    fn current_url(&mut self) -> Result<String, ScrapeError>;
    /// Block until `selector` matches, or fail with `NavigationTimeout`.
    fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<(), ScrapeError>;
    /// Current rendered markup.
    fn content(&mut self) -> Result<String, ScrapeError>;
    fn find_links(&mut self, xpath: &str) -> Result<Vec<LinkHandle>, ScrapeError>;
    /// Simulated click. Returns once the click is dispatched; the resulting
    /// navigation may still be in flight.
    fn activate(&mut self, link: &LinkHandle) -> Result<(), ScrapeError>;
}

/// Opens a fresh session per traversal.
pub trait SessionFactory {
    type Session: Browser;
    fn open(&self) -> Result<Self::Session, ScrapeError>;
}

// ── Navigator ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    AtAnchor,
    AtChild(usize),
    Done,
}

const URL_POLL: Duration = Duration::from_millis(50);

/// Owns a session for exactly one traversal; the session is dropped (and
/// closed) when the traversal returns, on success or failure.
pub struct Navigator<B: Browser> {
    session: B,
    extractor: TableExtractor,
    wait_selector: String,
    timeout: Duration,
    state: NavState,
    /// Location of the anchor page as committed, after any redirect.
    anchor: String,
}

impl<B: Browser> Navigator<B> {
    pub fn new(session: B, config: &BrowserConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            session,
            extractor: TableExtractor::new(&config.table_selector)?,
            wait_selector: config.wait_selector.clone(),
            timeout: config.wait_timeout(),
            state: NavState::AtAnchor,
            anchor: String::new(),
        })
    }

    fn wait_for_table(&mut self) -> Result<(), ScrapeError> {
        self.session.wait_for_element(&self.wait_selector, self.timeout)
    }

    /// Poll the committed location until `arrived` holds. Both pages carry
    /// the awaited table, so the element wait alone cannot tell them apart.
    fn wait_for_location(
        &mut self,
        awaiting: &str,
        arrived: impl Fn(&str) -> bool,
    ) -> Result<(), ScrapeError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let url = self.session.current_url()?;
            if arrived(&url) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ScrapeError::NavigationTimeout {
                    awaiting: awaiting.to_string(),
                    page: url,
                    timeout: self.timeout,
                });
            }
            std::thread::sleep(URL_POLL);
        }
    }

    fn load(&mut self, url: &str) -> Result<(), ScrapeError> {
        self.session.navigate_to(url)?;
        self.wait_for_table()?;
        self.anchor = self.session.current_url()?;
        self.state = NavState::AtAnchor;
        Ok(())
    }

    fn visit_child(&mut self, index: usize, link: &LinkHandle) -> Result<Vec<RawRow>, ScrapeError> {
        self.session.activate(link)?;
        let anchor = self.anchor.clone();
        self.wait_for_location("navigation away from the anchor page", |url| url != anchor)?;
        self.state = NavState::AtChild(index);

        self.wait_for_table()?;
        let html = self.session.content()?;
        self.extractor.summary_rows(&html)
    }

    /// Back to the anchor, unless the visit never left it.
    fn return_to_anchor(&mut self) -> Result<(), ScrapeError> {
        if let NavState::AtChild(_) = self.state {
            self.session.navigate_back()?;
            let anchor = self.anchor.clone();
            self.wait_for_location("navigation back to the anchor page", |url| url == anchor)?;
        }
        self.wait_for_table()?;
        self.state = NavState::AtAnchor;
        Ok(())
    }

    /// Anchor page rows, then the rows of every sub-page linked from it,
    /// in link order.
    pub fn traverse_summary(
        mut self,
        anchor_url: &str,
        link_xpath: &str,
    ) -> Result<Vec<RawRow>, ScrapeError> {
        info!("Loading anchor page {}", anchor_url);
        self.load(anchor_url)?;

        let html = self.session.content()?;
        let mut rows = self.extractor.summary_rows(&html)?;

        // Captured once; handles are re-resolved by index on each visit.
        let links = self.session.find_links(link_xpath)?;
        info!("Anchor page: {} rows, {} sub-page links", rows.len(), links.len());

        for (i, link) in links.iter().enumerate() {
            debug!("Visiting sub-page {}/{}", i + 1, links.len());

            let visited = self.visit_child(i, link);
            let back = self.return_to_anchor();
            let child_rows = visited?;
            back?;

            debug!("Sub-page {}: {} rows", i + 1, child_rows.len());
            rows.extend(child_rows);
        }

        self.state = NavState::Done;
        info!("Summary traversal done: {} rows", rows.len());
        Ok(rows)
    }

    /// Rows of a single party-wise page; no sub-pages.
    pub fn traverse_region(mut self, url: &str) -> Result<Vec<RawRow>, ScrapeError> {
        info!("Loading party-wise page {}", url);
        self.load(url)?;

        let html = self.session.content()?;
        let rows = self.extractor.region_rows(&html);

        self.state = NavState::Done;
        info!("Party-wise traversal done: {} rows", rows.len());
        Ok(rows)
    }
}

/// Both traversals, one session each, strictly one after the other.
pub fn scrape_all<F: SessionFactory>(
    factory: &F,
    config: &BrowserConfig,
) -> Result<(Vec<RawRow>, Vec<RawRow>), ScrapeError> {
    let summary = Navigator::new(factory.open()?, config)?
        .traverse_summary(&config.anchor_url, &config.link_xpath)?;
    let region = Navigator::new(factory.open()?, config)?.traverse_region(&config.region_url)?;
    Ok((summary, region))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
