//! Scripted in-memory site standing in for a real browser in tests.

use super::{Browser, LinkHandle, ScrapeError, SessionFactory};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct FakePage {
    html: String,
    links: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pages: Arc<Mutex<HashMap<String, FakePage>>>,
    unrendered: Arc<Mutex<HashSet<String>>>,
    lag: Arc<Mutex<usize>>,
    broken_lookup: Arc<Mutex<bool>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&self, url: &str, html: &str, links: &[String]) {
        self.pages.lock().unwrap().insert(
            url.to_string(),
            FakePage {
                html: html.to_string(),
                links: links.to_vec(),
            },
        );
    }

    /// The awaited element never shows up on `url`.
    pub fn never_render(&self, url: &str) {
        self.unrendered.lock().unwrap().insert(url.to_string());
    }

    /// Clicks and history moves commit only after `polls` location reads;
    /// until then the previous document stays in place.
    pub fn lag_navigation(&self, polls: usize) {
        *self.lag.lock().unwrap() = polls;
    }

    /// Link lookup fails the way a dropped devtools connection does.
    pub fn break_link_lookup(&self) {
        *self.broken_lookup.lock().unwrap() = true;
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn page(&self, url: &str) -> Option<FakePage> {
        self.pages.lock().unwrap().get(url).cloned()
    }
}

impl SessionFactory for FakeSite {
    type Session = FakeBrowser;

    fn open(&self) -> Result<FakeBrowser, ScrapeError> {
        self.record("open".into());
        Ok(FakeBrowser {
            site: self.clone(),
            history: Vec::new(),
            pending: None,
        })
    }
}

pub struct FakeBrowser {
    site: FakeSite,
    history: Vec<String>,
    /// History once the in-flight navigation commits, and the location
    /// reads left before it does.
    pending: Option<(Vec<String>, usize)>,
}

impl FakeBrowser {
    fn current(&self) -> String {
        self.history.last().cloned().unwrap_or_else(|| "about:blank".into())
    }

    fn begin(&mut self, history: Vec<String>) {
        let lag = *self.site.lag.lock().unwrap();
        if lag == 0 {
            self.history = history;
        } else {
            self.pending = Some((history, lag));
        }
    }

    fn settle(&mut self) {
        if let Some((history, left)) = self.pending.take() {
            if left == 0 {
                self.history = history;
            } else {
                self.pending = Some((history, left - 1));
            }
        }
    }
}

impl Browser for FakeBrowser {
    fn navigate_to(&mut self, url: &str) -> Result<(), ScrapeError> {
        self.site.record(format!("goto {url}"));
        self.pending = None;
        self.history.push(url.to_string());
        Ok(())
    }

    fn navigate_back(&mut self) -> Result<(), ScrapeError> {
        self.site.record("back".into());
        let mut history = self.history.clone();
        if history.len() > 1 {
            history.pop();
        }
        self.begin(history);
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, ScrapeError> {
        self.settle();
        Ok(self.current())
    }

    fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let page = self.current();
        let rendered = self.site.page(&page).is_some()
            && !self.site.unrendered.lock().unwrap().contains(&page);
        if rendered {
            Ok(())
        } else {
            Err(ScrapeError::NavigationTimeout {
                awaiting: selector.to_string(),
                page,
                timeout,
            })
        }
    }

    fn content(&mut self) -> Result<String, ScrapeError> {
        Ok(self.site.page(&self.current()).map(|p| p.html).unwrap_or_default())
    }

    fn find_links(&mut self, xpath: &str) -> Result<Vec<LinkHandle>, ScrapeError> {
        if *self.site.broken_lookup.lock().unwrap() {
            return Err(ScrapeError::Session {
                action: "find links",
                message: "connection closed".into(),
            });
        }
        let count = self.site.page(&self.current()).map(|p| p.links.len()).unwrap_or(0);
        Ok((0..count)
            .map(|index| LinkHandle {
                xpath: xpath.to_string(),
                index,
            })
            .collect())
    }

    fn activate(&mut self, link: &LinkHandle) -> Result<(), ScrapeError> {
        let target = self
            .site
            .page(&self.current())
            .and_then(|p| p.links.get(link.index).cloned())
            .ok_or_else(|| ScrapeError::LinkMissing {
                xpath: link.xpath.clone(),
                index: link.index,
            })?;
        self.site.record(format!("click {}", link.index));
        self.site.record(format!("goto {target}"));
        let mut history = self.history.clone();
        history.push(target);
        self.begin(history);
        Ok(())
    }
}

impl Drop for FakeBrowser {
    fn drop(&mut self) {
        self.site.record("close".into());
    }
}

/// Markup of a rendered summary table with a header row.
pub fn summary_page(rows: &[(&str, &str, &str, &str)]) -> String {
    let mut html = String::from(
        r#"<html><body><table class="table"><tr><th>Party</th><th>Won</th><th>Leading</th><th>Total</th></tr>"#,
    );
    for (party, won, leading, total) in rows {
        html.push_str(&format!(
            "<tr><td>{party}</td><td>{won}</td><td>{leading}</td><td>{total}</td></tr>"
        ));
    }
    html.push_str("</table></body></html>");
    html
}
