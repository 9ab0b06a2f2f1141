//! Headless Chrome session behind the [`Browser`] seam.
//!
//! `headless_chrome` is a blocking API; callers run traversals on a blocking
//! thread. Dropping a [`ChromeSession`] closes its tab and kills the Chrome
//! process.
//!
//! Only `navigate_to` waits for its navigation. After a click or a history
//! move the tab's navigating flag is raised asynchronously, so
//! `wait_until_navigated` cannot be trusted there; the navigator watches
//! [`Browser::current_url`] instead.

use super::{Browser, LinkHandle, ScrapeError, SessionFactory};
use crate::config::BrowserConfig;
use headless_chrome::{Browser as Chrome, LaunchOptions, Tab};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

fn session_err<E: Display>(action: &'static str) -> impl FnOnce(E) -> ScrapeError {
    move |e| ScrapeError::Session {
        action,
        message: e.to_string(),
    }
}

// ── Launcher ──────────────────────────────────────────────────────────────────

pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl SessionFactory for ChromeLauncher {
    type Session = ChromeSession;

    fn open(&self) -> Result<ChromeSession, ScrapeError> {
        // Chrome's own idle watchdog must outlive the longest wait.
        let idle = Duration::from_secs(self.config.wait_timeout_secs.max(30) * 2);

        let options = LaunchOptions::default_builder()
            .headless(self.config.headless)
            .sandbox(self.config.sandbox)
            .path(self.config.chrome_path.clone())
            .idle_browser_timeout(idle)
            .build()
            .map_err(session_err("launch options"))?;

        let browser = Chrome::new(options).map_err(session_err("launch"))?;
        let tab = browser.new_tab().map_err(session_err("new tab"))?;
        debug!("Chrome session opened");

        Ok(ChromeSession {
            tab,
            _browser: browser,
        })
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

pub struct ChromeSession {
    tab: Arc<Tab>,
    // Declared last so the tab closes before the process goes away.
    _browser: Chrome,
}

impl Browser for ChromeSession {
    fn navigate_to(&mut self, url: &str) -> Result<(), ScrapeError> {
        debug!("GET {}", url);
        self.tab.navigate_to(url).map_err(session_err("navigate"))?;
        self.tab
            .wait_until_navigated()
            .map_err(session_err("page load"))?;
        Ok(())
    }

    fn navigate_back(&mut self) -> Result<(), ScrapeError> {
        self.tab
            .evaluate("window.history.back()", false)
            .map_err(session_err("history back"))?;
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, ScrapeError> {
        Ok(self.tab.get_url())
    }

    fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<(), ScrapeError> {
        match self.tab.wait_for_element_with_custom_timeout(selector, timeout) {
            Ok(_) => Ok(()),
            Err(e) => {
                debug!("Wait for {:?} failed: {}", selector, e);
                Err(ScrapeError::NavigationTimeout {
                    awaiting: selector.to_string(),
                    page: self.tab.get_url(),
                    timeout,
                })
            }
        }
    }

    fn content(&mut self) -> Result<String, ScrapeError> {
        self.tab.get_content().map_err(session_err("read content"))
    }

    fn find_links(&mut self, xpath: &str) -> Result<Vec<LinkHandle>, ScrapeError> {
        // No match is an empty list; an error is a broken session.
        let count = self
            .tab
            .find_elements_by_xpath(xpath)
            .map_err(session_err("find links"))?
            .len();
        debug!("{} elements for {:?}", count, xpath);
        Ok((0..count)
            .map(|index| LinkHandle {
                xpath: xpath.to_string(),
                index,
            })
            .collect())
    }

    fn activate(&mut self, link: &LinkHandle) -> Result<(), ScrapeError> {
        let missing = || ScrapeError::LinkMissing {
            xpath: link.xpath.clone(),
            index: link.index,
        };

        let elements = self
            .tab
            .find_elements_by_xpath(&link.xpath)
            .map_err(session_err("find links"))?;
        let element = elements.get(link.index).ok_or_else(missing)?;

        element.click().map_err(session_err("click"))?;
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(true) {
            debug!("Closing tab failed: {}", e);
        }
        debug!("Chrome session closed");
    }
}
