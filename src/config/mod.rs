use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub insights: InsightConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Browser session and page lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    #[serde(default = "default_anchor_url")]
    pub anchor_url: String,

    #[serde(default = "default_region_url")]
    pub region_url: String,

    /// CSS selector awaited after every navigation.
    #[serde(default = "default_wait_selector")]
    pub wait_selector: String,

    /// CSS selector for the results table inside the rendered markup.
    #[serde(default = "default_table_selector")]
    pub table_selector: String,

    /// XPath matching the sub-page links on the anchor page.
    #[serde(default = "default_link_xpath")]
    pub link_xpath: String,

    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_true")]
    pub sandbox: bool,

    #[serde(default)]
    pub chrome_path: Option<PathBuf>,
}

/// Dataset builder configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// Fold rows sharing a party name into one. Off: rows are kept as scraped.
    #[serde(default)]
    pub merge_duplicates: bool,
}

/// Thresholds used by the insight battery
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InsightConfig {
    #[serde(default = "default_won_threshold")]
    pub won_threshold: i64,

    #[serde(default = "default_region_seats_threshold")]
    pub region_seats_threshold: u64,

    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Output artifact locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_summary_csv")]
    pub summary_csv: String,

    #[serde(default = "default_region_csv")]
    pub region_csv: String,

    #[serde(default = "default_insights_txt")]
    pub insights_txt: String,

    #[serde(default = "default_bar_chart")]
    pub bar_chart: String,

    #[serde(default = "default_pie_chart")]
    pub pie_chart: String,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_anchor_url() -> String {
    "https://results.eci.gov.in/PcResultGenJune2024/index.htm".to_string()
}
fn default_region_url() -> String {
    "https://results.eci.gov.in/PcResultGenJune2024/partywiseresult-S24.htm".to_string()
}
fn default_wait_selector() -> String {
    ".table".to_string()
}
fn default_table_selector() -> String {
    "table.table".to_string()
}
fn default_link_xpath() -> String {
    "//a[contains(@href, 'state')]".to_string()
}
fn default_wait_timeout_secs() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_won_threshold() -> i64 {
    10
}
fn default_region_seats_threshold() -> u64 {
    5
}
fn default_top_k() -> usize {
    3
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_summary_csv() -> String {
    "lok_sabha_elections_extended_main.csv".to_string()
}
fn default_region_csv() -> String {
    "lok_sabha_party_wise_results.csv".to_string()
}
fn default_insights_txt() -> String {
    "lok_sabha_elections_insights.txt".to_string()
}
fn default_bar_chart() -> String {
    "seats_won_by_party.png".to_string()
}
fn default_pie_chart() -> String {
    "proportion_seats_top_3.png".to_string()
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            anchor_url: default_anchor_url(),
            region_url: default_region_url(),
            wait_selector: default_wait_selector(),
            table_selector: default_table_selector(),
            link_xpath: default_link_xpath(),
            wait_timeout_secs: default_wait_timeout_secs(),
            headless: true,
            sandbox: true,
            chrome_path: None,
        }
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            won_threshold: default_won_threshold(),
            region_seats_threshold: default_region_seats_threshold(),
            top_k: default_top_k(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            summary_csv: default_summary_csv(),
            region_csv: default_region_csv(),
            insights_txt: default_insights_txt(),
            bar_chart: default_bar_chart(),
            pie_chart: default_pie_chart(),
        }
    }
}

impl BrowserConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

impl ReportConfig {
    pub fn summary_csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.summary_csv)
    }
    pub fn region_csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.region_csv)
    }
    pub fn insights_path(&self) -> PathBuf {
        self.output_dir.join(&self.insights_txt)
    }
    pub fn bar_chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.bar_chart)
    }
    pub fn pie_chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.pie_chart)
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("ELECTION").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg
            .try_deserialize()
            .context("Invalid configuration")?;
        app_cfg.validate()?;
        Ok(app_cfg)
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.browser.anchor_url)
            .with_context(|| format!("anchor_url {:?}", self.browser.anchor_url))?;
        url::Url::parse(&self.browser.region_url)
            .with_context(|| format!("region_url {:?}", self.browser.region_url))?;

        if self.browser.wait_timeout_secs == 0 {
            bail!("wait_timeout_secs must be greater than zero");
        }
        if self.insights.top_k == 0 {
            bail!("top_k must be greater than zero");
        }
        if ::scraper::Selector::parse(&self.browser.table_selector).is_err() {
            bail!("table_selector {:?} is not a valid CSS selector", self.browser.table_selector);
        }
        if ::scraper::Selector::parse(&self.browser.wait_selector).is_err() {
            bail!("wait_selector {:?} is not a valid CSS selector", self.browser.wait_selector);
        }
        Ok(())
    }
}
