use crate::error::{Result, ScrapeError};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// CSS selectors (and one XPath) describing the listing DOM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selectors {
    /// Container of the cards; present even when a page has no events
    #[serde(default = "default_listing_selector")]
    pub listing: String,

    /// One element per event card
    #[serde(default = "default_card_selector")]
    pub card: String,

    /// Title inside a card
    #[serde(default = "default_title_selector")]
    pub title: String,

    /// Venue inside a card
    #[serde(default = "default_location_selector")]
    pub location: String,

    /// Combined date and time text inside a card
    #[serde(default = "default_date_time_selector")]
    pub date_time: String,

    /// Numbered pagination links
    #[serde(default = "default_pagination_selector")]
    pub pagination_link: String,

    /// Label of the "next page" pagination link
    #[serde(default = "default_next_label")]
    pub next_label: String,

    /// XPath of the cookie-consent accept button
    #[serde(default = "default_consent_xpath")]
    pub consent_button: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            listing: default_listing_selector(),
            card: default_card_selector(),
            title: default_title_selector(),
            location: default_location_selector(),
            date_time: default_date_time_selector(),
            pagination_link: default_pagination_selector(),
            next_label: default_next_label(),
            consent_button: default_consent_xpath(),
        }
    }
}

impl Selectors {
    /// Check every CSS selector parses
    pub fn validate(&self) -> Result<()> {
        for (name, css) in [
            ("listing", &self.listing),
            ("card", &self.card),
            ("title", &self.title),
            ("location", &self.location),
            ("date_time", &self.date_time),
            ("pagination_link", &self.pagination_link),
        ] {
            Selector::parse(css)
                .map_err(|e| ScrapeError::Config(format!("bad {} selector {:?}: {}", name, css, e)))?;
        }
        if self.consent_button.trim().is_empty() {
            return Err(ScrapeError::Config("consent_button XPath is empty".into()));
        }
        Ok(())
    }
}

/// Configuration for a scrape session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// First listing page
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// Query parameter carrying the page number for direct navigation
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Number of listing pages to scrape
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// CSV destination
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Retries allowed on a single page before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries_per_page: u32,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Lower bound of the delay between pages, in seconds
    #[serde(default = "default_min_delay")]
    pub min_delay: f64,

    /// Upper bound of the delay between pages, in seconds
    #[serde(default = "default_max_delay")]
    pub max_delay: f64,

    /// Base of the exponential retry backoff, in seconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: f64,

    /// How long to wait for cards to render after a navigation
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    /// How long to look for a consent dialog
    #[serde(default = "default_consent_timeout")]
    pub consent_timeout_secs: u64,

    /// Hard limit on the whole session
    #[serde(default)]
    pub total_timeout_secs: Option<u64>,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Where to save screenshots of failed loads
    #[serde(default)]
    pub screenshot_dir: Option<PathBuf>,

    #[serde(default)]
    pub selectors: Selectors,
}

fn default_listing_url() -> String {
    "https://www.quicket.co.za/events/".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_max_pages() -> u32 {
    10
}

fn default_output_path() -> PathBuf {
    PathBuf::from("quicket_events.csv")
}

fn default_max_retries() -> u32 {
    3
}

fn default_headless() -> bool {
    true
}

fn default_min_delay() -> f64 {
    1.0
}

fn default_max_delay() -> f64 {
    3.0
}

fn default_retry_backoff() -> f64 {
    2.0
}

fn default_page_timeout() -> u64 {
    10
}

fn default_consent_timeout() -> u64 {
    5
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_listing_selector() -> String {
    "div.l-event-list".to_string()
}

fn default_card_selector() -> String {
    "div.l-event-list li.l-event-item".to_string()
}

fn default_title_selector() -> String {
    "div.l-event-content div.l-hit-name".to_string()
}

fn default_location_selector() -> String {
    "div.l-event-content div.l-hit-venue".to_string()
}

fn default_date_time_selector() -> String {
    "div.l-event-content div.l-date-container".to_string()
}

fn default_pagination_selector() -> String {
    "a.ais-Pagination-link".to_string()
}

fn default_next_label() -> String {
    "›".to_string()
}

fn default_consent_xpath() -> String {
    "//button[contains(@class, 'cookie-consent-accept') or contains(text(), 'Accept') or contains(text(), 'I agree')]"
        .to_string()
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            page_param: default_page_param(),
            max_pages: default_max_pages(),
            output_path: default_output_path(),
            max_retries_per_page: default_max_retries(),
            headless: default_headless(),
            min_delay: default_min_delay(),
            max_delay: default_max_delay(),
            retry_backoff_secs: default_retry_backoff(),
            page_timeout_secs: default_page_timeout(),
            consent_timeout_secs: default_consent_timeout(),
            total_timeout_secs: None,
            webdriver_url: default_webdriver_url(),
            screenshot_dir: None,
            selectors: Selectors::default(),
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Reject configurations the controller cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(ScrapeError::Config("max_pages must be at least 1".into()));
        }
        if self.page_timeout_secs == 0 {
            return Err(ScrapeError::Config("page_timeout_secs must be at least 1".into()));
        }
        if !(self.min_delay.is_finite() && self.max_delay.is_finite()) {
            return Err(ScrapeError::Config("delay bounds must be finite".into()));
        }
        if self.min_delay < 0.0 || self.max_delay < self.min_delay {
            return Err(ScrapeError::Config(format!(
                "delay bounds must satisfy 0 <= min_delay <= max_delay (got {} and {})",
                self.min_delay, self.max_delay
            )));
        }
        if !self.retry_backoff_secs.is_finite() || self.retry_backoff_secs < 0.0 {
            return Err(ScrapeError::Config("retry_backoff_secs must be >= 0".into()));
        }
        Url::parse(&self.listing_url)
            .map_err(|e| ScrapeError::Config(format!("bad listing_url {:?}: {}", self.listing_url, e)))?;
        self.selectors.validate()
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_secs_f64(self.min_delay)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs_f64(self.max_delay)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.retry_backoff_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn consent_timeout(&self) -> Duration {
        Duration::from_secs(self.consent_timeout_secs)
    }

    /// URL of a listing page when navigating to it directly
    pub fn page_url(&self, page: u32) -> Result<Url> {
        let mut url = Url::parse(&self.listing_url)
            .map_err(|e| ScrapeError::Config(format!("bad listing_url {:?}: {}", self.listing_url, e)))?;
        if page > 1 {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != self.page_param.as_str())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            {
                let mut query = url.query_pairs_mut();
                query.clear();
                for (k, v) in &kept {
                    query.append_pair(k, v);
                }
                query.append_pair(&self.page_param, &page.to_string());
            }
        }
        Ok(url)
    }
}
