use clap::Parser;
use event_pager::ScrapeConfig;
use event_pager::error::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "event-pager")]
#[command(about = "Scrape event listings from a paginated, JavaScript-rendered site into CSV")]
#[command(version)]
pub struct Args {
    /// Maximum number of pages to scrape [default: 10]
    #[arg(long)]
    pub pages: Option<u32>,

    /// Output CSV file [default: quicket_events.csv]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub no_headless: bool,

    /// Retries allowed per page before giving up [default: 3]
    #[arg(long)]
    pub retries: Option<u32>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Listing URL of the first page
    #[arg(long)]
    pub url: Option<String>,

    /// WebDriver endpoint (falls back to WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Minimum delay between pages in seconds
    #[arg(long)]
    pub min_delay: Option<f64>,

    /// Maximum delay between pages in seconds
    #[arg(long)]
    pub max_delay: Option<f64>,

    /// Seconds to wait for a page to render
    #[arg(long)]
    pub page_timeout: Option<u64>,

    /// Abort the whole scrape after this many seconds
    #[arg(long)]
    pub total_timeout: Option<u64>,

    /// Save screenshots of failed page loads here
    #[arg(long)]
    pub screenshot_dir: Option<PathBuf>,
}

impl Args {
    /// Build the session configuration: defaults, then the config file, then
    /// the environment, then flags
    pub fn to_config(&self) -> Result<ScrapeConfig> {
        let mut config = match &self.config {
            Some(path) => ScrapeConfig::from_file(path)?,
            None => ScrapeConfig::default(),
        };

        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                config.webdriver_url = webdriver_url;
            }
        }

        if let Some(pages) = self.pages {
            config.max_pages = pages;
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if self.no_headless {
            config.headless = false;
        }
        if let Some(retries) = self.retries {
            config.max_retries_per_page = retries;
        }
        if let Some(url) = &self.url {
            config.listing_url = url.clone();
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.webdriver_url = webdriver_url.clone();
        }
        if let Some(min_delay) = self.min_delay {
            config.min_delay = min_delay;
        }
        if let Some(max_delay) = self.max_delay {
            config.max_delay = max_delay;
        }
        if let Some(secs) = self.page_timeout {
            config.page_timeout_secs = secs;
        }
        if let Some(secs) = self.total_timeout {
            config.total_timeout_secs = Some(secs);
        }
        if let Some(dir) = &self.screenshot_dir {
            config.screenshot_dir = Some(dir.clone());
        }

        config.validate()?;
        Ok(config)
    }
}
