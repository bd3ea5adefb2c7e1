use crate::config::{ScrapeConfig, Selectors};
use crate::error::RenderError;
use crate::renderers::{Lookup, PageRenderer};
use crate::utils::screenshot_path;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::timeout;

/// How often to re-check the DOM while waiting for cards
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Pause after scrolling an element into view before clicking it
const SCROLL_SETTLE: Duration = Duration::from_millis(500);

/// Renders listing pages in a real browser through a WebDriver server
pub struct WebDriverRenderer {
    client: Client,
    config: ScrapeConfig,
    /// Page currently shown, if the last load succeeded
    displayed: Option<u32>,
    /// Outer HTML of the first card on the displayed page
    first_card: Option<String>,
    failures: FailureCounter,
    closed: bool,
}

/// What the DOM shows while a navigation settles
#[derive(Debug, Clone, PartialEq, Eq)]
enum Readiness {
    /// A card that was not on the previous page
    Cards(String),
    /// The listing rendered without cards; only accepted past page 1
    EmptyListing,
    Pending,
}

/// Decide whether `page` has finished rendering
///
/// Page 1 must show cards. A later page may legitimately be empty once the
/// listing container is there and the previous page's cards are gone.
fn readiness(page: u32, first_card: Option<String>, listing_present: bool, previous: Option<&str>) -> Readiness {
    match first_card {
        Some(html) if previous != Some(html.as_str()) => Readiness::Cards(html),
        Some(_) => Readiness::Pending,
        None if page > 1 && listing_present => Readiness::EmptyListing,
        None => Readiness::Pending,
    }
}

/// Numbers consecutive failed loads of the same page
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FailureCounter {
    page: u32,
    count: u32,
}

impl FailureCounter {
    /// Record a failure of `page` and return its 1-based attempt number
    fn record(&mut self, page: u32) -> u32 {
        if self.page != page {
            self.page = page;
            self.count = 0;
        }
        self.count += 1;
        self.count
    }
}

impl WebDriverRenderer {
    /// Open a browser session, trying well-known local endpoints if the
    /// configured one is unreachable
    pub async fn connect(config: &ScrapeConfig) -> Result<Self, RenderError> {
        let caps = capabilities(config.headless);
        let client = connect_to_webdriver(&config.webdriver_url, &caps).await?;
        ::log::info!(
            "Browser session started ({} mode)",
            if config.headless { "headless" } else { "visible" }
        );

        Ok(Self {
            client,
            config: config.clone(),
            displayed: None,
            first_card: None,
            failures: FailureCounter::default(),
            closed: false,
        })
    }

    fn selectors(&self) -> &Selectors {
        &self.config.selectors
    }

    /// Bring `page` on screen and return its source once it has rendered
    async fn navigate(&mut self, page: u32) -> Result<String, RenderError> {
        let follows_displayed = page > 1 && self.displayed == Some(page - 1);

        let previous = if follows_displayed && self.click_pagination(page).await? {
            self.first_card.take()
        } else {
            let url = self
                .config
                .page_url(page)
                .map_err(|e| RenderError::Load {
                    page,
                    reason: e.to_string(),
                })?;
            ::log::debug!("Navigating to {}", url);
            self.client.goto(url.as_str()).await?;
            None
        };

        self.wait_for_listing(page, previous).await?;
        Ok(self.client.source().await?)
    }

    /// Click the numbered link for `page`, or the "next" link if there is none
    ///
    /// Returns false when neither link exists.
    async fn click_pagination(&mut self, page: u32) -> Result<bool, RenderError> {
        let css = self.selectors().pagination_link.clone();
        let links = self.client.find_all(Locator::Css(&css)).await?;

        let wanted = page.to_string();
        let mut next = None;
        for link in links {
            let label = link.text().await?;
            let label = label.trim();
            if label == wanted {
                self.click_element(&link).await?;
                return Ok(true);
            }
            if next.is_none() && label == self.selectors().next_label {
                next = Some(link);
            }
        }

        match next {
            Some(link) => {
                ::log::warn!("Page {} link not found, using the next button", page);
                self.click_element(&link).await?;
                Ok(true)
            }
            None => {
                ::log::warn!("No pagination link leads to page {}, navigating directly", page);
                Ok(false)
            }
        }
    }

    /// Scroll into view and click, falling back to a script click when
    /// something overlays the element
    async fn click_element(&self, element: &Element) -> Result<(), RenderError> {
        let arg = serde_json::to_value(element).map_err(|e| RenderError::Command(e.to_string()))?;
        self.client
            .execute("arguments[0].scrollIntoView(true);", vec![arg.clone()])
            .await?;
        tokio::time::sleep(SCROLL_SETTLE).await;

        match element.click().await {
            Ok(()) => Ok(()),
            Err(e) if e.to_string().contains("intercepted") => {
                ::log::info!("Click intercepted, trying JavaScript click");
                self.client.execute("arguments[0].click();", vec![arg]).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Wait until the page shows a card that differs from `previous`, or,
    /// past page 1, an empty listing
    async fn wait_for_listing(&mut self, page: u32, previous: Option<String>) -> Result<(), RenderError> {
        let card_css = self.selectors().card.clone();
        let listing_css = self.selectors().listing.clone();
        // The container can render before its cards; wait for a second look
        let mut empty_seen = false;
        loop {
            let first_card = match self.client.find(Locator::Css(&card_css)).await {
                Ok(card) => Some(card.html(false).await?),
                Err(e) if e.is_no_such_element() => None,
                Err(e) => return Err(e.into()),
            };
            let listing_present = first_card.is_none()
                && page > 1
                && !self.client.find_all(Locator::Css(&listing_css)).await?.is_empty();

            match readiness(page, first_card, listing_present, previous.as_deref()) {
                Readiness::Cards(html) => {
                    self.first_card = Some(html);
                    return Ok(());
                }
                Readiness::EmptyListing if empty_seen => {
                    ::log::info!("Page {} has no events", page);
                    self.first_card = None;
                    return Ok(());
                }
                Readiness::EmptyListing => empty_seen = true,
                Readiness::Pending => empty_seen = false,
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Save a screenshot of the failed page, if a directory is configured
    async fn capture_failure(&mut self, page: u32) {
        let Some(dir) = self.config.screenshot_dir.clone() else {
            return;
        };
        let attempt = self.failures.record(page);
        let path: PathBuf = screenshot_path(&dir, page, attempt);
        match self.client.screenshot().await {
            Ok(png) => match tokio::fs::write(&path, png).await {
                Ok(()) => ::log::info!("Saved screenshot to {}", path.display()),
                Err(e) => ::log::warn!("Failed to write screenshot {}: {}", path.display(), e),
            },
            Err(e) => ::log::warn!("Failed to take screenshot: {}", e),
        }
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    type Element = Element;

    async fn load(&mut self, page: u32) -> Result<String, RenderError> {
        let limit = self.config.page_timeout();
        let result = match timeout(limit, self.navigate(page)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout {
                page,
                secs: limit.as_secs(),
            }),
        };

        match result {
            Ok(html) => {
                self.displayed = Some(page);
                Ok(html)
            }
            Err(e) => {
                self.displayed = None;
                self.first_card = None;
                if !e.is_fatal() {
                    self.capture_failure(page).await;
                }
                Err(e)
            }
        }
    }

    async fn find(&mut self, lookup: Lookup<'_>, wait: Duration) -> Result<Option<Element>, RenderError> {
        let locator = match lookup {
            Lookup::Css(css) => Locator::Css(css),
            Lookup::XPath(xpath) => Locator::XPath(xpath),
        };
        match self.client.wait().at_most(wait).for_element(locator).await {
            Ok(element) => Ok(Some(element)),
            Err(CmdError::WaitTimeout) => Ok(None),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn click(&mut self, element: &Element) -> Result<(), RenderError> {
        self.click_element(element).await
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        ::log::info!("Closing browser session");
        self.client.clone().close().await?;
        Ok(())
    }
}

impl Drop for WebDriverRenderer {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // Dropped without close(), e.g. a cancelled session future
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let client = self.client.clone();
            handle.spawn(async move {
                if let Err(e) = client.close().await {
                    ::log::warn!("Failed to close abandoned browser session: {}", e);
                }
            });
        }
    }
}

/// Chrome capabilities for the session
pub fn capabilities(headless: bool) -> Map<String, Value> {
    let mut args = vec![
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--disable-gpu",
        "--window-size=1920,1080",
    ];
    if headless {
        args.insert(0, "--headless");
    }

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(webdriver_url: &str, caps: &Map<String, Value>) -> Result<Client, RenderError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(caps.clone());

    let first_error = match builder.connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e.to_string()
        }
    };

    // If we couldn't connect, try with common alternative URLs
    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // Selenium / geckodriver default
        "http://127.0.0.1:4444", // Try with IP instead of localhost
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = builder.connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!("Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable");
    Err(RenderError::Connect(format!("{}: {}", webdriver_url, first_error)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_requires_cards() {
        assert_eq!(readiness(1, None, true, None), Readiness::Pending);
        assert_eq!(
            readiness(1, Some("<div>a</div>".into()), true, None),
            Readiness::Cards("<div>a</div>".into())
        );
    }

    #[test]
    fn test_later_page_accepts_empty_listing() {
        assert_eq!(readiness(8, None, true, Some("<div>old</div>")), Readiness::EmptyListing);
        // Nothing rendered yet
        assert_eq!(readiness(8, None, false, None), Readiness::Pending);
    }

    #[test]
    fn test_stale_card_is_pending() {
        let old = "<div>old</div>";
        assert_eq!(readiness(3, Some(old.into()), true, Some(old)), Readiness::Pending);
        assert_eq!(
            readiness(3, Some("<div>new</div>".into()), true, Some(old)),
            Readiness::Cards("<div>new</div>".into())
        );
    }

    #[test]
    fn test_failure_counter_is_per_page() {
        let mut counter = FailureCounter::default();
        assert_eq!(counter.record(2), 1);
        assert_eq!(counter.record(2), 2);
        assert_eq!(counter.record(3), 1);
        assert_eq!(counter.record(2), 1);
    }

    #[test]
    fn test_headless_capabilities() {
        let caps = capabilities(true);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert_eq!(args[0], "--headless");
        assert!(args.iter().any(|a| a == "--window-size=1920,1080"));
    }

    #[test]
    fn test_visible_capabilities() {
        let caps = capabilities(false);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "--headless"));
        assert_eq!(caps["browserName"], "chrome");
    }
}
