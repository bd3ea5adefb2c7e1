use crate::config::ScrapeConfig;
use crate::consent::ConsentHandler;
use crate::error::{Aborted, RenderError, Result, ScrapeError};
use crate::pacing::{Pacer, backoff_delay};
use crate::parsers::RecordExtractor;
use crate::renderers::PageRenderer;
use crate::results::EventRecord;
use std::time::{Duration, Instant};

/// Time given to a dismissed consent dialog to disappear
pub const CONSENT_SETTLE: Duration = Duration::from_secs(1);

/// Position and progress of a pagination run
///
/// `current_page` only moves forward on a successful page; retries touch
/// `attempts_on_current_page` alone, so a failed load can neither skip a page
/// nor add its records twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub current_page: u32,
    pub max_pages: u32,
    pub attempts_on_current_page: u32,
    pub records: Vec<EventRecord>,
}

impl PageState {
    pub fn new(max_pages: u32) -> Self {
        Self {
            current_page: 1,
            max_pages,
            attempts_on_current_page: 0,
            records: Vec::new(),
        }
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.max_pages
    }

    /// Move to the next page with a fresh retry budget
    fn advance(&mut self) {
        self.current_page += 1;
        self.attempts_on_current_page = 0;
    }
}

/// States of the pagination machine; terminal states carry the outcome
#[derive(Debug)]
enum Phase {
    Init,
    LoadingPage,
    ConsentCheck { html: String },
    Extracting { html: String },
    Advancing,
    Retrying { cause: RenderError },
    Done,
    Failed { error: ScrapeError },
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Init => "INIT",
            Phase::LoadingPage => "LOADING_PAGE",
            Phase::ConsentCheck { .. } => "CONSENT_CHECK",
            Phase::Extracting { .. } => "EXTRACTING",
            Phase::Advancing => "ADVANCING",
            Phase::Retrying { .. } => "RETRYING",
            Phase::Done => "DONE",
            Phase::Failed { .. } => "FAILED",
        }
    }
}

/// Drives a renderer through listing pages 1..=max_pages
pub struct PaginationController {
    extractor: RecordExtractor,
    consent: ConsentHandler,
    pacer: Box<dyn Pacer>,
    max_pages: u32,
    max_retries: u32,
    min_delay: Duration,
    max_delay: Duration,
    retry_backoff: Duration,
    total_timeout_secs: Option<u64>,
}

impl PaginationController {
    pub fn new(config: &ScrapeConfig, pacer: Box<dyn Pacer>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor: RecordExtractor::new(&config.selectors)?,
            consent: ConsentHandler::new(config.selectors.consent_button.clone(), config.consent_timeout()),
            pacer,
            max_pages: config.max_pages,
            max_retries: config.max_retries_per_page,
            min_delay: config.min_delay(),
            max_delay: config.max_delay(),
            retry_backoff: config.retry_backoff(),
            total_timeout_secs: config.total_timeout_secs,
        })
    }

    /// Scrape every page, returning records in page then document order
    ///
    /// On failure the records gathered from completed pages come back in
    /// [`Aborted::partial`].
    pub async fn run<R>(&mut self, renderer: &mut R) -> std::result::Result<Vec<EventRecord>, Aborted>
    where
        R: PageRenderer + ?Sized,
    {
        let deadline = self
            .total_timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let mut state = PageState::new(self.max_pages);
        let mut consent_checked = false;
        let mut phase = Phase::Init;

        loop {
            let from = phase.name();
            phase = match phase {
                Phase::Init => Phase::LoadingPage,

                Phase::LoadingPage => match deadline {
                    Some(at) if Instant::now() >= at => Phase::Failed {
                        error: ScrapeError::DeadlineExceeded(self.total_timeout_secs.unwrap_or_default()),
                    },
                    _ => {
                        ::log::info!("Scraping page {} of {}", state.current_page, state.max_pages);
                        match renderer.load(state.current_page).await {
                            Ok(html) => Phase::ConsentCheck { html },
                            Err(e) if e.is_fatal() => Phase::Failed {
                                error: ScrapeError::Renderer(e),
                            },
                            Err(cause) => Phase::Retrying { cause },
                        }
                    }
                },

                Phase::ConsentCheck { html } => {
                    if !consent_checked && state.current_page == 1 {
                        consent_checked = true;
                        if self.consent.dismiss_if_present(renderer).await {
                            self.pacer.pause(CONSENT_SETTLE).await;
                        }
                    }
                    Phase::Extracting { html }
                }

                Phase::Extracting { html } => {
                    let records = self.extractor.extract(&html);
                    ::log::info!("Found {} events on page {}", records.len(), state.current_page);
                    if records.is_empty() && state.current_page == 1 {
                        Phase::Retrying {
                            cause: RenderError::Load {
                                page: 1,
                                reason: "no event cards found; the listing structure may have changed".into(),
                            },
                        }
                    } else {
                        state.records.extend(records);
                        Phase::Advancing
                    }
                }

                Phase::Advancing => {
                    if state.is_last_page() {
                        Phase::Done
                    } else {
                        let delay = self.pacer.draw(self.min_delay, self.max_delay);
                        ::log::info!("Rate limiting: waiting for {:.2} seconds", delay.as_secs_f64());
                        self.pacer.pause(delay).await;
                        state.advance();
                        Phase::LoadingPage
                    }
                }

                Phase::Retrying { cause } => {
                    if state.attempts_on_current_page < self.max_retries {
                        state.attempts_on_current_page += 1;
                        let delay = backoff_delay(self.retry_backoff, state.attempts_on_current_page);
                        ::log::warn!(
                            "Retrying page {} (attempt {}/{}) in {:.1}s: {}",
                            state.current_page,
                            state.attempts_on_current_page,
                            self.max_retries,
                            delay.as_secs_f64(),
                            cause
                        );
                        self.pacer.pause(delay).await;
                        Phase::LoadingPage
                    } else {
                        Phase::Failed {
                            error: ScrapeError::RetriesExhausted {
                                page: state.current_page,
                                attempts: state.attempts_on_current_page + 1,
                                last: cause,
                            },
                        }
                    }
                }

                Phase::Done => {
                    ::log::info!("Scraped a total of {} events", state.records.len());
                    return Ok(state.records);
                }

                Phase::Failed { error } => {
                    ::log::error!("Scraping stopped on page {}: {}", state.current_page, error);
                    return Err(Aborted {
                        error,
                        partial: state.records,
                    });
                }
            };
            ::log::debug!("Page {}: {} -> {}", state.current_page, from, phase.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_state_lifecycle() {
        let mut state = PageState::new(3);
        assert_eq!(state.current_page, 1);
        assert!(!state.is_last_page());

        state.attempts_on_current_page = 2;
        state.advance();
        assert_eq!(state.current_page, 2);
        assert_eq!(state.attempts_on_current_page, 0);

        state.advance();
        assert!(state.is_last_page());
    }

    #[test]
    fn test_controller_rejects_invalid_config() {
        let config = ScrapeConfig {
            max_pages: 0,
            ..ScrapeConfig::default()
        };
        let result = PaginationController::new(&config, Box::new(crate::pacing::RandomPacer));
        assert!(matches!(result, Err(ScrapeError::Config(_))));
    }
}
