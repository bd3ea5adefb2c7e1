use crate::config::ScrapeConfig;
use crate::error::{Aborted, Result};
use crate::pacing::{Pacer, RandomPacer};
use crate::pagination::PaginationController;
use crate::renderers::{PageRenderer, WebDriverRenderer};
use crate::sink::{CsvSink, Sink};
use crate::utils::prepare_directory;
use std::path::PathBuf;

/// Runs one scrape from browser start-up to CSV output
pub struct ScrapeSession {
    config: ScrapeConfig,
    pacer: Box<dyn Pacer>,
}

impl ScrapeSession {
    /// Create a session with random rate-limit delays
    pub fn new(config: ScrapeConfig) -> Self {
        Self {
            config,
            pacer: Box::new(RandomPacer),
        }
    }

    /// Replace the delay source
    pub fn with_pacer(mut self, pacer: Box<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Start a browser session and scrape with it
    pub async fn execute(self) -> Result<PathBuf> {
        self.config.validate()?;
        if let Some(dir) = &self.config.screenshot_dir {
            prepare_directory(dir)?;
        }

        let renderer = WebDriverRenderer::connect(&self.config).await?;
        self.execute_with(renderer).await
    }

    /// Scrape with an already acquired renderer
    ///
    /// The renderer is closed before returning, whatever the outcome. On
    /// failure any records already collected are still written.
    pub async fn execute_with<R: PageRenderer>(self, mut renderer: R) -> Result<PathBuf> {
        let Self { config, pacer } = self;

        let outcome = match PaginationController::new(&config, pacer) {
            Ok(mut controller) => controller.run(&mut renderer).await,
            Err(error) => Err(Aborted {
                error,
                partial: Vec::new(),
            }),
        };

        if let Err(e) = renderer.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }

        let sink = CsvSink::new(&config.output_path);
        match outcome {
            Ok(records) => {
                sink.write(&records)?;
                ::log::info!(
                    "Scraping completed successfully. {} events saved to {}",
                    records.len(),
                    config.output_path.display()
                );
                Ok(config.output_path)
            }
            Err(Aborted { error, partial }) => {
                if !partial.is_empty() {
                    match sink.write(&partial) {
                        Ok(()) => ::log::warn!(
                            "Saved {} events collected before the failure to {}",
                            partial.len(),
                            config.output_path.display()
                        ),
                        Err(e) => ::log::error!("Could not save partial results: {}", e),
                    }
                }
                Err(error)
            }
        }
    }
}
