use crate::results::EventRecord;
use thiserror::Error;

/// Failures reported by a page renderer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No browser session could be created
    #[error("could not connect to WebDriver: {0}")]
    Connect(String),

    /// The page loaded but did not show the listing (or navigation failed)
    #[error("page {page} failed to load: {reason}")]
    Load { page: u32, reason: String },

    /// The page did not render within the per-load timeout
    #[error("page {page} did not render within {secs} seconds")]
    Timeout { page: u32, secs: u64 },

    /// The browser session is gone; nothing further can be done with it
    #[error("browser session lost: {0}")]
    SessionLost(String),

    /// Any other driver command failure
    #[error("driver command failed: {0}")]
    Command(String),
}

impl RenderError {
    /// Whether the renderer can no longer be used after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::SessionLost(_) | RenderError::Connect(_))
    }
}

impl From<fantoccini::error::CmdError> for RenderError {
    fn from(error: fantoccini::error::CmdError) -> Self {
        let message = error.to_string();
        if is_session_error(&message) {
            RenderError::SessionLost(message)
        } else {
            RenderError::Command(message)
        }
    }
}

/// WebDriver servers report a dead session with one of these phrases
fn is_session_error(message: &str) -> bool {
    message.contains("Unable to find session")
        || message.contains("invalid session id")
        || message.contains("session deleted")
        || message.contains("chrome not reachable")
}

/// A single card that could not be turned into a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("card {index} has no title")]
    MissingTitle { index: usize },
}

/// Errors that end a scrape session
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("page {page} still failing after {attempts} attempts: {last}")]
    RetriesExhausted {
        page: u32,
        attempts: u32,
        last: RenderError,
    },

    #[error(transparent)]
    Renderer(#[from] RenderError),

    #[error("session deadline of {0} seconds exceeded")]
    DeadlineExceeded(u64),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    /// True when the failure happened before any page could be requested
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            ScrapeError::Config(_) | ScrapeError::Json(_) | ScrapeError::Renderer(RenderError::Connect(_))
        )
    }
}

/// A pagination run that ended in failure, with whatever it had collected
#[derive(Debug)]
pub struct Aborted {
    pub error: ScrapeError,
    pub partial: Vec<EventRecord>,
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
