// Re-export modules
pub mod config;
pub mod consent;
pub mod error;
pub mod pacing;
pub mod pagination;
pub mod parsers;
pub mod renderers;
pub mod results;
pub mod session;
pub mod sink;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use config::ScrapeConfig;
pub use error::{RenderError, ScrapeError};
pub use pagination::{PageState, PaginationController};
pub use results::EventRecord;
pub use session::ScrapeSession;
