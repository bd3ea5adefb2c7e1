use crate::error::RenderError;
use async_trait::async_trait;
use std::time::Duration;

/// How to find an element on the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Css(&'a str),
    XPath(&'a str),
}

/// A single browser session that can show listing pages
///
/// Implementations own exactly one session; callers drive it strictly
/// sequentially.
#[async_trait]
pub trait PageRenderer: Send {
    /// Handle to an element on the currently displayed page
    type Element: Send + Sync;

    /// Show listing page `page` (1-indexed) and return its rendered HTML
    ///
    /// Page 1 returns only once event cards are present; later pages may
    /// return an empty listing. Loading the page that is already displayed
    /// reloads it.
    async fn load(&mut self, page: u32) -> Result<String, RenderError>;

    /// Look for an element, waiting up to `wait` for it to appear
    async fn find(&mut self, lookup: Lookup<'_>, wait: Duration) -> Result<Option<Self::Element>, RenderError>;

    /// Click an element previously returned by [`PageRenderer::find`]
    async fn click(&mut self, element: &Self::Element) -> Result<(), RenderError>;

    /// End the browser session
    async fn close(&mut self) -> Result<(), RenderError>;
}
