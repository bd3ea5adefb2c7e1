use crate::renderers::{Lookup, PageRenderer};
use std::time::Duration;

/// Dismisses the cookie-consent overlay
///
/// Best effort: a missing dialog is a no-op and a failed dismissal is only
/// logged, since the overlay may not block the listing.
#[derive(Debug, Clone)]
pub struct ConsentHandler {
    button: String,
    wait: Duration,
}

impl ConsentHandler {
    /// `button` is the XPath of the accept control
    pub fn new(button: impl Into<String>, wait: Duration) -> Self {
        Self {
            button: button.into(),
            wait,
        }
    }

    /// Returns true if a dialog was found and dismissed
    pub async fn dismiss_if_present<R>(&self, renderer: &mut R) -> bool
    where
        R: PageRenderer + ?Sized,
    {
        let button = match renderer.find(Lookup::XPath(&self.button), self.wait).await {
            Ok(Some(button)) => button,
            Ok(None) => {
                ::log::info!("No cookie consent dialog found or it has already been accepted");
                return false;
            }
            Err(e) => {
                ::log::warn!("Error looking for cookie consent dialog: {}", e);
                return false;
            }
        };

        ::log::info!("Cookie consent dialog found, accepting cookies");
        match renderer.click(&button).await {
            Ok(()) => true,
            Err(e) => {
                ::log::warn!("Failed to dismiss cookie consent dialog: {}", e);
                false
            }
        }
    }
}
