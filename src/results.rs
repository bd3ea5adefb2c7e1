use serde::Serialize;

/// One event scraped from a listing card
///
/// Optional fields stay `None` when the card does not carry them; they are
/// written as empty CSV cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Event name, always present
    pub title: String,

    /// Venue text
    pub location: Option<String>,

    /// Date, e.g. "Friday, March 14, 2025"
    pub date: Option<String>,

    /// Start time, e.g. "19:00" or "7:30 PM"
    pub time: Option<String>,
}

impl EventRecord {
    /// Create a record with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            location: None,
            date: None,
            time: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }
}
