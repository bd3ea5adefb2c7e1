//! Listing HTML shaped like the Quicket event list

/// Fields of one card; `None` leaves the element out entirely
#[derive(Debug, Clone, Default)]
pub struct Card<'a> {
    pub title: Option<&'a str>,
    pub venue: Option<&'a str>,
    pub date_time: Option<&'a str>,
}

impl<'a> Card<'a> {
    pub fn full(title: &'a str, venue: &'a str, date_time: &'a str) -> Self {
        Self {
            title: Some(title),
            venue: Some(venue),
            date_time: Some(date_time),
        }
    }

    pub fn titled(title: &'a str) -> Self {
        Self {
            title: Some(title),
            ..Self::default()
        }
    }
}

pub fn card_html(card: &Card<'_>) -> String {
    let mut inner = String::new();
    if let Some(title) = card.title {
        inner.push_str(&format!("<div class=\"l-hit-name\">{}</div>", title));
    }
    if let Some(venue) = card.venue {
        inner.push_str(&format!("<div class=\"l-hit-venue\">{}</div>", venue));
    }
    if let Some(date_time) = card.date_time {
        inner.push_str(&format!("<div class=\"l-date-container\">{}</div>", date_time));
    }
    format!(
        "<li class=\"l-event-item\"><div class=\"l-event-content\">{}</div></li>",
        inner
    )
}

pub fn listing_html(cards: &[Card<'_>]) -> String {
    let items: String = cards.iter().map(card_html).collect();
    format!(
        "<html><body><div class=\"l-event-list\"><ul>{}</ul></div></body></html>",
        items
    )
}

/// A page with `count` fully populated cards titled `"<prefix> <n>"`
pub fn numbered_page(prefix: &str, count: usize) -> String {
    let titles: Vec<String> = (1..=count).map(|n| format!("{} {}", prefix, n)).collect();
    let cards: Vec<Card<'_>> = titles
        .iter()
        .map(|t| Card::full(t, "Main Hall", "Saturday, May 3, 2025 19:00"))
        .collect();
    listing_html(&cards)
}
