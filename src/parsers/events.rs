use crate::config::Selectors;
use crate::error::{ExtractError, Result, ScrapeError};
use crate::parsers::DateTimeParser;
use crate::results::EventRecord;
use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};

/// Turns rendered listing HTML into event records
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    card: Selector,
    title: Selector,
    location: Selector,
    date_time: Selector,
    date_time_parser: DateTimeParser,
}

impl RecordExtractor {
    /// Compile the selectors used to find cards and their fields
    pub fn new(selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            card: compile(&selectors.card)?,
            title: compile(&selectors.title)?,
            location: compile(&selectors.location)?,
            date_time: compile(&selectors.date_time)?,
            date_time_parser: DateTimeParser::default(),
        })
    }

    /// Extract all records from one listing page, in document order
    ///
    /// Cards without a title are skipped; missing optional fields are `None`.
    pub fn extract(&self, html: &str) -> Vec<EventRecord> {
        let doc = Html::parse_document(html);

        let mut records = Vec::new();
        let mut total = 0;
        let mut skipped = 0;
        for (index, card) in doc.select(&self.card).enumerate() {
            total += 1;
            match self.extract_card(index, card) {
                Ok(record) => {
                    ::log::debug!("Extracted event: {:?}", record);
                    records.push(record);
                }
                Err(e) => {
                    skipped += 1;
                    ::log::debug!("Skipping card: {}", e);
                }
            }
        }

        if skipped > 0 {
            ::log::warn!("Skipped {} of {} card(s) without a title", skipped, total);
        }
        records
    }

    fn extract_card(&self, index: usize, card: ElementRef<'_>) -> std::result::Result<EventRecord, ExtractError> {
        let title = field_text(card, &self.title).ok_or(ExtractError::MissingTitle { index })?;

        let (date, time) = match field_text(card, &self.date_time) {
            Some(text) => self.date_time_parser.split(&text),
            None => (None, None),
        };

        Ok(EventRecord {
            title,
            location: field_text(card, &self.location),
            date,
            time,
        })
    }
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Config(format!("bad selector {:?}: {}", css, e)))
}

/// Whitespace-normalised text of the first match, `None` if absent or blank
fn field_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = card.select(selector).next()?;
    let text = collapse_whitespace(element.text());
    if text.is_empty() { None } else { Some(text) }
}
