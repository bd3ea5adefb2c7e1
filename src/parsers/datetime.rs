use regex::Regex;

/// Splits the combined date/time text shown on a card
///
/// Cards render something like `Friday, March 14, 2025 19:00 - 23:00`. The
/// first weekday-month-day-year run becomes the date and the first clock time
/// becomes the time; anything that does not match is left out.
#[derive(Debug, Clone)]
pub struct DateTimeParser {
    date: Regex,
    time: Regex,
}

impl Default for DateTimeParser {
    fn default() -> Self {
        Self::new(
            r"([A-Za-z]+,\s+[A-Za-z]+\s+\d{1,2},\s+\d{4})",
            r"(\d{1,2}:\d{2}(?:\s*[AaPp][Mm])?)",
        )
        .expect("Default date/time patterns should be valid")
    }
}

impl DateTimeParser {
    /// Build a parser from custom patterns; each must have one capture group
    pub fn new(date_pattern: &str, time_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            date: Regex::new(date_pattern)?,
            time: Regex::new(time_pattern)?,
        })
    }

    /// Returns `(date, time)`
    pub fn split(&self, text: &str) -> (Option<String>, Option<String>) {
        (capture(&self.date, text), capture(&self.time, text))
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
