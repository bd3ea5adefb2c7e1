use crate::parsers::DateTimeParser;

#[test]
fn test_split_full_date_time() {
    let parser = DateTimeParser::default();
    let (date, time) = parser.split("Friday, March 14, 2025 19:00 - 23:00");
    assert_eq!(date.as_deref(), Some("Friday, March 14, 2025"));
    assert_eq!(time.as_deref(), Some("19:00"));
}

#[test]
fn test_split_twelve_hour_time() {
    let parser = DateTimeParser::default();
    let (date, time) = parser.split("Sunday, June 1, 2025 at 7:30 PM");
    assert_eq!(date.as_deref(), Some("Sunday, June 1, 2025"));
    assert_eq!(time.as_deref(), Some("7:30 PM"));
}

#[test]
fn test_split_partial_text() {
    let parser = DateTimeParser::default();

    let (date, time) = parser.split("Doors open 18:30");
    assert_eq!(date, None);
    assert_eq!(time.as_deref(), Some("18:30"));

    let (date, time) = parser.split("Monday, July 7, 2025");
    assert_eq!(date.as_deref(), Some("Monday, July 7, 2025"));
    assert_eq!(time, None);

    assert_eq!(parser.split(""), (None, None));
}

#[test]
fn test_custom_patterns() {
    let parser = DateTimeParser::new(r"(\d{4}-\d{2}-\d{2})", r"T(\d{2}:\d{2})").unwrap();
    let (date, time) = parser.split("2025-03-14T20:15");
    assert_eq!(date.as_deref(), Some("2025-03-14"));
    assert_eq!(time.as_deref(), Some("20:15"));

    assert!(DateTimeParser::new("(", "x").is_err());
}
