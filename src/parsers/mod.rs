pub mod datetime;
pub mod events;

pub use datetime::DateTimeParser;
pub use events::RecordExtractor;

#[cfg(test)]
mod tests;
