use crate::error::Result;
use crate::results::EventRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Column order of the output file
pub const HEADER: [&str; 4] = ["title", "location", "date", "time"];

/// Destination for the records of a finished session
pub trait Sink {
    fn write(&self, records: &[EventRecord]) -> Result<()>;
}

/// Writes records as CSV to a file, replacing any previous content
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for CsvSink {
    fn write(&self, records: &[EventRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fs::File::create(&self.path)?;
        write_csv(file, records)?;

        ::log::info!("Data saved to {}", self.path.display());
        for record in records.iter().take(5) {
            ::log::debug!("Sample row: {:?}", record);
        }
        Ok(())
    }
}

/// Header row then one row per record; absent fields become empty cells
pub fn write_csv<W: io::Write>(out: W, records: &[EventRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(records: &[EventRecord]) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(render(&[]), "title,location,date,time\n");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let records = vec![
            EventRecord::new("Jazz Night")
                .with_location("Baxter Theatre")
                .with_date("Friday, March 14, 2025")
                .with_time("19:00"),
            EventRecord::new("Pop-up Market"),
        ];
        assert_eq!(
            render(&records),
            "title,location,date,time\n\
             Jazz Night,Baxter Theatre,\"Friday, March 14, 2025\",19:00\n\
             Pop-up Market,,,\n"
        );
    }

    #[test]
    fn test_quotes_are_escaped() {
        let records = vec![EventRecord::new("The \"Big\" Show").with_location("Hall A, Level 2")];
        assert_eq!(
            render(&records),
            "title,location,date,time\n\"The \"\"Big\"\" Show\",\"Hall A, Level 2\",,\n"
        );
    }

    #[test]
    fn test_file_sink_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out").join("events.csv");
        let sink = CsvSink::new(&path);

        sink.write(&[EventRecord::new("Only")]).unwrap();
        let written = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(written, "title,location,date,time\nOnly,,,\n");
    }
}
