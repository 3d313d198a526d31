//! Append-only CSV log of reported observations.

use std::{
    fmt,
    fs::{self, OpenOptions},
    io,
    path::Path,
};

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::debug;

use crate::{WeatherError, WeatherRecord};

const MISSING: &str = "?";

/// Append `record` to the log at `path`, writing the header first if the file
/// is new or empty.
pub fn append_record(record: &WeatherRecord, path: &Path) -> Result<(), WeatherError> {
    let needs_header = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => return Err(WeatherError::io(path, e)),
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| WeatherError::io(path, e))?;

    let mut wtr = WriterBuilder::new()
        .has_headers(needs_header)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(file);

    wtr.serialize(record).map_err(|e| WeatherError::io(path, e))?;
    wtr.flush().map_err(|e| WeatherError::io(path, e))?;

    debug!(path = %path.display(), header = needs_header, "appended record");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub city: String,
    pub temperature: String,
}

/// Entries of the log in file order, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSummary {
    pub entries: Vec<SummaryEntry>,
}

impl LogSummary {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for LogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total entries: {}", self.entries.len())?;
        for entry in &self.entries {
            write!(f, "\n- {} — {} °C", entry.city, entry.temperature)?;
        }
        Ok(())
    }
}

/// Read the log back. `None` if the file is missing or holds no data rows.
pub fn summarize(path: &Path) -> Result<Option<LogSummary>, WeatherError> {
    if !path.exists() {
        return Ok(None);
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| WeatherError::io(path, e))?;

    let headers = rdr.headers().map_err(|e| WeatherError::io(path, e))?.clone();
    let city_idx = column(&headers, WeatherRecord::HEADERS[0]);
    let temp_idx = column(&headers, WeatherRecord::HEADERS[2]);

    let mut entries = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(|e| WeatherError::io(path, e))?;
        entries.push(SummaryEntry {
            city: field(&row, city_idx),
            temperature: field(&row, temp_idx),
        });
    }

    if entries.is_empty() {
        return Ok(None);
    }
    Ok(Some(LogSummary { entries }))
}

fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn field(row: &StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i)).unwrap_or(MISSING).to_string()
}
