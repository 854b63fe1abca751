//! Manifest records and their CSV serialization
//!
//! One line per hashed file: `absolute-path,extension,size,fingerprint`.
//! The writer is append-only; a record is never rewritten once emitted.

use crate::tree::walker::WalkSink;
use chrono::{DateTime, TimeZone};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One hashed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    pub absolute_path: PathBuf,
    /// Extension including the leading dot, or empty
    pub extension: String,
    /// Size observed when the record was emitted
    pub size_bytes: u64,
    /// 32 lowercase hex characters
    pub fingerprint: String,
}

impl ManifestRecord {
    /// Serialize as one CSV line, without the trailing newline
    pub fn to_csv_line(&self) -> String {
        let path = self.absolute_path.to_string_lossy();
        format!(
            "{},{},{},{}",
            escape_field(&path),
            escape_field(&self.extension),
            self.size_bytes,
            self.fingerprint
        )
    }
}

/// Quote a field when it contains the delimiter, a quote or a line break.
fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Manifest file name for a run started at `now`: `%Y%m%d%H%M%S.csv`
pub fn manifest_file_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{}.csv", now.format("%Y%m%d%H%M%S"))
}

/// CSV manifest sink over any writer
pub struct CsvManifest<W: Write> {
    writer: BufWriter<W>,
    records: u64,
}

impl CsvManifest<File> {
    /// Create (or truncate) the manifest file at `path`
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        debug!(manifest = %path.display(), "Manifest file created");
        Ok(Self::new(file))
    }
}

impl<W: Write> CsvManifest<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            records: 0,
        }
    }

    /// Number of records written so far
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Append one record line
    pub fn write_record(&mut self, record: &ManifestRecord) -> std::io::Result<()> {
        self.writer.write_all(record.to_csv_line().as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> std::io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> WalkSink for CsvManifest<W> {
    fn record(&mut self, record: ManifestRecord) -> std::io::Result<()> {
        self.write_record(&record)
    }
}
