//! CSV record store for sample rows

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{LoggerError, Result};
use crate::mode::Mode;
use crate::sensor::{Acceleration, Orientation};

/// Column header written once at the top of every record file
pub const CSV_HEADER: [&str; 10] = [
    "roll", "pitch", "yaw", "x", "y", "z", "timestamp", "runtime", "mode", "name",
];

/// One logged sample
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub orientation: Orientation,
    pub acceleration: Acceleration,
    /// Wall-clock time as `MM/DD/YYYY_HH:MM:SS`
    pub timestamp: String,
    /// Seconds since the session started
    pub runtime: f64,
    pub mode: Mode,
    pub name: String,
}

impl SampleRecord {
    /// Fields in header order
    pub fn fields(&self) -> [String; 10] {
        [
            self.orientation.roll.to_string(),
            self.orientation.pitch.to_string(),
            self.orientation.yaw.to_string(),
            self.acceleration.x.to_string(),
            self.acceleration.y.to_string(),
            self.acceleration.z.to_string(),
            self.timestamp.clone(),
            self.runtime.to_string(),
            self.mode.to_string(),
            self.name.clone(),
        ]
    }
}

/// Quote a CSV field if it contains a delimiter, quote or line break
pub fn escape_field(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}

fn write_row<W: Write, S: AsRef<str>>(out: &mut W, fields: &[S]) -> io::Result<()> {
    let line: Vec<_> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    writeln!(out, "{}", line.join(","))
}

/// Append-only writer for one session's records
///
/// The header goes out on construction. Every appended row is flushed before
/// the call returns, and rows must arrive with non-decreasing runtime.
pub struct RecordWriter<W: Write> {
    out: W,
    rows: u64,
    last_runtime: Option<f64>,
}

impl RecordWriter<BufWriter<File>> {
    /// Create a new record file; fails if the path already exists
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => LoggerError::DestinationExists(path.to_path_buf()),
                _ => LoggerError::Io(e),
            })?;
        Self::new(BufWriter::new(file))
    }

    /// Flush and sync the file to the storage device
    pub fn finish(mut self) -> Result<u64> {
        self.out.flush()?;
        self.out.get_ref().sync_all()?;
        Ok(self.rows)
    }
}

impl<W: Write> RecordWriter<W> {
    /// Wrap a sink and write the header row
    pub fn new(mut out: W) -> Result<Self> {
        write_row(&mut out, &CSV_HEADER)?;
        out.flush()?;
        Ok(Self {
            out,
            rows: 0,
            last_runtime: None,
        })
    }

    /// Append one record and flush it
    pub fn append(&mut self, record: &SampleRecord) -> Result<()> {
        if let Some(previous) = self.last_runtime {
            if record.runtime < previous {
                return Err(LoggerError::NonMonotonicRuntime {
                    previous,
                    current: record.runtime,
                });
            }
        }

        write_row(&mut self.out, &record.fields())?;
        self.out.flush()?;

        self.last_runtime = Some(record.runtime);
        self.rows += 1;
        Ok(())
    }

    /// Number of sample rows written so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
