//! Session setup: operator name confirmation and record destination

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::common::{file_timestamp, TimeKeeper};
use crate::error::{LoggerError, Result};

/// Default directory for record files, relative to the working directory
pub const DEFAULT_LOG_DIR: &str = "log";

/// Operator's answer to "is this name correct?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    Unrecognized,
}

impl Confirmation {
    /// `y`/`yes` confirm and `n`/`no` reject, ignoring case and surrounding space
    pub fn parse(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Confirmation::Yes,
            "n" | "no" => Confirmation::No,
            _ => Confirmation::Unrecognized,
        }
    }
}

/// Check a trimmed operator name can be used in a record file name
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LoggerError::InvalidName("name is empty".to_string()));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(LoggerError::InvalidName(format!(
            "'{}' contains a path separator",
            name
        )));
    }
    Ok(())
}

/// Record file name for an operator and session start time
pub fn record_file_name(name: &str, started_at: &DateTime<Local>) -> String {
    format!("{}_log_{}.csv", name, file_timestamp(started_at))
}

/// Line-based prompts used during session setup
pub struct NamePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> NamePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask for a name until the operator confirms one
    pub fn ask(&mut self) -> Result<String> {
        loop {
            let name = self.read_answer("Please type in your name and press ENTER: ")?;
            if let Err(e) = validate_name(&name) {
                writeln!(self.output, "{}", e)?;
                continue;
            }

            loop {
                let answer = self.read_answer(&format!(
                    "Is this name correct? [y/n] --> {}: ",
                    name
                ))?;
                match Confirmation::parse(&answer) {
                    Confirmation::Yes => {
                        log::debug!("Operator name confirmed: {}", name);
                        return Ok(name);
                    }
                    Confirmation::No => break,
                    Confirmation::Unrecognized => {
                        writeln!(self.output, "Please answer y or n.")?;
                    }
                }
            }
        }
    }

    fn read_answer(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(LoggerError::EndOfInput);
        }
        Ok(line.trim().to_string())
    }
}

/// One logging run tied to an operator and a start time
#[derive(Debug, Clone)]
pub struct Session {
    operator: String,
    clock: TimeKeeper,
    record_path: PathBuf,
}

impl Session {
    /// Start a session now, placing its record file under `log_dir`
    pub fn start<P: AsRef<Path>>(operator: String, log_dir: P) -> Result<Self> {
        validate_name(&operator)?;
        let clock = TimeKeeper::new();
        let record_path = log_dir
            .as_ref()
            .join(record_file_name(&operator, &clock.started_at()));
        Ok(Self {
            operator,
            clock,
            record_path,
        })
    }

    /// Create the log directory if it does not exist yet
    pub fn prepare_log_dir(&self) -> Result<()> {
        if let Some(dir) = self.record_path.parent() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.clock.started_at()
    }

    /// Seconds since the session started
    pub fn runtime(&self) -> f64 {
        self.clock.elapsed_secs()
    }

    pub fn record_path(&self) -> &Path {
        &self.record_path
    }
}
