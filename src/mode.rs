//! Capture modes and the operator-facing mode selector

use std::fmt;
use std::io::{BufRead, BufReader, Read, Write};

use crate::error::{LoggerError, Result};

/// Action being performed on the monitored object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Lock is being picked
    Pick,
    /// Lock is being opened with its key
    Key,
    /// Lock is handled without a key
    NoKey,
}

impl Mode {
    /// All modes in menu order
    pub const ALL: [Mode; 3] = [Mode::Pick, Mode::Key, Mode::NoKey];

    /// Map a menu digit to its mode
    pub fn from_digit(digit: char) -> Result<Self> {
        match digit {
            '1' => Ok(Mode::Pick),
            '2' => Ok(Mode::Key),
            '3' => Ok(Mode::NoKey),
            other => Err(LoggerError::UnmappedDigit(other)),
        }
    }

    /// Menu digit selecting this mode
    pub fn digit(self) -> char {
        match self {
            Mode::Pick => '1',
            Mode::Key => '2',
            Mode::NoKey => '3',
        }
    }

    /// Name written to the record store
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Pick => "pick",
            Mode::Key => "key",
            Mode::NoKey => "nokey",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First digit in a line of operator input, skipping anything before it
pub fn first_digit(line: &str) -> Option<char> {
    line.chars().find(|c| c.is_ascii_digit())
}

/// Blocking mode prompt over a line-based input
///
/// Lines without any digit are skipped. A digit outside the menu is reported
/// to the operator and the prompt is repeated; it never falls back to a
/// default mode.
pub struct ModeSelector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ModeSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prompt until the operator enters a digit with a mode assigned
    pub fn select(&mut self) -> Result<Mode> {
        self.select_when(|_| Ok(()))
    }

    /// Prompt like [`select`](Self::select), calling `ready` before each line
    /// is read
    ///
    /// `ready` returns once a read will not block, or fails to abandon the
    /// prompt with its error.
    pub fn select_when<F>(&mut self, mut ready: F) -> Result<Mode>
    where
        F: FnMut(&R) -> Result<()>,
    {
        loop {
            self.print_menu()?;
            match Mode::from_digit(self.read_digit(&mut ready)?) {
                Ok(mode) => {
                    log::debug!("Operator selected mode {}", mode);
                    return Ok(mode);
                }
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                }
            }
        }
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "Enter the number of the capture mode and press ENTER:"
        )?;
        let menu: Vec<String> = Mode::ALL
            .iter()
            .map(|m| format!("[{}->{}]", m.digit(), m))
            .collect();
        writeln!(self.output, "    {}", menu.join(" "))?;
        self.output.flush()?;
        Ok(())
    }

    /// Read lines until one contains a digit
    fn read_digit<F>(&mut self, ready: &mut F) -> Result<char>
    where
        F: FnMut(&R) -> Result<()>,
    {
        let mut line = String::new();
        loop {
            ready(&self.input)?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(LoggerError::EndOfInput);
            }
            if let Some(digit) = first_digit(&line) {
                return Ok(digit);
            }
        }
    }
}

impl<T: Read, W> ModeSelector<BufReader<T>, W> {
    /// Underlying unbuffered input
    pub fn source(&self) -> &T {
        self.input.get_ref()
    }

    /// Input already read from the source but not consumed yet
    pub fn has_buffered_input(&self) -> bool {
        !self.input.buffer().is_empty()
    }
}
