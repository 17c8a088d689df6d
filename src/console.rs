//! Operator console: mode prompts over a pollable input

use std::io::{BufReader, Read, Write};
use std::os::fd::AsFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nix::poll::PollTimeout;

use crate::error::{LoggerError, Result};
use crate::input::InputWatcher;
use crate::logger::{ModePoll, ModeSource};
use crate::mode::{Mode, ModeSelector};

/// How long an open prompt waits for input before rechecking the running flag
pub const INTERRUPT_CHECK_MS: u16 = 100;

/// Joins the input watcher and the mode selector on one input stream
///
/// Takes the same `BufReader` used for the name prompt, so anything the
/// operator typed ahead is not lost. Once the input reaches its end the
/// console stops asking and the current mode stays in effect.
pub struct Console<T, W> {
    selector: ModeSelector<BufReader<T>, W>,
    running: Option<Arc<AtomicBool>>,
    closed: bool,
}

impl<T: Read + AsFd, W: Write> Console<T, W> {
    pub fn new(input: BufReader<T>, output: W) -> Self {
        Self {
            selector: ModeSelector::new(input, output),
            running: None,
            closed: false,
        }
    }

    /// Give up a mid-session prompt once `running` is cleared
    pub fn with_interrupt(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }

    /// Whether a read would return without waiting
    pub fn input_pending(&self) -> Result<bool> {
        if self.selector.has_buffered_input() {
            return Ok(true);
        }
        InputWatcher::new(self.selector.source()).pending()
    }

    /// Blocking mode prompt
    pub fn select_mode(&mut self) -> Result<Mode> {
        self.selector.select()
    }
}

/// Block until a line can be read or `running` is cleared
fn wait_for_input<T: Read + AsFd>(input: &BufReader<T>, running: &AtomicBool) -> Result<()> {
    let watcher = InputWatcher::new(input.get_ref());
    loop {
        if !running.load(Ordering::SeqCst) {
            return Err(LoggerError::Interrupted);
        }
        if !input.buffer().is_empty() || watcher.wait(PollTimeout::from(INTERRUPT_CHECK_MS))? {
            return Ok(());
        }
    }
}

impl<T: Read + AsFd, W: Write> ModeSource for Console<T, W> {
    fn poll_mode(&mut self) -> Result<ModePoll> {
        if self.closed || !self.input_pending()? {
            return Ok(ModePoll::Idle);
        }

        let selected = match &self.running {
            Some(running) => self
                .selector
                .select_when(|input| wait_for_input(input, running)),
            None => self.selector.select(),
        };

        match selected {
            Ok(mode) => Ok(ModePoll::Changed(mode)),
            Err(LoggerError::Interrupted) => Ok(ModePoll::Interrupted),
            Err(LoggerError::EndOfInput) => {
                log::warn!("Operator input closed; no further mode changes");
                self.closed = true;
                Ok(ModePoll::Idle)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use std::os::unix::net::UnixStream;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_no_mode_without_input() {
        let (reader, _writer) = UnixStream::pair().unwrap();
        let mut console = Console::new(BufReader::new(&reader), Vec::new());
        assert_eq!(console.poll_mode().unwrap(), ModePoll::Idle);
        assert_eq!(console.poll_mode().unwrap(), ModePoll::Idle);
    }

    #[test]
    fn test_typed_digit_switches_mode_once() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        let mut console = Console::new(BufReader::new(&reader), Vec::new());

        writer.write_all(b"3\n").unwrap();
        assert_eq!(console.poll_mode().unwrap(), ModePoll::Changed(Mode::NoKey));
        assert_eq!(console.poll_mode().unwrap(), ModePoll::Idle);
    }

    #[test]
    fn test_lines_typed_ahead_are_kept() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        writer.write_all(b"Alice\n1\n").unwrap();

        let mut input = BufReader::new(&reader);
        let mut name = String::new();
        input.read_line(&mut name).unwrap();
        assert_eq!(name, "Alice\n");

        // "1\n" now sits in the BufReader, not in the socket
        let mut console = Console::new(input, Vec::new());
        assert!(console.input_pending().unwrap());
        assert_eq!(console.poll_mode().unwrap(), ModePoll::Changed(Mode::Pick));
        assert!(!console.input_pending().unwrap());
    }

    #[test]
    fn test_open_prompt_gives_up_when_flag_cleared() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let mut console =
            Console::new(BufReader::new(&reader), Vec::new()).with_interrupt(running.clone());

        // A bare ENTER opens the prompt with no digit to read
        writer.write_all(b"\n").unwrap();
        let stopper = {
            let running = running.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                running.store(false, Ordering::SeqCst);
            })
        };

        let start = Instant::now();
        assert_eq!(console.poll_mode().unwrap(), ModePoll::Interrupted);
        assert!(start.elapsed() < Duration::from_secs(2));
        stopper.join().unwrap();
    }

    #[test]
    fn test_open_prompt_still_takes_a_digit() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let mut console =
            Console::new(BufReader::new(&reader), Vec::new()).with_interrupt(running);

        writer.write_all(b"7\n").unwrap();
        let typist = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            writer.write_all(b"2\n").unwrap();
            writer
        });

        assert_eq!(console.poll_mode().unwrap(), ModePoll::Changed(Mode::Key));
        drop(typist.join().unwrap());
    }

    #[test]
    fn test_closed_input_keeps_current_mode() {
        let (reader, writer) = UnixStream::pair().unwrap();
        drop(writer);
        let mut console = Console::new(BufReader::new(&reader), Vec::new());

        for _ in 0..3 {
            assert_eq!(console.poll_mode().unwrap(), ModePoll::Idle);
        }
    }
}
