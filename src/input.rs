//! Non-blocking operator input detection

use std::os::fd::AsFd;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use crate::error::Result;

/// Zero-wait readiness check on an input stream
///
/// Only reports whether a read would return immediately; the queued bytes
/// are left for the caller to read.
pub struct InputWatcher<F> {
    source: F,
}

impl<F: AsFd> InputWatcher<F> {
    pub fn new(source: F) -> Self {
        Self { source }
    }

    /// Check for queued input without waiting
    pub fn pending(&self) -> Result<bool> {
        self.wait(PollTimeout::ZERO)
    }

    /// Wait up to `timeout` for the input to become readable
    ///
    /// A closed input counts as readable, since the next read returns at once
    /// with end of input.
    pub fn wait(&self, timeout: PollTimeout) -> Result<bool> {
        let mut fds = [PollFd::new(self.source.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, timeout) {
            Ok(0) => Ok(false),
            Ok(_) => {
                let ready = PollFlags::POLLIN | PollFlags::POLLHUP;
                Ok(fds[0].revents().is_some_and(|events| events.intersects(ready)))
            }
            // Interrupted by a signal; report idle and let the loop check its flag
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::os::unix::net::UnixStream;
    use std::time::{Duration, Instant};

    #[test]
    fn test_idle_when_nothing_queued() {
        let (reader, _writer) = UnixStream::pair().unwrap();
        let watcher = InputWatcher::new(&reader);

        let start = Instant::now();
        assert!(!watcher.pending().unwrap());
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_pending_when_line_queued() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        writer.write_all(b"3\n").unwrap();

        let watcher = InputWatcher::new(&reader);
        assert!(watcher.pending().unwrap());
        // Still pending: the check must not consume anything
        assert!(watcher.pending().unwrap());

        let mut line = String::new();
        BufReader::new(&reader).read_line(&mut line).unwrap();
        assert_eq!(line, "3\n");
        assert!(!watcher.pending().unwrap());
    }

    #[test]
    fn test_wait_times_out_when_idle() {
        let (reader, _writer) = UnixStream::pair().unwrap();
        let watcher = InputWatcher::new(&reader);

        let start = Instant::now();
        assert!(!watcher.wait(PollTimeout::from(20u8)).unwrap());
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_closed_input_reads_as_ready() {
        let (reader, writer) = UnixStream::pair().unwrap();
        drop(writer);
        assert!(InputWatcher::new(&reader).pending().unwrap());
    }
}
