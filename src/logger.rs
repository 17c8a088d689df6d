//! Sampling loop
//!
//! [`SampleLogger`] owns the devices and the record store for one session.
//! Each [`tick`](SampleLogger::tick) does exactly one thing: either it takes a
//! new mode from the operator, or it renders the current mode and appends one
//! sensor sample. [`run`](SampleLogger::run) repeats ticks with no delay until
//! the shared `running` flag is cleared.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;

use crate::common::row_timestamp;
use crate::display::{BlankOnDrop, LedMatrix};
use crate::error::Result;
use crate::mode::Mode;
use crate::pattern;
use crate::record::{RecordWriter, SampleRecord};
use crate::sensor::{Acceleration, MotionSensor, Orientation};
use crate::session::Session;

/// Answer from a [`ModeSource`] for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModePoll {
    /// Nothing was typed
    Idle,
    /// Operator entered a new mode
    Changed(Mode),
    /// Prompt given up because the run is stopping
    Interrupted,
}

/// Source of mode changes requested during sampling
pub trait ModeSource {
    /// Report a new mode if the operator entered one, without blocking when
    /// nothing was typed
    fn poll_mode(&mut self) -> Result<ModePoll>;
}

/// What to do when a sensor read fails mid-session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorFailurePolicy {
    /// Stop the run and report the error
    #[default]
    Abort,
    /// Log the error and move on to the next tick
    Skip,
}

/// Outcome of one loop iteration
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Operator switched modes; no sample was taken
    ModeChanged(Mode),
    /// One record was appended
    Sampled(SampleRecord),
    /// Sensor read failed and was skipped
    Skipped,
    /// Shutdown requested while waiting on the mode prompt; no sample was taken
    Interrupted,
}

/// Counters reported when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunSummary {
    pub rows: u64,
    pub mode_switches: u64,
    pub skipped: u64,
    pub elapsed_secs: f64,
}

/// Drives one logging session
pub struct SampleLogger<S, D: LedMatrix, W: Write> {
    session: Session,
    mode: Mode,
    sensor: S,
    display: BlankOnDrop<D>,
    records: RecordWriter<W>,
    policy: SensorFailurePolicy,
    echo: bool,
    mode_switches: u64,
    skipped: u64,
}

impl<S: MotionSensor, D: LedMatrix, W: Write> SampleLogger<S, D, W> {
    /// Take ownership of the devices for a session
    ///
    /// The display is cleared when the logger is dropped.
    pub fn new(
        session: Session,
        mode: Mode,
        sensor: S,
        display: D,
        records: RecordWriter<W>,
    ) -> Self {
        Self {
            session,
            mode,
            sensor,
            display: BlankOnDrop::new(display),
            records,
            policy: SensorFailurePolicy::default(),
            echo: false,
            mode_switches: 0,
            skipped: 0,
        }
    }

    pub fn with_failure_policy(mut self, policy: SensorFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Print every record to stdout as it is written
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one loop iteration
    pub fn tick<I: ModeSource + ?Sized>(&mut self, input: &mut I) -> Result<Tick> {
        match input.poll_mode()? {
            ModePoll::Idle => {}
            ModePoll::Changed(mode) => {
                log::info!("Mode changed: {} -> {}", self.mode, mode);
                self.mode = mode;
                self.mode_switches += 1;
                return Ok(Tick::ModeChanged(mode));
            }
            ModePoll::Interrupted => return Ok(Tick::Interrupted),
        }

        pattern::render(&mut self.display, self.mode)?;

        let (orientation, acceleration) = match self.read_sensor() {
            Ok(sample) => sample,
            Err(e) if self.policy == SensorFailurePolicy::Skip => {
                log::warn!("Skipping sample: {}", e);
                self.skipped += 1;
                return Ok(Tick::Skipped);
            }
            Err(e) => return Err(e),
        };

        let record = SampleRecord {
            orientation,
            acceleration,
            timestamp: row_timestamp(&Local::now()),
            runtime: self.session.runtime(),
            mode: self.mode,
            name: self.session.operator().to_string(),
        };
        self.records.append(&record)?;

        if self.echo {
            println!("{}", record.fields().join("  "));
        }
        log::trace!("Row {} written at {:.3}s", self.records.rows(), record.runtime);

        Ok(Tick::Sampled(record))
    }

    /// Tick until `running` is cleared
    pub fn run<I: ModeSource + ?Sized>(
        &mut self,
        input: &mut I,
        running: &AtomicBool,
    ) -> Result<RunSummary> {
        while running.load(Ordering::SeqCst) {
            if self.tick(input)? == Tick::Interrupted {
                break;
            }
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            rows: self.records.rows(),
            mode_switches: self.mode_switches,
            skipped: self.skipped,
            elapsed_secs: self.session.runtime(),
        }
    }

    /// Clear the display and hand back the record store for closing
    pub fn finish(mut self) -> Result<(RunSummary, RecordWriter<W>)> {
        self.display.clear()?;
        let summary = self.summary();
        Ok((summary, self.records))
    }

    /// Orientation then acceleration; nothing is kept if either read fails
    fn read_sensor(&mut self) -> Result<(Orientation, Acceleration)> {
        let orientation = self.sensor.orientation_degrees()?;
        let acceleration = self.sensor.accelerometer_raw()?;
        Ok((orientation, acceleration))
    }
}
