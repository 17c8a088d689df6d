//! Motion mode logger library
//!
//! Logs orientation and acceleration samples from a Sense HAT style motion
//! sensor into one CSV file per session, tagging every row with the capture
//! mode the operator selected. The current mode is shown on the 8x8 LED
//! matrix and can be changed at any time by typing its number, without
//! pausing sampling.
//!
//! # Quick Start
//!
//! ```no_run
//! use motion_mode_logger::{
//!     Console, FramebufferMatrix, IioMotionSensor, RecordWriter, SampleLogger, Session,
//! };
//! use std::io::{self, BufReader};
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! let sensor = IioMotionSensor::find("/sys/bus/iio/devices")?;
//! let matrix = FramebufferMatrix::open("/dev/fb1")?;
//! // Cleared by the Ctrl+C handler
//! let running = Arc::new(AtomicBool::new(true));
//! let mut console =
//!     Console::new(BufReader::new(io::stdin()), io::stdout()).with_interrupt(running.clone());
//!
//! let mode = console.select_mode()?;
//! let session = Session::start("Alice".to_string(), "log")?;
//! session.prepare_log_dir()?;
//! let records = RecordWriter::create(session.record_path())?;
//!
//! let mut logger = SampleLogger::new(session, mode, sensor, matrix, records);
//! logger.run(&mut console, &running)?;
//! # Ok::<(), motion_mode_logger::LoggerError>(())
//! ```

pub mod common;
pub mod console;
pub mod display;
pub mod error;
pub mod input;
pub mod logger;
pub mod mode;
pub mod pattern;
pub mod record;
pub mod sensor;
pub mod session;

// Re-export public API
pub use common::TimeKeeper;
pub use console::Console;
pub use display::{BlankOnDrop, FramebufferMatrix, LedMatrix};
pub use error::{LoggerError, Result};
pub use input::InputWatcher;
pub use logger::{ModePoll, ModeSource, RunSummary, SampleLogger, SensorFailurePolicy, Tick};
pub use mode::{Mode, ModeSelector};
pub use pattern::{pattern_for, Pattern, Rgb};
pub use record::{RecordWriter, SampleRecord, CSV_HEADER};
pub use sensor::{Acceleration, IioMotionSensor, MotionSensor, Orientation};
pub use session::{NamePrompt, Session, DEFAULT_LOG_DIR};
