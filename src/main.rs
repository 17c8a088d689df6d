//! Motion logger - records Sense HAT motion into per-session CSV files
//!
//! Prompts for the operator's name and a capture mode, then samples the
//! sensor as fast as it answers until Ctrl+C. Typing a mode number and ENTER
//! at any time switches the mode shown on the LED matrix and written to
//! subsequent rows.
//!
//! Usage:
//!   motion-logger --log-dir log

use clap::Parser;
use motion_mode_logger::{
    Console, FramebufferMatrix, IioMotionSensor, LedMatrix, NamePrompt, RecordWriter,
    SampleLogger, SensorFailurePolicy, Session, DEFAULT_LOG_DIR,
};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "motion-logger")]
#[command(about = "Log Sense HAT orientation and acceleration per capture mode", long_about = None)]
struct Args {
    /// Directory for record files (created if missing)
    #[arg(short, long, default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// LED matrix framebuffer device (auto-detected if omitted)
    #[arg(short, long)]
    framebuffer: Option<PathBuf>,

    /// IIO sysfs device directory
    #[arg(long, default_value = "/sys/bus/iio/devices")]
    iio_root: PathBuf,

    /// Do not echo each sample to the console
    #[arg(short, long)]
    quiet: bool,

    /// Log and skip failed sensor reads instead of stopping
    #[arg(long)]
    skip_sensor_errors: bool,
}

fn open_matrix(args: &Args) -> motion_mode_logger::Result<Box<dyn LedMatrix>> {
    let matrix = match &args.framebuffer {
        Some(path) => FramebufferMatrix::open(path)?,
        None => FramebufferMatrix::find("/sys/class/graphics", "/dev")?,
    };
    log::info!("LED matrix: {}", matrix.path().display());
    Ok(Box::new(matrix))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Motion Logger");
    println!("=============");

    // Open devices before prompting so a missing Sense HAT fails fast
    let sensor = IioMotionSensor::find(&args.iio_root)?;
    let matrix = open_matrix(&args)?;

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let sampling = Arc::new(AtomicBool::new(false));
    {
        let running = running.clone();
        let sampling = sampling.clone();
        ctrlc::set_handler(move || {
            println!("\nReceived Ctrl+C, stopping...");
            if !sampling.load(Ordering::SeqCst) {
                // Nothing opened yet: no file, matrix untouched
                println!("Exiting logger");
                std::process::exit(0);
            }
            running.store(false, Ordering::SeqCst);
        })?;
    }

    let mut input = BufReader::new(io::stdin());
    let name = NamePrompt::new(&mut input, io::stdout()).ask()?;
    let mut console = Console::new(input, io::stdout()).with_interrupt(running.clone());
    let mode = console.select_mode()?;

    let session = Session::start(name, &args.log_dir)?;
    session.prepare_log_dir()?;
    let records = RecordWriter::create(session.record_path())?;
    let record_path = session.record_path().to_path_buf();
    log::info!("Logging to {}", record_path.display());

    let policy = if args.skip_sensor_errors {
        SensorFailurePolicy::Skip
    } else {
        SensorFailurePolicy::Abort
    };
    let mut logger = SampleLogger::new(session, mode, sensor, matrix, records)
        .with_failure_policy(policy)
        .with_echo(!args.quiet);

    println!("Sampling in mode '{}'. Type a mode number and ENTER to switch, Ctrl+C to stop.", mode);
    sampling.store(true, Ordering::SeqCst);

    if let Err(e) = logger.run(&mut console, &running) {
        eprintln!("\nError during logging: {}", e);
        // Dropping the logger blanks the matrix and flushes written rows
        return Err(Box::new(e));
    }

    log::info!(
        "Session of {} ended in mode '{}'",
        logger.session().operator(),
        logger.mode()
    );
    let (summary, records) = logger.finish()?;
    records.finish()?;

    log::info!(
        "{} rows, {} mode switches, {} skipped samples in {:.1}s",
        summary.rows,
        summary.mode_switches,
        summary.skipped,
        summary.elapsed_secs
    );
    log::info!("Records saved to {}", record_path.display());
    println!("Exiting logger");

    Ok(())
}
