//! ifbar - terminal bandwidth monitor.
//!
//! Usage:
//!   ifbar eth0            # chart eth0, starting with received bytes
//!   ifbar -v wlan0        # same, with debug logging on stderr
//!
//! Keys: `r` received, `t` transmitted, return redraws, Ctrl+C quits.

use std::fs::OpenOptions;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{Level, debug, error};
use tracing_subscriber::EnvFilter;

use ifbar::app::{self, AppError, Config};
use ifbar::interrupt::InterruptFlag;

/// Live bar chart of a network interface's throughput.
#[derive(Parser)]
#[command(name = "ifbar", about = "Network interface bandwidth monitor", version)]
struct Args {
    /// Interface to monitor, e.g. eth0.
    #[arg(value_name = "INTERFACE")]
    interface: String,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Path to /sys filesystem (for testing/mocking).
    #[arg(long, default_value = "/sys")]
    sys_path: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,

    /// Append log records to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<String>,
}

/// Initializes the tracing subscriber.
/// Defaults to WARN since stderr shares the terminal with the chart.
fn init_logging(verbose: u8, quiet: bool, log_file: Option<&str>) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("ifbar={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file.map(|path| OpenOptions::new().create(true).append(true).open(path)) {
        Some(Ok(file)) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        Some(Err(e)) => {
            builder.init();
            error!("Cannot open log file, logging to stderr: {}", e);
        }
        None => builder.init(),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet, args.log_file.as_deref());

    let config = Config {
        interface: args.interface,
        proc_path: args.proc_path,
        sys_path: args.sys_path,
    };

    let interrupt = match InterruptFlag::install() {
        Ok(flag) => flag,
        Err(e) => {
            eprintln!("Error: {}", AppError::from(e));
            return ExitCode::FAILURE;
        }
    };

    // Guards restore the terminal while unwinding; keep the panic text out of
    // the raw-mode screen and in the log instead.
    panic::set_hook(Box::new(|info| debug!("panic: {}", info)));

    match panic::catch_unwind(AssertUnwindSafe(|| app::run(&config, &interrupt))) {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Err(_) => {
            eprintln!("Error: unexpected internal failure");
            ExitCode::FAILURE
        }
    }
}
