//! Diagnostics go through `tracing` to stderr; user-facing progress lines go
//! to stdout so they interleave naturally with the compose runtime's output.

use chrono::Local;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

pub const LOG_VAR: &str = "STACKS_LOG";

/// Install the global subscriber. `STACKS_LOG` wins over the verbosity flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    let fallback = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%H:%M:%S".to_string()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn progress(message: &str) {
    let now = Local::now().format("%H:%M:%S");
    println!("[{now}] ==> {message}");
}

/// Failures the user must see whatever the log filter says.
pub fn report(message: &str) {
    let now = Local::now().format("%H:%M:%S");
    eprintln!("[{now}] !! {message}");
}
