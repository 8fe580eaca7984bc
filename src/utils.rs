use std::process;
use std::time::Duration;

use getopts::Options;
use tracing_subscriber::EnvFilter;

pub fn to_millis(duration: Duration) -> u64 {
    (duration.as_secs() * 1_000) + (duration.subsec_nanos() / 1_000_000) as u64
}

/// Logs to stderr, so that stdout only carries results. The filter is read from `RUST_LOG` and
/// defaults to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn usage(program: &str, opts: &Options) -> String {
    opts.usage(&format!("Usage: {} [options]", program))
}

/// Prints the usage of a command-line tool to stderr and exits, with status 2 if there is a hint
/// about what went wrong and 0 otherwise.
pub fn print_usage_and_exit(program: &str, opts: Options, hint: Option<&str>) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    eprint!("{}", usage(program, &opts));
    process::exit(if hint.is_some() { 2 } else { 0 });
}
