//! Logging setup with `tracing-subscriber`
//!
//! `RUST_LOG` wins when set (e.g. `RUST_LOG=pws=trace`). Otherwise `--verbose`
//! selects `debug` and the default is `warn`. Output goes to stderr so
//! command output on stdout stays pipeable.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging for the CLI
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // try_init so a second call (tests, embedding) is a no-op
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .try_init();
}

/// Initialize logging for tests, captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
