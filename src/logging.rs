//! Logging setup
//!
//! Every module logs through the `log` macros. The binary installs
//! `env_logger`, filtered at `info` by default or `debug` with `--debug`.
//! `RUST_LOG` always takes precedence, e.g. `RUST_LOG=winwrap::background=trace`.

use anyhow::{Context, Result};
use std::io::Write;

/// Default filter when `RUST_LOG` is not set
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global logger. Fails if a logger is already installed.
pub fn init_logging(debug: bool) -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter(debug)))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
        .context("Failed to initialize logger")
}
