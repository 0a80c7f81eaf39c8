use anyhow::{Context, Result};
use log::LevelFilter;
use std::io::Write;

/// Map the `-v` count to the crate's log level
#[must_use]
pub const fn level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialize the logger.
///
/// `RUST_LOG` is read first; `verbosity` then sets this crate's level and
/// rustls is held at warn.
///
/// # Errors
///
/// Returns an error if a logger is already installed
pub fn init(verbosity: u8) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_module(env!("CARGO_CRATE_NAME"), level(verbosity));
    builder.filter_module("rustls", LevelFilter::Warn);

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} {} {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    builder.try_init().context("failed to initialize logger")
}
