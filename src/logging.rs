//! Logger set-up.

use std::path::Path;

use log::LevelFilter;

use crate::error::{Error, Result};

/// Overrides the configured level, e.g. `MESHFLY_LOG=debug`.
pub const LEVEL_ENV: &str = "MESHFLY_LOG";

const FALLBACK_LEVEL: LevelFilter = LevelFilter::Info;

/// Installs the global logger: timestamped lines on stderr, and to `file` if given.
///
/// `configured` is the level name from the configuration; [`LEVEL_ENV`] wins
/// over it when set.
pub fn init(configured: &str, file: Option<&Path>) -> Result<()> {
    let env = std::env::var(LEVEL_ENV).ok();
    let (level, rejected) = resolve_level(configured, env.as_deref());

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(path) = file {
        let log_file = fern::log_file(path).map_err(|e| Error::io(path, e))?;
        dispatch = dispatch.chain(log_file);
    }

    dispatch.apply()?;
    for (source, value) in rejected {
        log::warn!("Unknown log level '{value}' from {source}, ignoring it");
    }
    log::debug!("Logging at {level}");
    Ok(())
}

/// Picks the level from the environment, then the configuration, then `info`.
///
/// Also returns the values that were set but did not name a level, with where
/// they came from.
fn resolve_level<'a>(
    configured: &'a str,
    env: Option<&'a str>,
) -> (LevelFilter, Vec<(&'static str, &'a str)>) {
    let mut rejected = Vec::new();
    let candidates = [(LEVEL_ENV, env), ("log_level", Some(configured))];
    for (source, value) in candidates {
        let Some(value) = value else {
            continue;
        };
        match value.parse() {
            Ok(level) => return (level, rejected),
            Err(_) => rejected.push((source, value)),
        }
    }
    (FALLBACK_LEVEL, rejected)
}
