use std::env;

use chrono::Local;
use log::LevelFilter;

/// Level from `LOG_LEVEL`, falling back to info so progress lines are shown.
pub fn level_from_env() -> LevelFilter {
    match env::var("LOG_LEVEL").as_deref() {
        Ok("debug") => LevelFilter::Debug,
        Ok("info") => LevelFilter::Info,
        Ok("warn") => LevelFilter::Warn,
        Ok("error") => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Installs the global logger. `level` overrides `LOG_LEVEL` when given.
pub fn setup_logging(level: Option<LevelFilter>) -> Result<(), fern::InitError> {
    let level = level.unwrap_or_else(level_from_env);

    let stderr_config = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} - {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ))
        })
        .level(level)
        // Dependencies are noisy at debug level
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(std::io::stderr());

    fern::Dispatch::new().chain(stderr_config).apply()?;

    Ok(())
}
