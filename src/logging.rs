use std::path::PathBuf;
use std::time::SystemTime;

use color_eyre::Result;
use color_eyre::eyre::Context;
use fern::colors::{Color, ColoredLevelConfig};

/// Installs the global logger: colored console output at `console_level` and,
/// when `log_file` is set, a file sink at `file_level` in the
/// `<timestamp> <LEVEL>: <message> [in <file>:<line>]` format.
pub fn setup_logging(
    console_level: log::LevelFilter,
    log_file: Option<PathBuf>,
    file_level: log::LevelFilter,
) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    let console = fern::Dispatch::new()
        .level(console_level)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} {:<5} {}: {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(log::LevelFilter::Trace)
        .level_for("sqlx", log::LevelFilter::Warn)
        .level_for("sea_orm", log::LevelFilter::Info)
        .level_for("hyper", log::LevelFilter::Info)
        .chain(console);

    if let Some(path) = log_file {
        let file = fern::log_file(&path)
            .wrap_err_with(|| format!("Failed to open log file: {}", path.display()))?;
        let file_sink = fern::Dispatch::new()
            .level(file_level)
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} {}: {} [in {}:{}]",
                    humantime::format_rfc3339_seconds(SystemTime::now()),
                    record.level(),
                    message,
                    record.file().unwrap_or("<unknown>"),
                    record.line().unwrap_or(0)
                ))
            })
            .chain(file);
        dispatch = dispatch.chain(file_sink);
    }

    dispatch.apply().wrap_err("Failed to install logger")?;
    Ok(())
}
