use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Sets up the keeper logger on stdout.
///
/// # Arguments
/// * `debug` - Log at `Debug` regardless of `RUST_LOG`
///
/// # Returns
/// * `Result<()>` - Success or failure of logger setup
///
/// # Errors
/// * If a logger has already been installed
pub fn setup_logger(debug: bool) -> Result<()> {
    Dispatch::new()
        .level(log_level(debug, std::env::var("RUST_LOG").ok().as_deref()))
        // Configure logging to console
        .chain(std::io::stdout())
        // Format log messages with time and log level
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ));
        })
        .apply()?;
    Ok(())
}

/// `Debug` when asked for, else the level named by `rust_log`, else `Info`.
fn log_level(debug: bool, rust_log: Option<&str>) -> LevelFilter {
    if debug {
        return LevelFilter::Debug;
    }
    rust_log
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}
