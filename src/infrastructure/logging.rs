use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use std::env;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "boilerplate=debug,tower_http=debug";
const LOG_FILE: &str = "app.log";
const KEPT_LOG_FILES: usize = 14;
const MAX_LOG_FILE_BYTES: u64 = 20 * 1024 * 1024;

/// `log_dir/app.log`, rolled over daily or once it reaches `max_bytes`.
/// Rolled files are `app.log.1` (newest) up to `app.log.14`.
pub fn file_appender(log_dir: &str, max_bytes: u64) -> anyhow::Result<BasicRollingFileAppender> {
    std::fs::create_dir_all(log_dir)?;
    let condition = RollingConditionBasic::new().daily().max_size(max_bytes);
    let appender =
        BasicRollingFileAppender::new(Path::new(log_dir).join(LOG_FILE), condition, KEPT_LOG_FILES)?;
    Ok(appender)
}

/// Console plus a size- and day-bounded log file under `log_dir`.
///
/// The returned guard flushes the file writer on drop and must live as long
/// as the process logs. Initializing twice keeps the first subscriber.
pub fn init(log_dir: &str) -> anyhow::Result<WorkerGuard> {
    let (file_writer, guard) =
        tracing_appender::non_blocking(file_appender(log_dir, MAX_LOG_FILE_BYTES)?);

    let filter = EnvFilter::new(env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.into()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init();

    Ok(guard)
}
