use color_eyre::Result;
use lazy_static::lazy_static;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config;

lazy_static! {
    pub static ref LOG_ENV: String = format!("{}_LOG_LEVEL", config::PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Log to a file in the data directory; the terminal belongs to the UI.
///
/// Filter directives come from `SCRIBE_LOG_LEVEL`, then `RUST_LOG`, then
/// default to `info`. The returned guard must live until shutdown so
/// buffered lines are flushed.
pub fn init() -> Result<WorkerGuard> {
    let directory = config::get_data_dir();
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::never(&directory, LOG_FILE.as_str());
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let builder = || EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
    let env_filter = builder()
        .with_env_var(LOG_ENV.as_str())
        .try_from_env()
        .or_else(|_| builder().from_env())?;

    let file_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(non_blocking)
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(guard)
}
