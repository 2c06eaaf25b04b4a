use crate::modules::logger::{validate_log_level, LocalTimer};
use crate::modules::settings::cli::SETTINGS;
use std::sync::OnceLock;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

pub static LOG_WORKER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug)]
pub enum FileLoggerError {
    Appender(tracing_appender::rolling::InitError),
    Subscriber(tracing::dispatcher::SetGlobalDefaultError),
}

pub fn setup_file_logger() -> Result<(), FileLoggerError> {
    let level = validate_log_level(&SETTINGS.relay_log_level);
    let with_ansi = SETTINGS.relay_ansi_logs;

    let (server_nonb, server_guard) = server_log_writer().map_err(FileLoggerError::Appender)?;
    // The guard flushes buffered lines on drop, so it must live for the whole process.
    let _ = LOG_WORKER_GUARD.set(server_guard);

    let server_layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_ansi(with_ansi)
        .with_level(true)
        .with_writer(server_nonb)
        .with_target(true);

    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(server_layer);

    tracing::subscriber::set_global_default(subscriber).map_err(FileLoggerError::Subscriber)
}

fn server_log_writer() -> Result<(NonBlocking, WorkerGuard), tracing_appender::rolling::InitError>
{
    let rolling = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("inbound-relay")
        .filename_suffix("log")
        .max_log_files(SETTINGS.relay_max_server_log_files)
        .build(&SETTINGS.relay_log_dir)?;
    Ok(tracing_appender::non_blocking(rolling))
}
