use crate::config::Config;
use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    layer::SubscriberExt,
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "deviantart-downloader.log";

/// Try to setup a logger.
///
/// Logs go to the stderr and to a daily log file in the config's log dir.
/// The returned guard must be held until shutdown, or buffered file logs are lost.
pub fn setup(config: &Config) -> anyhow::Result<WorkerGuard> {
    tracing_log::LogTracer::init().context("failed to init log tracer")?;

    let file_appender = tracing_appender::rolling::daily(config.log_dir(), LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
    });
    let stderr_formatting_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let file_formatting_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(file_formatting_layer)
        .with(stderr_formatting_layer);

    tracing::subscriber::set_global_default(subscriber).context("failed to set subscriber")?;

    Ok(guard)
}
