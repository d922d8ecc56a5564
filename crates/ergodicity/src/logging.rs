use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name used inside `--log-dir`
pub const LOG_FILE_NAME: &str = "ergodicity.log";

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub fn default_filter(level: &str) -> String {
    format!("ergodicity={level},ergodicity_core=warn")
}

/// Initialize logging.
///
/// Without a log directory events go to stderr so they never mix with report
/// output on stdout. With one, they are appended to `{log_dir}/ergodicity.log`
/// through a non-blocking writer; keep the returned guard alive until exit so
/// buffered lines are flushed. `RUST_LOG` overrides `level`.
pub fn init_logging(log_dir: Option<&Path>, level: &str) -> color_eyre::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();

    tracing::info!(
        "logging initialized (log_path={})",
        dir.join(LOG_FILE_NAME).display()
    );
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_core() {
        assert_eq!(default_filter("debug"), "ergodicity=debug,ergodicity_core=warn");
        assert!(EnvFilter::try_new(default_filter("info")).is_ok());
    }
}
