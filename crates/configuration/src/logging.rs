use crate::settings::{LogFormat, LoggingSettings};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, fmt::MakeWriter};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. When a log directory is set the
/// returned guard must be kept alive for buffered lines to be flushed.
pub fn init_tracing(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let (installed, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (install(settings.format, filter, writer, false), Some(guard))
        }
        None => (install(settings.format, filter, std::io::stdout, true), None),
    };
    if !installed {
        tracing::warn!("A tracing subscriber is already installed; keeping it");
    }
    guard
}

fn install<W>(format: LogFormat, filter: EnvFilter, writer: W, ansi: bool) -> bool
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = fmt().with_env_filter(filter).with_writer(writer).with_ansi(ansi);
    let result = match format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    result.is_ok()
}
