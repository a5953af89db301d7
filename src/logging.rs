use anyhow::{Context, Result};
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;

/// Size at which the log file is rotated
pub const LOG_FILE_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Number of rotated files kept next to the active one
pub const LOG_FILE_BACKUPS: usize = 2;

/// `2025-03-01 10:00:00,123 - INFO - message`
struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now();
        write!(
            writer,
            "{} - {} - ",
            now.format("%Y-%m-%d %H:%M:%S,%3f"),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Logger for a single job run: a rotating file sink plus a console sink.
///
/// Components never reach for a global subscriber; the driver runs inside
/// [`JobLogger::dispatch`]. Building a new `JobLogger` replaces the sinks
/// wholesale, so initialising twice never duplicates lines.
pub struct JobLogger {
    dispatch: Dispatch,
}

impl JobLogger {
    /// Log to `log_path` (5 MiB per file, 2 backups) and to stdout
    pub fn init(log_path: impl AsRef<Path>) -> Result<Self> {
        let file = rotating_file(log_path.as_ref(), LOG_FILE_MAX_BYTES, LOG_FILE_BACKUPS)?;
        Ok(Self::with_sinks(Mutex::new(file), std::io::stdout))
    }

    /// Build a logger over arbitrary writers, both at INFO with the same line format
    pub fn with_sinks<F, C>(file: F, console: C) -> Self
    where
        F: for<'w> MakeWriter<'w> + Send + Sync + 'static,
        C: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_ansi(false)
            .with_writer(file);
        let console_layer = tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_writer(console);

        let subscriber = Registry::default()
            .with(LevelFilter::INFO)
            .with(file_layer)
            .with(console_layer);

        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

fn rotating_file(path: &Path, max_bytes: usize, backups: usize) -> Result<FileRotate<AppendCount>> {
    if path.as_os_str().is_empty() {
        anyhow::bail!("LOG_FILEPATH is not set");
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    // Each formatted event is a single write, so rotating only after the
    // limit is passed keeps every record whole in one file
    Ok(FileRotate::new(
        path,
        AppendCount::new(backups),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    ))
}
