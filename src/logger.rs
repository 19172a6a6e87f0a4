//! Logging initialisation via tracing-subscriber.
//!
//! Each process run appends to one file named after the moment the sink was
//! opened, e.g. `logs/12_01_2025_14_55_30.log`. Every record is one line:
//!
//! ```text
//! [2025-12-01 14:55:30,123] INFO - Divided by zero error occurred
//! ```
//!
//! Call [`init`] once at startup to install the process-wide sink. Components
//! that want an explicit sink take a [`LogSink`] and run under
//! [`LogSink::in_scope`].

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use chrono::{Local, NaiveDateTime};
use tracing::{Dispatch, Event, Level, Subscriber, level_filters::LevelFilter};
use tracing_subscriber::{
    EnvFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    registry::LookupSpan,
};

use crate::{config::LogConfig, error::AppError};

const FILE_NAME_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

static SINK: OnceLock<LogSink> = OnceLock::new();

/// An open log file plus the subscriber that writes to it.
pub struct LogSink {
    path: PathBuf,
    level: String,
    dispatch: Dispatch,
}

impl LogSink {
    /// Create the log directory, open a fresh timestamped file for append and
    /// build a subscriber writing to it. Nothing is installed globally.
    pub fn open(config: &LogConfig) -> Result<Self, AppError> {
        let filter = EnvFilter::try_new(&config.level)
            .map_err(|e| AppError::Logger(format!("invalid log level '{}': {e}", config.level)))?;

        fs::create_dir_all(&config.dir).map_err(|e| {
            AppError::Logger(format!(
                "cannot create log dir '{}': {e}",
                config.dir.display()
            ))
        })?;

        let path = config
            .dir
            .join(log_file_name(Local::now().naive_local()));
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                AppError::Logger(format!(
                    "failed to open log file '{}': {e}",
                    path.display()
                ))
            })?;

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .event_format(RecordFormat)
            .with_writer(Mutex::new(file))
            .finish();

        Ok(Self {
            path,
            level: config.level.clone(),
            dispatch: Dispatch::new(subscriber),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this sink as the thread's default subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink")
            .field("path", &self.path)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Initialise the process-wide sink and install it as the global subscriber.
///
/// Only the first call opens a file. Later calls return the sink from the
/// first call and ignore `config`. Fails without touching disk when some
/// other global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<&'static LogSink, AppError> {
    if let Some(sink) = SINK.get() {
        return Ok(sink);
    }

    // Checked before opening so a refused init leaves no file behind.
    if tracing::dispatcher::has_been_set() {
        return Err(AppError::Logger(
            "failed to set subscriber: a global subscriber is already installed".into(),
        ));
    }

    let sink = LogSink::open(config)?;
    tracing::dispatcher::set_global_default(sink.dispatch.clone())
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(SINK.get_or_init(|| sink))
}

/// The process-wide sink, if [`init`] has run.
pub fn sink() -> Option<&'static LogSink> {
    SINK.get()
}

/// File name for a sink opened at `at`: `MM_DD_YYYY_HH_MM_SS.log`.
pub fn log_file_name(at: NaiveDateTime) -> String {
    format!("{}.log", at.format(FILE_NAME_FORMAT))
}

/// Severity label written into each record.
pub fn severity_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

/// Everything in a record before the message: `[timestamp] SEVERITY - `.
pub fn record_prefix(at: NaiveDateTime, level: &Level) -> String {
    format!(
        "[{}] {} - ",
        at.format(TIMESTAMP_FORMAT),
        severity_name(level)
    )
}

/// Parse a log level string into a [`LevelFilter`], returning an error on
/// unrecognised values. Useful for validating config before opening a sink.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}

/// `[timestamp] SEVERITY - message key=value ...`
struct RecordFormat;

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let prefix = record_prefix(Local::now().naive_local(), event.metadata().level());
        writer.write_str(&prefix)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
