//! Record writers: the backends a finalized [`Record`] is handed to.

use std::fmt::{self, Write as _};
use std::io::Write;
use std::sync::Arc;

use time::macros::format_description;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::Target;
use crate::{Level, LogConfig, Record, Value};

/// Destination of finalized records.
///
/// Writers are shared by every event of a registry and must serialize their
/// own output. Write failures are reported via `tracing` and dropped.
pub trait RecordWriter: Send + Sync {
    fn write(&self, record: &Record);
}

/// One JSON object per line.
pub struct JsonWriter {
    make_writer: BoxMakeWriter,
}

impl JsonWriter {
    pub fn new<M>(make_writer: M) -> Self
    where
        M: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Self {
            make_writer: BoxMakeWriter::new(make_writer),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout)
    }
}

impl RecordWriter for JsonWriter {
    fn write(&self, record: &Record) {
        let mut line = match serde_json::to_vec(record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "could not encode log record");
                return;
            }
        };
        line.push(b'\n');

        let mut out = self.make_writer.make_writer();
        if let Err(e) = out.write_all(&line) {
            tracing::warn!(error = %e, "could not write log record");
        }
    }
}

impl fmt::Debug for JsonWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonWriter").finish_non_exhaustive()
    }
}

/// Human-readable console output: `3:04PM INF message key=value`.
pub struct PrettyWriter {
    make_writer: BoxMakeWriter,
}

impl PrettyWriter {
    pub fn new<M>(make_writer: M) -> Self
    where
        M: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Self {
            make_writer: BoxMakeWriter::new(make_writer),
        }
    }

    pub fn stderr() -> Self {
        Self::new(std::io::stderr)
    }
}

impl RecordWriter for PrettyWriter {
    fn write(&self, record: &Record) {
        let mut line = render_pretty(record);
        line.push('\n');

        let mut out = self.make_writer.make_writer();
        if let Err(e) = out.write_all(line.as_bytes()) {
            tracing::warn!(error = %e, "could not write log record");
        }
    }
}

impl fmt::Debug for PrettyWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrettyWriter").finish_non_exhaustive()
    }
}

fn render_pretty(record: &Record) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(record.fields.len() + 3);

    if let Some(time) = &record.time {
        let kitchen = format_description!("[hour repr:12 padding:none]:[minute][period]");
        parts.push(time.format(kitchen).unwrap_or_else(|_| time.to_string()));
    }
    parts.push(record.level.short().to_string());
    if let Some(message) = record.message() {
        if !message.is_empty() {
            parts.push(message.to_string());
        }
    }
    parts.push(render_pairs(record));

    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// `key=value` pairs in insertion order. Values containing whitespace or
/// quotes are quoted.
pub(crate) fn render_pairs(record: &Record) -> String {
    let mut out = String::new();
    for (key, value) in &record.fields {
        if !out.is_empty() {
            out.push(' ');
        }
        let text = value.to_string();
        let needs_quotes = text.is_empty()
            || text.chars().any(|c| c.is_whitespace() || c == '"' || c == '=');
        let _ = if needs_quotes && !matches!(value, Value::Array(_) | Value::Object(_)) {
            write!(out, "{key}={text:?}")
        } else {
            write!(out, "{key}={text}")
        };
    }
    out
}

/// Forwards records to the `tracing` dispatcher.
///
/// Fields are rendered into a single `fields` value; the record message is
/// the event message.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWriter;

impl RecordWriter for TracingWriter {
    fn write(&self, record: &Record) {
        let fields = render_pairs(record);
        let message = record.message().unwrap_or_default();
        match record.level {
            Level::Debug => tracing::debug!(target: "ctxlog", fields = %fields, "{message}"),
            Level::Info => tracing::info!(target: "ctxlog", fields = %fields, "{message}"),
            Level::Warn => tracing::warn!(target: "ctxlog", fields = %fields, "{message}"),
            Level::Error => tracing::error!(target: "ctxlog", fields = %fields, "{message}"),
        }
    }
}

/// Builds the writer described by `config`.
///
/// Without an explicit target, pretty mode writes human-readable lines to
/// stderr and structured mode writes JSON to stdout.
pub fn from_config(config: &LogConfig, pretty: bool) -> crate::Result<Arc<dyn RecordWriter>> {
    let writer: Arc<dyn RecordWriter> = match (&config.target, pretty) {
        (None, true) => Arc::new(PrettyWriter::stderr()),
        (None, false) => Arc::new(JsonWriter::stdout()),
        (Some(Target::Stdout), true) => Arc::new(PrettyWriter::new(std::io::stdout)),
        (Some(Target::Stdout), false) => Arc::new(JsonWriter::stdout()),
        (Some(Target::Stderr), true) => Arc::new(PrettyWriter::stderr()),
        (Some(Target::Stderr), false) => Arc::new(JsonWriter::new(std::io::stderr)),
        (Some(Target::Tracing), _) => Arc::new(TracingWriter),
        #[cfg(feature = "file")]
        (Some(Target::File { path }), pretty) => {
            let appender = file_appender(path)?;
            if pretty {
                Arc::new(PrettyWriter::new(appender))
            } else {
                Arc::new(JsonWriter::new(appender))
            }
        }
    };
    Ok(writer)
}

#[cfg(feature = "file")]
fn file_appender(
    path: &std::path::Path,
) -> crate::Result<tracing_appender::rolling::RollingFileAppender> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    let file_name = path
        .file_name()
        .ok_or_else(|| crate::Error::Config(format!("invalid log file path: {}", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };

    std::fs::create_dir_all(&dir)?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| crate::Error::Io(std::io::Error::other(e)))
}
