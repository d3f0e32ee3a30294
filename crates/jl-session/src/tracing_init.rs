use std::fmt::{self as stdfmt, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jl_config::{LogFormat, LoggingConfig};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::DefaultFields;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormattedFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

// ---------------------------------------------------------------------------
// FileFields: separate span field cache for the file layer
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FileFields(DefaultFields);

impl<'writer> fmt::FormatFields<'writer> for FileFields {
    fn format_fields<R: tracing_subscriber::field::RecordFields>(
        &self,
        writer: fmt::format::Writer<'writer>,
        fields: R,
    ) -> stdfmt::Result {
        self.0.format_fields(writer, fields)
    }
}

// ---------------------------------------------------------------------------
// DomainFormat
// ---------------------------------------------------------------------------

/// Plain-text formatter rendering the `domain` field as a `[domain]` prefix:
///
/// ```text
/// 2026-10-18T09:12:03Z  INFO [hist] snapshot recorded description="Add rule" total=4
/// ```
///
/// Events without a domain (the `log` records bridged from `jl-core`, or
/// dependencies) print their target instead.
struct DomainFormat {
    timer: SystemTime,
}

impl DomainFormat {
    fn new() -> Self {
        Self { timer: SystemTime }
    }
}

impl<S, N> FormatEvent<S, N> for DomainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> fmt::FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let ansi = writer.has_ansi_escapes();

        if ansi {
            write!(writer, "\x1b[2m")?;
        }
        if self.timer.format_time(&mut writer).is_err() {
            write!(writer, "<unknown time>")?;
        }
        if ansi {
            write!(writer, "\x1b[0m")?;
        }

        let level = *event.metadata().level();
        if ansi {
            write!(writer, " \x1b[{}m{level:>5}\x1b[0m ", level_color(level))?;
        } else {
            write!(writer, " {level:>5} ")?;
        }

        let mut visitor = DomainExtractor::default();
        event.record(&mut visitor);

        let prefix = visitor
            .domain
            .take()
            .unwrap_or_else(|| event.metadata().target().to_string());
        if ansi {
            write!(writer, "\x1b[1;36m[{prefix}]\x1b[0m ")?;
        } else {
            write!(writer, "[{prefix}] ")?;
        }

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}{{", span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>()
                    && !fields.is_empty()
                {
                    write!(writer, "{fields}")?;
                }
                write!(writer, "}}: ")?;
            }
        }

        write!(writer, "{}", visitor.message)?;
        if !visitor.other_fields.is_empty() {
            if ansi {
                write!(writer, " \x1b[3m{}\x1b[0m", visitor.other_fields)?;
            } else {
                write!(writer, " {}", visitor.other_fields)?;
            }
        }
        writeln!(writer)
    }
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "31",
        Level::WARN => "33",
        Level::INFO => "32",
        Level::DEBUG => "34",
        Level::TRACE => "35",
    }
}

// ---------------------------------------------------------------------------
// DomainExtractor
// ---------------------------------------------------------------------------

#[derive(Default)]
struct DomainExtractor {
    domain: Option<String>,
    message: String,
    other_fields: String,
}

impl DomainExtractor {
    fn push_field(&mut self, name: &str, value: impl stdfmt::Display) {
        if !self.other_fields.is_empty() {
            self.other_fields.push(' ');
        }
        write!(&mut self.other_fields, "{name}={value}").ok();
    }
}

impl Visit for DomainExtractor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "domain" => self.domain = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => self.push_field(name, format_args!("{value:?}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        match field.name() {
            "domain" => {
                let s = format!("{value:?}");
                self.domain = Some(s.trim_matches('"').to_string());
            }
            "message" => {
                write!(&mut self.message, "{value:?}").ok();
            }
            name => self.push_field(name, format_args!("{value:?}")),
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field.name(), value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push_field(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field.name(), value);
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Install the global `tracing` subscriber described by [`LoggingConfig`].
///
/// The returned [`WorkerGuard`] flushes the log file when dropped; hold it
/// for the lifetime of the editor process. `RUST_LOG`, when set, replaces
/// the configured level and module overrides. Records emitted through `log`
/// (as `jl-core` does) are bridged by `tracing-subscriber`.
pub fn init_tracing(config: &LoggingConfig, base_dir: &Path) -> Result<Option<WorkerGuard>> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        build_filter(config)?
    };
    let json = config.format == LogFormat::Json;

    let mut layers: Vec<BoxedLayer> = vec![stderr_layer(json)];
    let mut guard = None;
    if let Some(file) = &config.file {
        let (writer, file_guard) = file_writer(&resolve_log_path(file, base_dir))?;
        layers.push(file_layer(json, writer));
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers.with_filter(filter))
        .try_init()
        .context("global tracing subscriber already installed")?;
    Ok(guard)
}

/// Filter directives from the configured level plus module overrides, in
/// module-name order so the result is stable.
pub fn filter_directives(config: &LoggingConfig) -> String {
    let mut modules: Vec<_> = config.modules.iter().collect();
    modules.sort();
    let mut directives = config.level.clone();
    for (module, level) in modules {
        write!(directives, ",{module}={level}").ok();
    }
    directives
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = filter_directives(config);
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))
}

fn resolve_log_path(file: &Path, base_dir: &Path) -> PathBuf {
    if file.is_relative() {
        base_dir.join(file)
    } else {
        file.to_path_buf()
    }
}

fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("log file path has no parent directory"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log file path has no file name"))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn stderr_layer(json: bool) -> BoxedLayer {
    if json {
        // domain stays a regular key for log consumers
        fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .event_format(DomainFormat::new())
            .with_writer(std::io::stderr)
            .boxed()
    }
}

fn file_layer(json: bool, writer: NonBlocking) -> BoxedLayer {
    if json {
        fmt::layer()
            .json()
            .fmt_fields(FileFields::default())
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .event_format(DomainFormat::new())
            .fmt_fields(FileFields::default())
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn directives_include_sorted_module_overrides() {
        let config = LoggingConfig {
            level: "warn".into(),
            modules: HashMap::from([
                ("jl_session".to_string(), "info".to_string()),
                ("jl_core::history".to_string(), "debug".to_string()),
            ]),
            ..LoggingConfig::default()
        };
        assert_eq!(
            filter_directives(&config),
            "warn,jl_core::history=debug,jl_session=info"
        );
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn bad_level_is_rejected() {
        let config = LoggingConfig {
            level: "info,jl_core=shouty".into(),
            ..LoggingConfig::default()
        };
        assert!(build_filter(&config).is_err());
    }

    #[test]
    fn relative_log_file_joins_base_dir() {
        let base = Path::new("/srv/editor");
        assert_eq!(
            resolve_log_path(Path::new("logs/editor.log"), base),
            base.join("logs/editor.log")
        );
        assert_eq!(
            resolve_log_path(Path::new("/var/log/editor.log"), base),
            PathBuf::from("/var/log/editor.log")
        );
    }

    #[test]
    fn file_writer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/editor.log");
        let (_writer, _guard) = file_writer(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());
    }
}
