//! JSON-lines logger for the `log` facade.
//!
//! Each record becomes one line:
//! `{"ts":..,"level":"ERROR","mod":"<target>","msg":"..",<key-values>}`.

use std::fmt::Write as _;
use std::io::{self, Write};

use log::kv::{self, Key, Value, VisitSource};
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::common::config::{AppCfg, LogStream};

/// Severities understood by the logging sink.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// `log` has no critical level; critical records go out as errors tagged
    /// with `critical=true`.
    pub fn level(self) -> Level {
        match self {
            Severity::Debug => Level::Debug,
            Severity::Info => Level::Info,
            Severity::Warning => Level::Warn,
            Severity::Error | Severity::Critical => Level::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }
}

/// Emit `msg` at the given severity.
pub fn log_at(severity: Severity, target: &str, msg: &str) {
    if severity == Severity::Critical {
        log::log!(target: target, severity.level(), critical = true; "{msg}");
    } else {
        log::log!(target: target, severity.level(), "{msg}");
    }
}

/// Emit one message per severity to check the sink is wired up.
pub fn smoke_test() {
    for severity in Severity::ALL {
        log_at(severity, "trainguard::smoke", smoke_message(severity));
    }
}

fn smoke_message(severity: Severity) -> &'static str {
    match severity {
        Severity::Debug => "This is a debug message",
        Severity::Info => "This is an info message",
        Severity::Warning => "This is a warning message",
        Severity::Error => "This is an error message",
        Severity::Critical => "This is a critical message",
    }
}

/// `log::Log` implementation writing JSON lines to stdout or stderr.
#[derive(Debug)]
pub struct JsonLogger {
    level: LevelFilter,
    stream: LogStream,
}

impl JsonLogger {
    pub fn new(cfg: &AppCfg) -> Self {
        Self {
            level: cfg.log_level,
            stream: cfg.log_stream,
        }
    }
}

impl Log for JsonLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut line = format_line(record, crate::common::time::now_ms());
        line.push('\n');
        // A failed write has nowhere to be reported.
        let _ = match self.stream {
            LogStream::Stdout => io::stdout().lock().write_all(line.as_bytes()),
            LogStream::Stderr => io::stderr().lock().write_all(line.as_bytes()),
        };
    }

    fn flush(&self) {
        let _ = match self.stream {
            LogStream::Stdout => io::stdout().flush(),
            LogStream::Stderr => io::stderr().flush(),
        };
    }
}

/// Install the JSON logger as the global logger. Returns `false` when a
/// logger was already installed.
pub fn init_logger(cfg: &AppCfg) -> bool {
    let installed = log::set_boxed_logger(Box::new(JsonLogger::new(cfg))).is_ok();
    if installed {
        log::set_max_level(cfg.log_level);
    }
    installed
}

/// Render a record as a single JSON object without the trailing newline.
pub fn format_line(record: &Record, ts: u64) -> String {
    let mut out = String::with_capacity(96);
    let _ = write!(
        out,
        "{{\"ts\":{ts},\"level\":\"{}\",\"mod\":\"",
        record.level()
    );
    escape_into(&mut out, record.target());
    out.push_str("\",\"msg\":\"");
    escape_into(&mut out, &record.args().to_string());
    out.push('"');
    let _ = record.key_values().visit(&mut JsonPairs(&mut out));
    out.push('}');
    out
}

struct JsonPairs<'a>(&'a mut String);

impl<'kvs> VisitSource<'kvs> for JsonPairs<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        self.0.push_str(",\"");
        escape_into(self.0, key.as_str());
        self.0.push_str("\":");
        if let Some(n) = value.to_u64() {
            let _ = write!(self.0, "{n}");
        } else if let Some(n) = value.to_i64() {
            let _ = write!(self.0, "{n}");
        } else if let Some(b) = value.to_bool() {
            let _ = write!(self.0, "{b}");
        } else {
            self.0.push('"');
            escape_into(self.0, &value.to_string());
            self.0.push('"');
        }
        Ok(())
    }
}

fn escape_into(out: &mut String, input: &str) {
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_plain_record() {
        let line = format_line(
            &Record::builder()
                .args(format_args!("loaded {} rows", 3))
                .level(Level::Info)
                .target("trainguard::data")
                .build(),
            42,
        );
        assert_eq!(
            line,
            "{\"ts\":42,\"level\":\"INFO\",\"mod\":\"trainguard::data\",\"msg\":\"loaded 3 rows\"}"
        );
    }

    #[test]
    fn escapes_message_and_appends_pairs() {
        let pairs: &[(&str, u32)] = &[("code", 1)];
        let line = format_line(
            &Record::builder()
                .args(format_args!("bad \"path\"\nnext"))
                .level(Level::Error)
                .target("t")
                .key_values(&pairs)
                .build(),
            0,
        );
        assert_eq!(
            line,
            "{\"ts\":0,\"level\":\"ERROR\",\"mod\":\"t\",\"msg\":\"bad \\\"path\\\"\\nnext\",\"code\":1}"
        );
    }

    #[test]
    fn critical_maps_to_error() {
        assert_eq!(Severity::Critical.level(), Level::Error);
        assert_eq!(Severity::Warning.level(), Level::Warn);
        assert_eq!(Severity::ALL.len(), 5);
    }

    #[test]
    fn logger_respects_level() {
        let logger = JsonLogger::new(&AppCfg {
            log_level: LevelFilter::Warn,
            log_stream: LogStream::Stderr,
        });
        let info = Metadata::builder().level(Level::Info).build();
        let error = Metadata::builder().level(Level::Error).build();
        assert!(!logger.enabled(&info));
        assert!(logger.enabled(&error));
    }

    #[test]
    fn typed_pairs_render_as_json_values() {
        let pairs: &[(&str, &dyn kv::ToValue)] = &[
            ("dur_ms", &12u64),
            ("delta", &-3i64),
            ("critical", &true),
            ("stage", &"fit"),
        ];
        let line = format_line(
            &Record::builder()
                .args(format_args!("done"))
                .level(Level::Info)
                .target("t")
                .key_values(&pairs)
                .build(),
            0,
        );
        assert!(line.ends_with(
            "\"msg\":\"done\",\"dur_ms\":12,\"delta\":-3,\"critical\":true,\"stage\":\"fit\"}"
        ));
    }

    #[test]
    fn smoke_messages_use_the_right_article() {
        assert_eq!(smoke_message(Severity::Info), "This is an info message");
        assert_eq!(smoke_message(Severity::Error), "This is an error message");
        assert_eq!(smoke_message(Severity::Warning), "This is a warning message");
    }
}
