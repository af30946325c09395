//! File log sink appending formatted lines to a path.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::Value;

use super::{format_message, LogSink, LoggingConfig, SinkBase};
use crate::object::{MxInstance, MxObject};
use crate::registry::TypeRegistry;

/// Sink appending one line per write to a log file.
///
/// The parent directory is created on demand. Delivery failures are reported
/// through the `log` facade and the line is dropped — the sink contract is
/// infallible.
pub struct FileSink {
    base: SinkBase,
    path: PathBuf,
    timestamps: bool,
}

impl FileSink {
    /// File sink with the default configuration.
    pub fn new(registry: &TypeRegistry, path: impl Into<PathBuf>) -> Self {
        Self::from_config(registry, path, &LoggingConfig::default())
    }

    /// File sink with explicit configuration.
    pub fn from_config(
        registry: &TypeRegistry,
        path: impl Into<PathBuf>,
        config: &LoggingConfig,
    ) -> Self {
        Self {
            base: SinkBase::from_config(registry, "FileSink", config),
            path: path.into(),
            timestamps: config.timestamps,
        }
    }

    /// Path the sink appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(&self, message: &str, values: &[Value]) -> String {
        let mut line = String::new();
        if self.timestamps {
            line.push_str(&format!("[{}]", Local::now().format("%Y-%m-%d %H:%M:%S")));
        }
        let prefix = self.base.prefix();
        if !prefix.is_empty() {
            line.push_str(&format!("[{prefix}]"));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&format_message(message, values));
        line
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl MxInstance for FileSink {
    fn mx_object(&self) -> &MxObject {
        self.base.object()
    }
}

impl LogSink for FileSink {
    fn log(&self, message: &str, values: &[Value]) {
        if !self.base.is_enabled() {
            return;
        }
        let line = self.render(message, values);
        if let Err(error) = self.append(&line) {
            log::error!(
                "file sink '{}' failed to append to {}: {error}",
                self.mx_object().name(),
                self.path.display()
            );
        }
    }

    fn enable(&self) {
        self.base.set_enabled(true);
    }

    fn disable(&self) {
        self.base.set_enabled(false);
    }

    fn is_enabled(&self) -> bool {
        self.base.is_enabled()
    }

    fn set_prefix(&self, prefix: &str) {
        self.base.set_prefix(prefix);
    }

    fn get_prefix(&self) -> String {
        self.base.prefix()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_appends_lines_in_order() {
        let reg = TypeRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.log");

        let config = LoggingConfig {
            enabled: true,
            prefix: "test".to_string(),
            timestamps: false,
        };
        let sink = FileSink::from_config(&reg, &path, &config);

        sink.log("first {}", &[json!(1)]);
        sink.log("second", &[]);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[test] first 1\n[test] second\n");
    }

    #[test]
    fn test_creates_parent_directory() {
        let reg = TypeRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("engine.log");

        let sink = FileSink::new(&reg, &path);
        sink.log("hello", &[]);

        assert!(path.exists());
    }

    #[test]
    fn test_disabled_sink_writes_nothing() {
        let reg = TypeRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.log");

        let sink = FileSink::new(&reg, &path);
        sink.disable();
        sink.log("dropped", &[]);

        assert!(!path.exists());
    }

    #[test]
    fn test_sink_conforms_to_capability() {
        let reg = TypeRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(&reg, dir.path().join("engine.log"));
        assert!(reg.is_instance_of(reg.ilog_sink(), sink.mx_object()));
    }
}
