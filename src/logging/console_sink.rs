//! Console log sink with ANSI color support.

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{format_message, LogSink, LoggingConfig, SinkBase};
use crate::object::{MxInstance, MxObject};
use crate::registry::TypeRegistry;

/// ANSI reset code.
const RESET: &str = "\x1b[0m";

/// Colors available for console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnsiColor {
    Red,
    Green,
    Yellow,
    Blue,
    Cyan,
    White,
    BoldRed,
    BoldGreen,
    BoldYellow,
    BoldCyan,
}

impl AnsiColor {
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Blue => "\x1b[34m",
            Self::Cyan => "\x1b[36m",
            Self::White => "\x1b[37m",
            Self::BoldRed => "\x1b[1;31m",
            Self::BoldGreen => "\x1b[1;32m",
            Self::BoldYellow => "\x1b[1;33m",
            Self::BoldCyan => "\x1b[1;36m",
        }
    }
}

/// Sink writing colored, optionally timestamped lines to stdout.
pub struct ConsoleSink {
    base: SinkBase,
    color: AnsiColor,
    timestamps: bool,
}

impl ConsoleSink {
    /// Console sink with the default color and configuration.
    pub fn new(registry: &TypeRegistry) -> Self {
        Self::from_config(registry, &LoggingConfig::default())
    }

    /// Console sink with explicit configuration.
    pub fn from_config(registry: &TypeRegistry, config: &LoggingConfig) -> Self {
        Self {
            base: SinkBase::from_config(registry, "ConsoleSink", config),
            color: AnsiColor::BoldYellow,
            timestamps: config.timestamps,
        }
    }

    /// Override the line color.
    pub fn with_color(mut self, color: AnsiColor) -> Self {
        self.color = color;
        self
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
}

impl MxInstance for ConsoleSink {
    fn mx_object(&self) -> &MxObject {
        self.base.object()
    }
}

impl LogSink for ConsoleSink {
    fn log(&self, message: &str, values: &[Value]) {
        if !self.base.is_enabled() {
            return;
        }
        println!("{}{}{}", self.color.ansi_code(), self.render(message, values), RESET);
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
