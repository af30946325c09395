//! Pluggable log sinks dispatched through the capability engine.
//!
//! A sink is an engine instance: it carries an [`MxObject`] whose type
//! declares the `ILogSink` capability. The [`SinkRegistry`] fans a single
//! logical `write` out to every registered sink in registration order, and
//! rejects (logs, never errors) objects that do not conform to the
//! capability.

pub mod console_sink;
pub mod file_sink;

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::object::{MxInstance, MxObject};
use crate::registry::TypeRegistry;

pub use console_sink::{AnsiColor, ConsoleSink};
pub use file_sink::FileSink;

// ---------------------------------------------------------------------------
// Sink contract
// ---------------------------------------------------------------------------

/// Capability contract for log sinks.
///
/// `log` is infallible by contract: a sink that cannot deliver a line reports
/// the problem through the `log` facade and drops the line.
pub trait LogSink: MxInstance {
    /// Deliver one formatted message.
    fn log(&self, message: &str, values: &[Value]);

    /// Allow delivery.
    fn enable(&self);

    /// Suppress delivery.
    fn disable(&self);

    /// Whether delivery is allowed.
    fn is_enabled(&self) -> bool;

    /// Set the prefix stamped on every line.
    fn set_prefix(&self, prefix: &str);

    /// The prefix stamped on every line.
    fn get_prefix(&self) -> String;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Sink configuration shared by the built-in sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether the sink starts enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prefix stamped on every line.
    #[serde(default)]
    pub prefix: String,

    /// Whether lines carry a local timestamp.
    #[serde(default = "default_true")]
    pub timestamps: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: String::new(),
            timestamps: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared sink state
// ---------------------------------------------------------------------------

struct SinkState {
    enabled: bool,
    prefix: String,
}

/// Common backbone of the built-in sinks: the engine instance plus the
/// enabled/prefix state behind a lock, so sinks stay shareable as
/// `Arc<dyn LogSink>`.
pub struct SinkBase {
    object: MxObject,
    state: RwLock<SinkState>,
}

impl SinkBase {
    /// Register (or reuse) the sink's implementation type, declare the
    /// `ILogSink` capability on it, and construct the engine instance.
    pub fn new(registry: &TypeRegistry, type_name: &str) -> Self {
        Self::from_config(registry, type_name, &LoggingConfig::default())
    }

    /// Like [`SinkBase::new`], with explicit configuration.
    pub fn from_config(registry: &TypeRegistry, type_name: &str, config: &LoggingConfig) -> Self {
        let ty = registry.ensure_implementation(type_name, None);
        let mut claimed = registry.implemented_interfaces(ty);
        if !claimed.contains(&registry.ilog_sink()) {
            claimed.push(registry.ilog_sink());
        }
        registry.declare_implementation(ty, &claimed);
        Self {
            object: MxObject::new_unchecked(registry, ty),
            state: RwLock::new(SinkState {
                enabled: config.enabled,
                prefix: config.prefix.clone(),
            }),
        }
    }

    pub fn object(&self) -> &MxObject {
        &self.object
    }

    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.write().enabled = enabled;
    }

    pub fn prefix(&self) -> String {
        self.state.read().prefix.clone()
    }

    pub fn set_prefix(&self, prefix: &str) {
        self.state.write().prefix = prefix.to_string();
    }
}

// ---------------------------------------------------------------------------
// Message formatting
// ---------------------------------------------------------------------------

/// Substitute `{}` placeholders left-to-right from `values`; surplus values
/// are appended space-separated. String values render unquoted.
pub fn format_message(message: &str, values: &[Value]) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;
    let mut used = 0;
    while let Some(pos) = rest.find("{}") {
        if used >= values.len() {
            break;
        }
        out.push_str(&rest[..pos]);
        out.push_str(&display_value(&values[used]));
        used += 1;
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    for value in &values[used..] {
        out.push(' ');
        out.push_str(&display_value(value));
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// SinkRegistry
// ---------------------------------------------------------------------------

/// Ordered fan-out of log writes to registered sinks.
#[derive(Default)]
pub struct SinkRegistry {
    sinks: Mutex<Vec<Arc<dyn LogSink>>>,
}

impl SinkRegistry {
    /// Create an empty sink registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink.
    ///
    /// The sink's type must conform to the `ILogSink` capability; a
    /// non-conforming sink is rejected with a warning, never an error.
    /// Returns whether the sink was accepted.
    pub fn register(&self, registry: &TypeRegistry, sink: Arc<dyn LogSink>) -> bool {
        if !registry.is_instance_of(registry.ilog_sink(), sink.mx_object()) {
            log::warn!(
                "rejecting log sink '{}': its type does not implement ILogSink",
                sink.mx_object().name()
            );
            return false;
        }
        self.sinks.lock().push(sink);
        true
    }

    /// Dispatch one logical write to every enabled sink, in registration
    /// order.
    pub fn write(&self, message: &str, values: &[Value]) {
        let sinks: Vec<Arc<dyn LogSink>> = self.sinks.lock().iter().cloned().collect();
        for sink in sinks {
            if sink.is_enabled() {
                sink.log(message, values);
            }
        }
    }

    /// Number of registered sinks.
    pub fn len(&self) -> usize {
        self.sinks.lock().len()
    }

    /// Whether no sinks are registered.
    pub fn is_empty(&self) -> bool {
        self.sinks.lock().is_empty()
    }

    /// Drop every registered sink. Returns the count dropped.
    pub fn clear(&self) -> usize {
        let mut sinks = self.sinks.lock();
        let count = sinks.len();
        sinks.clear();
        count
    }
}
