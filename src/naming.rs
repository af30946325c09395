//! Instance-name normalization.
//!
//! Generated names are the engine's stand-in for object identity in logs and
//! error messages: a lowercase word-separated form of the type name plus a
//! per-type sequence number. The counters live on the registry; this module
//! owns the string pipeline.

use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_LOWER_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").unwrap());
static DUPLICATE_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

/// Normalize a type name into its lowercase word-separated form.
///
/// Path separators and reserved marker characters become underscores, an
/// underscore is inserted before each uppercase letter that follows a
/// lowercase one, and the result is lowercased with duplicate and edge
/// underscores collapsed away.
pub fn normalize_type_name(name: &str) -> String {
    let flattened = name.replace("::", "_").replace(['.', '$', '-'], "_");
    let split = CAMEL_LOWER_UPPER.replace_all(&flattened, "${1}_${2}");
    let lowered = split.to_lowercase();
    let replaced = DISALLOWED_CHARS.replace_all(&lowered, "_");
    let collapsed = DUPLICATE_UNDERSCORE.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Build an instance name from a type name and its sequence number.
pub fn instance_name(type_name: &str, count: u64) -> String {
    format!("{}_{}", normalize_type_name(type_name), count)
}
