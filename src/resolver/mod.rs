//! Safe nested-field resolution over semi-structured catalog metadata.
//!
//! Catalog payloads are JSON of uncertain completeness: any key may be
//! absent or `null` at any depth. [`resolve`] walks a key path and
//! substitutes a caller-supplied default instead of failing, so tag
//! resolution never aborts on missing data. Every default substitution is
//! reported through an injected [`MissingFieldSink`], which keeps the
//! diagnostic trail out of the resolution logic and lets tests assert on
//! recorded entries without touching the filesystem.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde_json::Value;

/// Relative path of the append-only missing-field log.
pub const DIAGNOSTIC_LOG: &str = "errors.log";

/// Receives one event per default substitution.
pub trait MissingFieldSink {
    /// Record that `dotted_path` was missing under `context_id` and
    /// `default` was used instead.
    fn record(&self, context_id: &str, dotted_path: &str, default: &str);
}

/// Appends missing-field events to [`DIAGNOSTIC_LOG`].
///
/// Write failures are swallowed: resolution must never fail because the
/// diagnostic log is unavailable.
pub struct DiagnosticLog {
    path: PathBuf,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DIAGNOSTIC_LOG),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MissingFieldSink for DiagnosticLog {
    fn record(&self, context_id: &str, dotted_path: &str, default: &str) {
        let ts = chrono::Utc::now().to_rfc3339();
        let line = format!(
            "[{ts}] [{context_id}] Missing field: '{dotted_path}', used default: '{default}'\n"
        );
        let _ = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()));
    }
}

/// Discards every event. Useful where no diagnostic trail is wanted.
pub struct NullSink;

impl MissingFieldSink for NullSink {
    fn record(&self, _context_id: &str, _dotted_path: &str, _default: &str) {}
}

/// Outcome of a field resolution: the value plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<'a> {
    pub value: Option<&'a Value>,
    pub defaulted: bool,
}

/// Walk `data` along `path`, one key at a time.
///
/// Resolution stops and yields `default` when the current value is not an
/// object, the key is absent, or the looked-up value is `null`. When a
/// default is substituted, it was actually supplied (not the `None`
/// sentinel), and `context_id` is non-empty, one entry is recorded on
/// `sink`. Missing data is never an error.
pub fn resolve<'a>(
    data: &'a Value,
    path: &[&str],
    default: Option<&'a Value>,
    context_id: &str,
    sink: &dyn MissingFieldSink,
) -> Resolved<'a> {
    let mut current = data;
    for key in path {
        let next = match current {
            Value::Object(map) => map.get(*key),
            _ => None,
        };
        match next {
            Some(v) if !v.is_null() => current = v,
            _ => {
                if let Some(d) = default
                    && !context_id.is_empty()
                {
                    sink.record(context_id, &path.join("."), &render(d));
                }
                return Resolved {
                    value: default,
                    defaulted: true,
                };
            }
        }
    }
    Resolved {
        value: Some(current),
        defaulted: false,
    }
}

/// String-typed convenience wrapper around [`resolve`].
///
/// Returns the resolved string (non-string values render via `to_string`)
/// and whether the default was used.
pub fn resolve_str(
    data: &Value,
    path: &[&str],
    default: &Value,
    context_id: &str,
    sink: &dyn MissingFieldSink,
) -> (String, bool) {
    let resolved = resolve(data, path, Some(default), context_id, sink);
    let value = resolved.value.map(render).unwrap_or_default();
    (value, resolved.defaulted)
}

/// Render a JSON value the way it should appear in a tag or a log line:
/// strings without quotes, everything else via its JSON form.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
pub mod test_sink {
    use super::MissingFieldSink;
    use std::cell::RefCell;

    /// Collects recorded events for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        pub entries: RefCell<Vec<(String, String, String)>>,
    }

    impl MissingFieldSink for RecordingSink {
        fn record(&self, context_id: &str, dotted_path: &str, default: &str) {
            self.entries.borrow_mut().push((
                context_id.to_string(),
                dotted_path.to_string(),
                default.to_string(),
            ));
        }
    }
}
