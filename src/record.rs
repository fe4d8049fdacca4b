use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Call site of a log statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub function: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, function: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            function: function.into(),
            line,
        }
    }
}

/// A single log event, built fresh for every accepted log call and dropped
/// once its send attempt completes.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub label: String,
    /// Lowercase severity name.
    pub level: String,
    pub message: String,
    pub location: Option<SourceLocation>,
    /// Normalized metadata, `None` when the merged metadata was empty.
    pub metadata: Option<Map<String, Value>>,
    pub timestamp: DateTime<Utc>,
}

/// Shorten a source path to the part below its last `src` directory.
///
/// `/home/me/app/src/net/mod.rs` becomes `net/mod.rs`; paths without a
/// `src` component are returned unchanged.
pub fn concise_source_path(path: &str) -> String {
    let parts: Vec<&str> = path.split(['/', '\\']).filter(|p| !p.is_empty()).collect();
    match parts.iter().rposition(|p| *p == "src") {
        Some(idx) if idx + 1 < parts.len() => parts[idx + 1..].join("/"),
        _ => path.to_string(),
    }
}
