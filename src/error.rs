use std::fmt;

/// What kind of record a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Extension,
    Feature,
    Scenario,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Extension => "extension",
            RecordKind::Feature => "feature",
            RecordKind::Scenario => "scenario",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum ReportError {
    /// Reading or writing a local file failed
    Io { path: String, source: std::io::Error },

    /// Fetching a remote input failed
    Http { url: String, source: reqwest::Error },

    /// Input JSON did not match the expected shape
    JsonParse { context: String, source: serde_json::Error },

    /// Input looked like a script but had no `window.<NAME> = ...` assignment
    MissingAssignment { global: String },

    /// A scenario status other than PASS / FAIL
    InvalidStatus { context: String, value: String },

    /// Lookup key does not exist in the record store
    NotFound { kind: RecordKind, key: String },
}

impl ReportError {
    pub fn not_found(kind: RecordKind, key: impl Into<String>) -> Self {
        ReportError::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Whether this is a lookup miss the caller can render as "no data".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReportError::NotFound { .. })
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io { path, source } => {
                write!(f, "I/O error on '{}': {}", path, source)
            }
            ReportError::Http { url, source } => {
                write!(f, "HTTP fetch of '{}' failed: {}", url, source)
            }
            ReportError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            ReportError::MissingAssignment { global } => {
                write!(f, "No 'window.{} = ...' assignment found", global)
            }
            ReportError::InvalidStatus { context, value } => {
                write!(f, "Invalid scenario status '{}' ({})", value, context)
            }
            ReportError::NotFound { kind, key } => {
                write!(f, "No {} named '{}'", kind, key)
            }
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io { source, .. } => Some(source),
            ReportError::Http { source, .. } => Some(source),
            ReportError::JsonParse { source, .. } => Some(source),
            _ => None,
        }
    }
}
