//! Error taxonomy for the agent.
//!
//! Each seam of the collection cycle has its own error type so that the
//! cycle can decide, per failure, whether to skip a metric, drop a report,
//! or refuse to start.

use std::path::PathBuf;

/// Failure reading statistics from the operating system.
///
/// Always transient: the affected metric is omitted for this cycle.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// A statistics file could not be read.
    #[error("Collection: failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Usage for one mountpoint could not be queried.
    #[error("Collection: failed to stat mountpoint {mountpoint}: {source}")]
    Statvfs {
        mountpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// The data was read but did not contain what we expected.
    #[error("Collection: malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },
}

/// Misuse of the delta engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Deltas were requested before a baseline snapshot was captured.
    #[error("Engine: no baseline snapshot, priming has not completed")]
    NotPrimed,
}

/// Failure delivering a report.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The endpoint answered with a non-success status.
    #[error("Submit: HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The endpoint could not be reached (DNS, connect, TLS, timeout).
    #[error("Submit: network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The report could not be serialized.
    #[error("Submit: failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Malformed or missing settings. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config: failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config: failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Config: invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Convenience `Result` alias for OS collection.
pub type CollectionResult<T> = std::result::Result<T, CollectionError>;
