//! Error types and result handling for MalDetect.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single upload against the scanning server.
///
/// These are contained by the bulk-scan pipeline and recorded as `error`
/// outcomes; only the single-file command propagates them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanFailure {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}")]
    Transport { status: u16 },

    /// The server answered with an `error` field in its JSON body.
    #[error("{0}")]
    ServerReported(String),

    /// The reply contained no result for the uploaded filename.
    #[error("No result found for file")]
    MissingResult { filename: String },

    /// The request never produced a status (connect failure, timeout, ...).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The local file could not be read for upload.
    #[error("Failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The reply body was not the JSON we expected.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ScanFailure {
    /// Short machine-friendly kind name, used in logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanFailure::Transport { .. } => "transport",
            ScanFailure::ServerReported(_) => "server",
            ScanFailure::MissingResult { .. } => "missing_result",
            ScanFailure::Connection(_) => "connection",
            ScanFailure::Read { .. } => "read",
            ScanFailure::MalformedResponse(_) => "malformed_response",
        }
    }
}

impl From<reqwest::Error> for ScanFailure {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ScanFailure::Transport {
                status: status.as_u16(),
            },
            None if err.is_decode() => ScanFailure::MalformedResponse(err.to_string()),
            None => ScanFailure::Connection(err.to_string()),
        }
    }
}

/// Main error type for MalDetect operations.
#[derive(Error, Debug)]
pub enum Error {
    // ===== I/O Errors =====
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // ===== Configuration Errors =====
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("Failed to save configuration: {0}")]
    ConfigSave(String),

    #[error("Invalid configuration value: {field} - {message}")]
    ConfigInvalid { field: String, message: String },

    // ===== Queue / Pipeline Errors =====
    #[error("Please select files to scan")]
    EmptySelection,

    #[error("No file at queue position {index} (queue holds {len})")]
    QueueIndex { index: usize, len: usize },

    #[error("Bulk scan failed: {0}")]
    UnhandledPipeline(String),

    #[error("No results to export")]
    NoResults,

    // ===== Network Errors =====
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanFailure),

    #[error("Network error: {0}")]
    Network(String),

    // ===== Serialization Errors =====
    #[error("JSON serialization error")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    // ===== Generic Errors =====
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl Error {
    /// Create a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a lock poisoned error.
    pub fn lock_poisoned(context: impl Into<String>) -> Self {
        Self::LockPoisoned {
            context: context.into(),
        }
    }

    /// Check if this error is contained per item (the run can continue).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Scan(_) | Error::FileRead { .. })
    }

    /// Get a user-friendly suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::PathNotFound(_) => Some("Check that the path exists and is accessible"),
            Error::ConfigLoad(_) | Error::ConfigInvalid { .. } => {
                Some("Check your configuration file for syntax errors or missing fields")
            }
            Error::EmptySelection => Some("Pass one or more files (or --recursive directories)"),
            Error::NoResults => Some("Run a bulk scan before exporting results"),
            Error::Scan(ScanFailure::Connection(_)) | Error::Network(_) => {
                Some("Check that the MalDetect server is running and --server points at it")
            }
            Error::Scan(ScanFailure::Transport { .. }) => {
                Some("The server rejected the request; check its logs")
            }
            Error::LockPoisoned { .. } => Some("Internal error: restart the application"),
            _ => None,
        }
    }

    /// Get the error category for logging.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::FileRead { .. }
            | Error::FileWrite { .. }
            | Error::PathNotFound(_)
            | Error::Io(_) => ErrorCategory::Io,

            Error::ConfigLoad(_) | Error::ConfigSave(_) | Error::ConfigInvalid { .. } => {
                ErrorCategory::Configuration
            }

            Error::EmptySelection
            | Error::QueueIndex { .. }
            | Error::UnhandledPipeline(_)
            | Error::NoResults => ErrorCategory::Scanning,

            Error::Scan(_) | Error::Network(_) => ErrorCategory::Network,

            Error::JsonSerialize(_) | Error::Csv(_) => ErrorCategory::Serialization,

            Error::LockPoisoned { .. } => ErrorCategory::Concurrency,

            Error::Internal(_) => ErrorCategory::Other,
        }
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Scanning,
    Network,
    Serialization,
    Concurrency,
    Other,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io => write!(f, "I/O"),
            Self::Configuration => write!(f, "Configuration"),
            Self::Scanning => write!(f, "Scanning"),
            Self::Network => write!(f, "Network"),
            Self::Serialization => write!(f, "Serialization"),
            Self::Concurrency => write!(f, "Concurrency"),
            Self::Other => write!(f, "Other"),
        }
    }
}
