//! Unified error types for the precache engine.
//!
//! Every variant renders with a stable code prefix so callers and logs can
//! tell which manifest entry, field, or URL triggered a failure.

use tokio_rusqlite::rusqlite;

use crate::manifest::EntryRef;

/// Unified error type for manifest validation, installation, and storage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Top-level manifest is not an array or a `{revisionedFiles: [...]}` wrapper.
    #[error("INVALID_MANIFEST_TYPE: manifest must be an Array or {{revisionedFiles: Array}}, found {found}")]
    InvalidManifestType { found: String },

    /// A manifest element is neither a URL string nor an object with a `url` string.
    #[error("INVALID_ENTRY: entry {index} must be a URL string or an object with a 'url' string, found {found}")]
    InvalidEntry { index: usize, found: String },

    /// A present field has the right type but an unusable value.
    #[error("INVALID_FIELD_VALUE: entry {index} has an invalid '{problem_param}' value {problem_value:?}")]
    InvalidFieldValue { index: usize, problem_param: String, problem_value: String },

    /// A present field has the wrong JSON type.
    #[error("WRONG_FIELD_TYPE: the '{field}' parameter has the wrong type in entry {index}: {found}, not {expected}")]
    WrongFieldType { index: usize, field: String, expected: &'static str, found: String },

    /// The same URL was declared twice with different revisions.
    #[error("DUPLICATE_ENTRY_DIFFERENT_REVISIONS: {first} conflicts with {second}")]
    DuplicateEntryDifferentRevisions { first: EntryRef, second: EntryRef },

    /// Fetching or storing a single entry failed.
    #[error("PRECACHE_INSTALL_FAILURE: {url}: {cause}")]
    PrecacheInstallFailure {
        url: String,
        #[source]
        cause: Box<Error>,
    },

    /// One or more entries failed during `install()`; carries every failure in manifest order.
    #[error("INSTALL_FAILED: {failed} of {total} entries failed to install")]
    InstallFailed { failed: usize, total: usize, failures: Vec<Error> },

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// HTTP error response or network failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// A spawned install task panicked or was cancelled.
    #[error("TASK_FAILED: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidManifestType { .. } => "INVALID_MANIFEST_TYPE",
            Error::InvalidEntry { .. } => "INVALID_ENTRY",
            Error::InvalidFieldValue { .. } => "INVALID_FIELD_VALUE",
            Error::WrongFieldType { .. } => "WRONG_FIELD_TYPE",
            Error::DuplicateEntryDifferentRevisions { .. } => "DUPLICATE_ENTRY_DIFFERENT_REVISIONS",
            Error::PrecacheInstallFailure { .. } => "PRECACHE_INSTALL_FAILURE",
            Error::InstallFailed { .. } => "INSTALL_FAILED",
            Error::Database(_) | Error::MigrationFailed(_) => "CACHE_ERROR",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::FetchTimeout(_) => "FETCH_TIMEOUT",
            Error::FetchTooLarge(_) => "FETCH_TOO_LARGE",
            Error::HttpError(_) => "HTTP_ERROR",
            Error::TaskFailed(_) => "TASK_FAILED",
        }
    }

    /// Wrap `cause` as the install failure of `url`.
    pub fn install_failure(url: impl Into<String>, cause: Error) -> Self {
        Error::PrecacheInstallFailure { url: url.into(), cause: Box::new(cause) }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
