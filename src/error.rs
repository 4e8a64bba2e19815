//! Error types for the fastget library.

use thiserror::Error;

/// Errors that can occur during scraping, state handling, and downloads.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status code.
    #[error("HTTP status {status} for {url}")]
    Status {
        /// Status code returned by the server.
        status: reqwest::StatusCode,
        /// URL that produced the response.
        url: String,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Session state serialization or deserialization failed.
    #[error("session state error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single pending link could not be resolved to a downloadable file.
///
/// Resolution failures are per-link: the pipeline logs them and moves on
/// to the next link.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The intermediary page could not be fetched.
    #[error("{0}")]
    Fetch(#[from] Error),

    /// No `function download` script was found on the page.
    #[error("no download function found on page")]
    NoDownloadFunction,

    /// A download script was found but contained no usable URL.
    #[error("no download URL found in script")]
    NoDownloadUrl,
}

/// A specialized `Result` type for fastget operations.
pub type Result<T> = std::result::Result<T, Error>;
