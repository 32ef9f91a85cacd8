use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Why a single URL could not be added to the site map.
///
/// Every variant is recoverable at the level of one URL: the crawl records
/// it and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("Timeout")]
    Timeout,

    #[error("Connection error")]
    ConnectionError,

    #[error("Content-Type: {0}")]
    NonHtmlContentType(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("{0}")]
    Other(String),
}

impl FailureReason {
    /// Coarse category used in logs.
    pub fn category(&self) -> &'static str {
        match self {
            FailureReason::Timeout | FailureReason::ConnectionError => "transport",
            FailureReason::HttpStatus(_) => "protocol",
            FailureReason::NonHtmlContentType(_) => "content-type",
            FailureReason::Other(_) => "unexpected",
        }
    }
}

impl From<reqwest::Error> for FailureReason {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FailureReason::Timeout
        } else if err.is_connect() {
            FailureReason::ConnectionError
        } else {
            FailureReason::Other(err.to_string())
        }
    }
}
