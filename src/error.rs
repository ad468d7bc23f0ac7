//! Error types for the client.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::protocol::FailureCode;

/// Errors returned by the REST client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with `success: false` or an error status.
    #[error("{message}")]
    Rejected { code: FailureCode, message: String },
    /// The body was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    /// `success: true` without the `data` the endpoint promises.
    #[error("response carried no data")]
    MissingData,
    /// The stored token was refused; the session has been cleared.
    #[error("session expired, please log in again")]
    AuthExpired,
    /// The call succeeded but its session could not be saved.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// True for payloads we could not interpret.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ApiError::Malformed(_) | ApiError::MissingData)
    }
}

/// Errors raised by the session store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Top-level error for the command-line client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("not logged in, run `quiz login` first")]
    NotLoggedIn,
    #[error("{0}")]
    InvalidArgument(String),
}
