use thiserror::Error;

use crate::domain::resource::{Operation, Resource};
use crate::io::{Format, IoError};

/// A value could not be read as a local or absolute date/time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("malformed timestamp `{input}`: {reason}")]
    Malformed { input: String, reason: &'static str },
}

impl TimestampError {
    pub(crate) fn malformed(input: &str, reason: &'static str) -> Self {
        Self::Malformed {
            input: input.to_string(),
            reason,
        }
    }
}

/// Errors produced while preparing a request body for submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrepareError {
    /// A date field held text that could not be normalized.
    #[error("date field `{path}`: {source}")]
    Timestamp {
        path: String,
        #[source]
        source: TimestampError,
    },

    /// A date field held a number, boolean or container.
    #[error("date field `{path}` must be a string")]
    NotAString { path: String },
}

/// Failures of the HTTP layer underneath the resource client.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("`xh` is not available in PATH")]
    Unavailable,

    #[error("failed to spawn xh: {0}")]
    Spawn(std::io::Error),

    #[error("xh execution failed: {0}")]
    Execution(String),

    #[error("xh output is not valid UTF-8: {0}")]
    Decode(std::str::Utf8Error),

    #[error("failed to parse xh response: {0}")]
    Parse(String),

    /// The backend answered outside the 2xx range.
    #[error("HTTP {status} {status_text} - {body}")]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },
}

/// Errors produced by the `scrub` command boundary.
#[derive(Debug, Error)]
pub enum ScrubError {
    /// Input could not be parsed in the declared format.
    #[error("failed to read {format} input: {source}")]
    ReadInput {
        format: Format,
        #[source]
        source: IoError,
    },

    /// Output could not be serialized in the declared format.
    #[error("failed to write {format} output: {source}")]
    WriteOutput {
        format: Format,
        #[source]
        source: IoError,
    },
}

/// Errors produced by the `prepare` command boundary.
#[derive(Debug, Error)]
pub enum PrepareCommandError {
    #[error("failed to read {format} input: {source}")]
    ReadInput {
        format: Format,
        #[source]
        source: IoError,
    },

    /// Value at `index` could not be prepared; nothing was written.
    #[error("record {index}: {source}")]
    Prepare {
        index: usize,
        #[source]
        source: PrepareError,
    },

    #[error("failed to write {format} output: {source}")]
    WriteOutput {
        format: Format,
        #[source]
        source: IoError,
    },
}

/// Errors produced by the resource client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Prepare(#[from] PrepareError),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{resource} does not support {operation}")]
    Unsupported {
        resource: Resource,
        operation: Operation,
    },

    #[error("{resource} cannot be filtered by `{key}`")]
    InvalidFilter { resource: Resource, key: String },

    #[error("{resource} request requires a non-empty id")]
    MissingId { resource: Resource },

    /// Request body could not be encoded or the response body decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{resource} returned no content where a document was expected")]
    EmptyResponse { resource: Resource },
}
