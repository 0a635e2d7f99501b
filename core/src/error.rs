//! Error types for the resource client.
//!
//! # Design
//! Everything the response classifier rejects surfaces as one `ResponseError`
//! carrying the status code and raw content of the offending response, so a
//! caller can always inspect what the server actually sent. The reason lives
//! in `ResponseErrorKind`. Transport failures are never reclassified: they are
//! kept as the transport's own error type inside `Error::Transport`.

use thiserror::Error;

/// Why a response was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseErrorKind {
    /// The body is not valid JSON.
    #[error("{message}")]
    Decode { message: String },

    /// A response key was requested but the decoded body does not contain it.
    #[error("Response key `{key}` not found")]
    ResponseKeyNotFound { key: String },

    /// The status code is neither an ok status nor a none status.
    #[error("Status code {status} not in ok_statuses {ok_statuses:?}")]
    UnexpectedStatus { status: u16, ok_statuses: Vec<u16> },
}

/// A response the client refused to turn into a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error status code: {status}. Description: {kind}")]
pub struct ResponseError {
    status: u16,
    content: Vec<u8>,
    kind: ResponseErrorKind,
}

impl ResponseError {
    pub fn new(status: u16, content: impl Into<Vec<u8>>, kind: ResponseErrorKind) -> Self {
        Self {
            status,
            content: content.into(),
            kind,
        }
    }

    /// Status code of the original response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw body of the original response.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn kind(&self) -> &ResponseErrorKind {
        &self.kind
    }

    /// Human-readable description of the failure.
    pub fn description(&self) -> String {
        self.kind.to_string()
    }
}

/// Errors returned by `Client::dispatch` and the verb methods.
#[derive(Debug, Error)]
pub enum Error<E: std::error::Error + 'static> {
    /// The transport could not complete the round trip.
    #[error(transparent)]
    Transport(E),

    /// The response was received but rejected.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl<E: std::error::Error + 'static> Error<E> {
    /// The rejected response, if this is a classification failure.
    pub fn as_response(&self) -> Option<&ResponseError> {
        match self {
            Error::Response(err) => Some(err),
            _ => None,
        }
    }

    /// Status code of the rejected response, if any.
    pub fn status(&self) -> Option<u16> {
        self.as_response().map(ResponseError::status)
    }
}

/// Errors raised while parsing a client endpoint.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid endpoint `{endpoint}`: {source}")]
    Parse {
        endpoint: String,
        source: url::ParseError,
    },

    /// The endpoint parsed, but cannot carry a path (e.g. `mailto:`).
    #[error("endpoint `{0}` cannot be used as a base URL")]
    NotABase(String),
}
