use http::StatusCode;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt::Display;
use thiserror::Error;

/// Fatal errors raised before any fetch is dispatched.
///
/// Everything that goes wrong *after* dispatch is non-fatal and surfaces as
/// a [`FetchError`] inside the aggregate instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The caller's input could not be turned into a usable request pool
    #[error("invalid request input: {0}")]
    InvalidArgument(String),
    /// A configured header value could not be parsed
    #[error("header could not be parsed")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
    /// The underlying HTTP client could not be constructed
    #[error("failed to build the request client")]
    BuildClient(#[from] reqwest::Error),
}

/// What went wrong with a single fetch.
///
/// Exactly one of these is produced per failed descriptor. The messages
/// name the uri so that a flat error list stays readable without having to
/// look the descriptor up again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FetchErrorKind {
    /// The transport completed without producing a response at all
    #[error("`{0}` returned no response")]
    NoResponse(String),
    /// The response status was above the accepted range
    #[error("`{0}` returned a {1} http status")]
    BadHttpStatus(String, StatusCode),
    /// The response body was not valid JSON
    #[error("`{0}` returned an illegal JSON payload: {1}")]
    MalformedPayload(String, String),
    /// The payload decoded fine but self-reported failure in its `errors` field
    #[error("`{0}` reported an error in its payload: {1}")]
    ApplicationReported(String, String),
    /// The transport itself failed (connection refused, DNS, timeout)
    #[error("request to `{0}` failed: {1}")]
    Transport(String, String),
    /// More than one descriptor in the pool used this identifier
    #[error("more than one request used the `{0}` identifier; only the first one is kept")]
    DuplicateId(String),
}

/// One classified failure, as surfaced through
/// [`Aggregate::errors`](crate::Aggregate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    /// What went wrong
    pub kind: FetchErrorKind,
    /// HTTP status received alongside the failure, when the transport
    /// produced one
    pub http_status: Option<StatusCode>,
    /// Identifier of the descriptor this error belongs to
    pub request_id: String,
}

impl FetchError {
    /// Create a new fetch error for the descriptor with the given id
    #[must_use]
    pub fn new(
        kind: FetchErrorKind,
        http_status: Option<StatusCode>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            http_status,
            request_id: request_id.into(),
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <FetchErrorKind as Display>::fmt(&self.kind, f)
    }
}

impl Serialize for FetchError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields = 2 + usize::from(self.http_status.is_some());
        let mut s = serializer.serialize_struct("FetchError", fields)?;
        s.serialize_field("message", &self.kind.to_string())?;
        if let Some(status) = self.http_status {
            s.serialize_field("http_status", &status.as_u16())?;
        }
        s.serialize_field("request_id", &self.request_id)?;
        s.end()
    }
}
