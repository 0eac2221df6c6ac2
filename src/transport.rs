use async_trait::async_trait;
use http::StatusCode;

/// What the transport collaborator hands back for one fetch.
///
/// The transport owns its own timeout; a timed-out request surfaces as
/// [`TransportReply::Failed`], like any other transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportReply {
    /// A response was received
    Response {
        /// The HTTP status line
        status: StatusCode,
        /// The raw response body
        body: String,
    },
    /// The request completed without producing any response object
    NoResponse,
    /// The transport itself failed (connection refused, DNS, timeout)
    Failed(String),
}

/// The HTTP collaborator used to fetch a single resource.
///
/// [`Client`](crate::Client) implements this on top of reqwest. Callers who
/// want to drive [`Pool::run`](crate::Pool::run) against something else, a
/// test double for instance, can supply their own implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `uri` and report what happened, without classifying it
    async fn http_get(&self, uri: &str) -> TransportReply;
}
