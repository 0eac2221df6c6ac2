//! Shared helpers for the crate's tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::transport::{Transport, TransportReply};

#[macro_export]
/// Creates a mock web server, which responds with a predefined status when
/// handling a matching request
macro_rules! mock_server {
    ($status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let mock_server = wiremock::MockServer::start().await;
        let response_template = wiremock::ResponseTemplate::new(http::StatusCode::from($status));
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::method("GET")).respond_with(template).mount(&mock_server).await;
        mock_server
    }};
}

/// Transport double that serves a canned reply per uri.
///
/// Unrouted uris come back as [`TransportReply::NoResponse`], which makes a
/// typo in a test show up as a classified error rather than a panic.
#[derive(Debug, Clone, Default)]
pub(crate) struct RoutedTransport {
    replies: HashMap<String, TransportReply>,
}

impl RoutedTransport {
    pub(crate) fn route(mut self, uri: &str, reply: TransportReply) -> Self {
        self.replies.insert(uri.to_owned(), reply);
        self
    }
}

#[async_trait]
impl Transport for RoutedTransport {
    async fn http_get(&self, uri: &str) -> TransportReply {
        self.replies
            .get(uri)
            .cloned()
            .unwrap_or(TransportReply::NoResponse)
    }
}
