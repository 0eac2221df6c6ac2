//! Classification of a single fetch.
//!
//! Takes the raw transport reply for one descriptor and turns it into
//! exactly one [`Outcome`]: the decoded payload or one classified error.

use http::StatusCode;
use log::warn;
use serde_json::Value;

use crate::transport::TransportReply;
use crate::types::{FetchError, FetchErrorKind, Outcome, Request};

/// Upper bound of the status range treated as success, inclusive.
///
/// Anything above it counts as a failure, including redirects that survived
/// the transport's redirect policy. Note this deliberately also admits
/// informational 1xx codes; the boundary is part of the observable contract
/// and is pinned by tests.
const MAX_SUCCESS_STATUS: u16 = 200;

/// Classify the transport reply for one descriptor, first match wins:
///
/// 1. no response object at all,
/// 2. status within the success range: decode the body, then honor a
///    payload-embedded `errors` field even on a "successful" status,
/// 3. status above the success range,
/// 4. transport failure.
pub(crate) fn classify(request: &Request, reply: TransportReply) -> Outcome {
    let id = request.node_id();
    let outcome = match reply {
        TransportReply::NoResponse => fail(
            FetchErrorKind::NoResponse(request.uri.clone()),
            None,
            id,
        ),
        TransportReply::Response { status, body } if status.as_u16() <= MAX_SUCCESS_STATUS => {
            classify_payload(request, status, &body)
        }
        TransportReply::Response { status, .. } => fail(
            FetchErrorKind::BadHttpStatus(request.uri.clone(), status),
            Some(status),
            id,
        ),
        TransportReply::Failed(detail) => fail(
            FetchErrorKind::Transport(request.uri.clone(), detail),
            None,
            id,
        ),
    };
    if let Outcome::Failed(error) = &outcome {
        warn!("{error}");
    }
    outcome
}

fn classify_payload(request: &Request, status: StatusCode, body: &str) -> Outcome {
    let id = request.node_id();
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("errors") {
            Some(errors) => fail(
                FetchErrorKind::ApplicationReported(request.uri.clone(), flatten_errors(errors)),
                Some(status),
                id,
            ),
            None => Outcome::Success(value),
        },
        Err(e) => fail(
            FetchErrorKind::MalformedPayload(request.uri.clone(), e.to_string()),
            Some(status),
            id,
        ),
    }
}

fn fail(kind: FetchErrorKind, status: Option<StatusCode>, id: &str) -> Outcome {
    Outcome::Failed(FetchError::new(kind, status, id))
}

/// Render the payload's `errors` field as one line: array elements joined,
/// strings verbatim, everything else as its JSON form.
fn flatten_errors(errors: &Value) -> String {
    match errors {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fire the per-descriptor hooks for a freshly classified outcome.
///
/// `on_fail` only fires on an error; `on_complete` fires on both paths.
/// Both run synchronously inside the fetch task, before the outcome is
/// handed to the merge loop.
pub(crate) fn notify_hooks(request: &Request, outcome: &Outcome) {
    let error = outcome.error();
    if let (Some(error), Some(hook)) = (error, request.on_fail.as_ref()) {
        hook(error, request);
    }
    if let Some(hook) = request.on_complete.as_ref() {
        hook(error, outcome.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn request() -> Request {
        Request::new("https://example.com/data").with_id("0")
    }

    fn response(status: u16, body: &str) -> TransportReply {
        TransportReply::Response {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_owned(),
        }
    }

    #[test]
    fn test_success_below_boundary() {
        let outcome = classify(&request(), response(200, r#"{"city":"London"}"#));
        assert_eq!(outcome, Outcome::Success(json!({"city": "London"})));
    }

    #[test]
    fn test_informational_status_counts_as_success() {
        // The boundary is `<= 200`, so even a 100 Continue that somehow
        // surfaces as the final status is treated as success.
        let outcome = classify(&request(), response(100, "{}"));
        assert!(outcome.is_success());
    }

    #[test]
    fn test_status_201_is_a_failure() {
        // The success range is inclusive at 200 and nothing beyond.
        let outcome = classify(&request(), response(201, "{}"));
        let error = outcome.error().expect("expected a failure");
        assert!(matches!(error.kind, FetchErrorKind::BadHttpStatus(_, _)));
        assert_eq!(error.http_status, Some(StatusCode::CREATED));
    }

    #[test]
    fn test_status_404_is_a_failure() {
        let outcome = classify(&request(), response(404, "not found"));
        let error = outcome.error().expect("expected a failure");
        assert!(matches!(error.kind, FetchErrorKind::BadHttpStatus(_, _)));
        assert_eq!(error.request_id, "0");
    }

    #[test]
    fn test_malformed_payload_keeps_status() {
        let outcome = classify(&request(), response(200, "{not json"));
        let error = outcome.error().expect("expected a failure");
        assert!(matches!(error.kind, FetchErrorKind::MalformedPayload(_, _)));
        assert_eq!(error.http_status, Some(StatusCode::OK));
    }

    #[test]
    fn test_payload_embedded_errors_beat_the_status() {
        let outcome = classify(
            &request(),
            response(200, r#"{"errors": ["Error A", "Error B"]}"#),
        );
        let error = outcome.error().expect("expected a failure");
        match &error.kind {
            FetchErrorKind::ApplicationReported(_, detail) => {
                assert_eq!(detail, "Error A, Error B");
            }
            other => panic!("expected an application error, got {other:?}"),
        }
        assert_eq!(error.http_status, Some(StatusCode::OK));
    }

    #[test]
    fn test_no_response_carries_no_status() {
        let outcome = classify(&request(), TransportReply::NoResponse);
        let error = outcome.error().expect("expected a failure");
        assert!(matches!(error.kind, FetchErrorKind::NoResponse(_)));
        assert_eq!(error.http_status, None);
    }

    #[test]
    fn test_transport_failure() {
        let outcome = classify(
            &request(),
            TransportReply::Failed("connection refused".into()),
        );
        let error = outcome.error().expect("expected a failure");
        match &error.kind {
            FetchErrorKind::Transport(_, detail) => assert_eq!(detail, "connection refused"),
            other => panic!("expected a transport error, got {other:?}"),
        }
    }

    #[test]
    fn test_flatten_non_array_errors() {
        assert_eq!(flatten_errors(&json!("single")), "single");
        assert_eq!(flatten_errors(&json!({"code": 1})), r#"{"code":1}"#);
        assert_eq!(flatten_errors(&json!([1, "two"])), "1, two");
    }

    #[test]
    fn test_hooks_on_failure() {
        let failures = Arc::new(AtomicUsize::new(0));
        let completions = Arc::new(AtomicUsize::new(0));
        let (f, c) = (failures.clone(), completions.clone());

        let request = request()
            .on_fail(move |error, request| {
                assert_eq!(error.request_id, request.node_id());
                f.fetch_add(1, Ordering::SeqCst);
            })
            .on_complete(move |error, value| {
                assert!(error.is_some());
                assert!(value.is_none());
                c.fetch_add(1, Ordering::SeqCst);
            });

        let outcome = classify(&request, response(500, ""));
        notify_hooks(&request, &outcome);
        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hooks_on_success() {
        let failures = Arc::new(AtomicUsize::new(0));
        let completions = Arc::new(AtomicUsize::new(0));
        let (f, c) = (failures.clone(), completions.clone());

        let request = request()
            .on_fail(move |_, _| {
                f.fetch_add(1, Ordering::SeqCst);
            })
            .on_complete(move |error, value| {
                assert!(error.is_none());
                assert_eq!(value, Some(&json!({"ok": true})));
                c.fetch_add(1, Ordering::SeqCst);
            });

        let outcome = classify(&request, response(200, r#"{"ok": true}"#));
        notify_hooks(&request, &outcome);
        assert_eq!(failures.load(Ordering::SeqCst), 0);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }
}
