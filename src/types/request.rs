use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::FetchError;

/// Hook invoked once a descriptor's fetch has been classified, with the
/// classified error (if any) and the decoded payload (if any).
pub type ItemCompleteHook = Arc<dyn Fn(Option<&FetchError>, Option<&Value>) + Send + Sync>;

/// Hook invoked when a descriptor's fetch produced an error, with the error
/// and the descriptor it belongs to.
pub type ItemFailHook = Arc<dyn Fn(&FetchError, &Request) + Send + Sync>;

/// A single fetch unit: an address, an optional stable identifier and
/// optional completion hooks.
///
/// The `id` is the key under which this descriptor's outcome lands in the
/// aggregate. Descriptors without an explicit id get their zero-based pool
/// position (as text) assigned during normalization, before any fetch is
/// dispatched.
#[derive(Clone, Default)]
pub struct Request {
    /// The resource to fetch
    pub uri: String,
    /// Aggregate key for this descriptor's outcome
    pub id: Option<String>,
    /// Invoked once this descriptor's fetch completes, error or not
    pub on_complete: Option<ItemCompleteHook>,
    /// Invoked once this descriptor's fetch completes with an error
    pub on_fail: Option<ItemFailHook>,
}

impl Request {
    /// Create a descriptor for the given address
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Set an explicit aggregate key for this descriptor
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach a hook invoked once this descriptor's fetch is classified
    #[must_use]
    pub fn on_complete<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&FetchError>, Option<&Value>) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(hook));
        self
    }

    /// Attach a hook invoked when this descriptor's fetch fails
    #[must_use]
    pub fn on_fail<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FetchError, &Request) + Send + Sync + 'static,
    {
        self.on_fail = Some(Arc::new(hook));
        self
    }

    /// The assigned aggregate key.
    ///
    /// Empty before normalization has run; afterwards always set.
    pub(crate) fn node_id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("uri", &self.uri)
            .field("id", &self.id)
            .field("on_complete", &self.on_complete.as_ref().map(|_| "<hook>"))
            .field("on_fail", &self.on_fail.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl From<&str> for Request {
    fn from(uri: &str) -> Self {
        Request::new(uri)
    }
}

impl From<String> for Request {
    fn from(uri: String) -> Self {
        Request::new(uri)
    }
}

/// One element of a request sequence: a bare address or a full descriptor.
#[derive(Debug, Clone)]
pub enum RequestSetEntry {
    /// A bare address, turned into a descriptor during normalization
    Uri(String),
    /// A descriptor, passed through unchanged
    Request(Request),
}

impl From<&str> for RequestSetEntry {
    fn from(uri: &str) -> Self {
        RequestSetEntry::Uri(uri.to_owned())
    }
}

impl From<String> for RequestSetEntry {
    fn from(uri: String) -> Self {
        RequestSetEntry::Uri(uri)
    }
}

impl From<Request> for RequestSetEntry {
    fn from(request: Request) -> Self {
        RequestSetEntry::Request(request)
    }
}

/// The accepted input shapes for one aggregation run.
///
/// This is an explicit tagged union instead of runtime type-sniffing:
/// anything that is not one of these three shapes does not compile, and an
/// empty sequence is rejected during normalization.
#[derive(Debug, Clone)]
pub enum RequestSet {
    /// A single address
    Uri(String),
    /// A single fully-specified descriptor
    Request(Request),
    /// An ordered mix of addresses and descriptors
    Sequence(Vec<RequestSetEntry>),
}

impl From<&str> for RequestSet {
    fn from(uri: &str) -> Self {
        RequestSet::Uri(uri.to_owned())
    }
}

impl From<String> for RequestSet {
    fn from(uri: String) -> Self {
        RequestSet::Uri(uri)
    }
}

impl From<Request> for RequestSet {
    fn from(request: Request) -> Self {
        RequestSet::Request(request)
    }
}

impl From<Vec<RequestSetEntry>> for RequestSet {
    fn from(entries: Vec<RequestSetEntry>) -> Self {
        RequestSet::Sequence(entries)
    }
}

impl From<Vec<&str>> for RequestSet {
    fn from(uris: Vec<&str>) -> Self {
        RequestSet::Sequence(uris.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for RequestSet {
    fn from(uris: Vec<String>) -> Self {
        RequestSet::Sequence(uris.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<Request>> for RequestSet {
    fn from(requests: Vec<Request>) -> Self {
        RequestSet::Sequence(requests.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_style_descriptor() {
        let request = Request::new("https://example.com")
            .with_id("home")
            .on_complete(|_, _| {})
            .on_fail(|_, _| {});
        assert_eq!(request.uri, "https://example.com");
        assert_eq!(request.id.as_deref(), Some("home"));
        assert!(request.on_complete.is_some());
        assert!(request.on_fail.is_some());
    }

    #[test]
    fn test_debug_hides_hook_internals() {
        let request = Request::new("https://example.com").on_fail(|_, _| {});
        let out = format!("{request:?}");
        assert!(out.contains("<hook>"));
        assert!(out.contains("https://example.com"));
    }

    #[test]
    fn test_node_id_defaults_to_empty() {
        assert_eq!(Request::new("https://example.com").node_id(), "");
    }

    #[test]
    fn test_input_conversions() {
        assert!(matches!(RequestSet::from("a"), RequestSet::Uri(_)));
        assert!(matches!(
            RequestSet::from(Request::new("a")),
            RequestSet::Request(_)
        ));
        let set = RequestSet::from(vec!["a", "b"]);
        match set {
            RequestSet::Sequence(entries) => assert_eq!(entries.len(), 2),
            other => panic!("expected a sequence, got {other:?}"),
        }
    }
}
