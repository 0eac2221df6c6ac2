//! Handler of fetch operations.
//!
//! This module defines two structs, [`Client`] and [`ClientBuilder`].
//! `Client` is the reqwest-backed [`Transport`] and the main entry point
//! for aggregation runs. `ClientBuilder` exposes a finer level of
//! granularity for building a `Client`.
//!
//! For convenience, a free function [`fetch_all`] is provided for ad-hoc
//! aggregation runs.

use std::time::Duration;

use async_trait::async_trait;
use http::header::{self, HeaderMap, HeaderValue};
use typed_builder::TypedBuilder;

use crate::pool::Pool;
use crate::transport::{Transport, TransportReply};
use crate::types::{Aggregate, RequestSet, Result};

/// Default number of redirects before a fetch is deemed as failed, 5.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
/// Default timeout in seconds before a fetch is deemed as failed, 9.
pub const DEFAULT_TIMEOUT_SECS: u64 = 9;
/// Default user agent, `jackdaw-<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("jackdaw/", env!("CARGO_PKG_VERSION"));

/// Builder for [`Client`].
///
/// See crate-level documentation for usage example.
#[derive(TypedBuilder, Debug, Clone)]
#[builder(field_defaults(default, setter(into)))]
pub struct ClientBuilder {
    /// User-agent used for fetching resources.
    ///
    /// *NOTE*: This may be helpful for bypassing certain firewalls.
    #[builder(default_code = "String::from(DEFAULT_USER_AGENT)")]
    user_agent: String,

    /// When `true`, accept invalid SSL certificates.
    ///
    /// ## Warning
    ///
    /// If invalid certificates are trusted, any certificate for any site
    /// will be trusted for use, including expired ones. Only use this as a
    /// last resort.
    allow_insecure: bool,

    /// Maximum number of redirects per fetch before returning an error.
    #[builder(default = DEFAULT_MAX_REDIRECTS)]
    max_redirects: usize,

    /// Response timeout per fetch.
    ///
    /// The timeout is owned by the transport: a fetch that exceeds it is
    /// reported back as a transport failure and classified like any other.
    timeout: Option<Duration>,
}

impl Default for ClientBuilder {
    #[must_use]
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientBuilder {
    /// Instantiates a [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if:
    /// - The user-agent is invalid.
    /// - The request client cannot be created.
    ///   See [here](https://docs.rs/reqwest/latest/reqwest/struct.ClientBuilder.html#errors).
    pub fn client(self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_str(&self.user_agent)?);

        let timeout = self
            .timeout
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let reqwest_client = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers)
            .danger_accept_invalid_certs(self.allow_insecure)
            .redirect(reqwest::redirect::Policy::limited(self.max_redirects))
            .timeout(timeout)
            .build()?;

        Ok(Client { reqwest_client })
    }
}

/// Fetches JSON resources and aggregates the outcomes.
///
/// See [`ClientBuilder`] which contains sane defaults for all configuration
/// options.
#[derive(Debug, Clone)]
pub struct Client {
    /// HTTP request client.
    ///
    /// [reqwest]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
    reqwest_client: reqwest::Client,
}

impl Client {
    /// Fetch every resource in `input` concurrently and merge the outcomes
    /// into one aggregate.
    ///
    /// `input` is a bare address, a single [`Request`](crate::Request), or
    /// an ordered sequence of either. The returned aggregate maps each
    /// descriptor's id to its outcome and lists every classified failure.
    ///
    /// # Errors
    ///
    /// Returns an `Err` only for invalid input (see [`Pool::normalize`]);
    /// fetch failures are non-fatal and land inside the aggregate.
    pub async fn fetch_all<T>(&self, input: T) -> Result<Aggregate>
    where
        T: Into<RequestSet>,
    {
        let pool = Pool::normalize(input.into())?;
        Ok(pool.run(self).await)
    }
}

#[async_trait]
impl Transport for Client {
    async fn http_get(&self, uri: &str) -> TransportReply {
        let response = match self.reqwest_client.get(uri).send().await {
            Ok(response) => response,
            Err(e) => return TransportReply::Failed(e.to_string()),
        };
        let status = response.status();
        match response.text().await {
            Ok(body) => TransportReply::Response { status, body },
            // A status line arrived but the body never completed.
            Err(_) => TransportReply::NoResponse,
        }
    }
}

/// A convenience function to run one aggregation with a default client.
///
/// This provides the simplest fetch-and-merge utility without having to
/// create a [`Client`]. For more complex scenarios, see documentation of
/// [`ClientBuilder`] instead.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The request client cannot be built (see [`ClientBuilder::client`] for
///   failure cases).
/// - The input is invalid (see [`Client::fetch_all`] for failure cases).
pub async fn fetch_all<T>(input: T) -> Result<Aggregate>
where
    T: Into<RequestSet>,
{
    let client = ClientBuilder::default().client()?;
    client.fetch_all(input).await
}
