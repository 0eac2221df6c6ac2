//! `jackdaw` fetches a set of remote JSON resources concurrently and merges
//! their payloads (and failures) into a single keyed aggregate.
//!
//! "Hello world" example:
//! ```no_run
//! use jackdaw::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let aggregate = jackdaw::fetch_all("https://example.com/data.json").await?;
//!     println!("{:?}", aggregate.get("0"));
//!     Ok(())
//! }
//! ```
//!
//! For more specific use-cases you can build a jackdaw client yourself,
//! using the `ClientBuilder` which can be used to configure your own
//! aggregator and grants full flexibility:
//!
//! ```no_run
//! use std::time::Duration;
//! use jackdaw::{ClientBuilder, Request, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ClientBuilder::builder()
//!         .timeout(Duration::from_secs(3))
//!         .build()
//!         .client()?;
//!     let aggregate = client
//!         .fetch_all(vec![
//!             Request::new("https://example.com/uk.json").with_id("UK"),
//!             Request::new("https://example.com/fr.json").with_id("FR"),
//!         ])
//!         .await?;
//!     for error in &aggregate.errors {
//!         eprintln!("{error}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Every descriptor is fetched concurrently; the aggregate resolves exactly
//! once, after the last fetch has been classified, regardless of arrival
//! order. Individual fetch failures never abort their siblings; they land
//! in [`Aggregate::errors`] and as [`Outcome::Failed`] slots in
//! [`Aggregate::results`].

mod checker;
mod client;
mod pool;
mod transport;
mod types;

#[cfg(test)]
#[macro_use]
pub mod test_utils;

pub use client::{
    fetch_all, Client, ClientBuilder, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
pub use pool::Pool;
pub use transport::{Transport, TransportReply};
pub use types::*;
