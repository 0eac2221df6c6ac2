//! The aggregation core.
//!
//! A [`Pool`] is the ordered set of request descriptors for one run. Every
//! descriptor is dispatched concurrently; completions are funneled through
//! a channel into a single merge loop, which keeps the completion count and
//! the duplicate-id check free of write races.

use std::collections::hash_map::Entry;

use log::debug;
use tokio::sync::mpsc;

use crate::checker;
use crate::transport::Transport;
use crate::types::{
    Aggregate, ErrorKind, FetchError, FetchErrorKind, Outcome, Request, RequestSet,
    RequestSetEntry, Result,
};

/// The ordered set of request descriptors built for one aggregation run.
///
/// Built once by [`Pool::normalize`], immutable afterwards, consumed by
/// [`Pool::run`].
#[derive(Debug, Clone, Default)]
pub struct Pool(Vec<Request>);

impl Pool {
    /// Normalize caller input into a pool.
    ///
    /// A bare address becomes a one-element pool; a descriptor is taken as
    /// given; a sequence keeps its length and order, with bare addresses
    /// promoted to descriptors. Afterwards every descriptor lacking an
    /// explicit id gets its zero-based position (as text) assigned, so keys
    /// are stable and known before anything is dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`] for an empty sequence (such a
    /// pool could never complete) and for any descriptor with a blank uri.
    /// Duplicate ids are not rejected here; collisions are recorded at
    /// merge time.
    pub fn normalize(input: RequestSet) -> Result<Pool> {
        let mut requests = match input {
            RequestSet::Uri(uri) => vec![Request::new(uri)],
            RequestSet::Request(request) => vec![request],
            RequestSet::Sequence(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    RequestSetEntry::Uri(uri) => Request::new(uri),
                    RequestSetEntry::Request(request) => request,
                })
                .collect(),
        };

        if requests.is_empty() {
            return Err(ErrorKind::InvalidArgument(
                "the request sequence is empty".to_string(),
            ));
        }

        for (position, request) in requests.iter_mut().enumerate() {
            if request.uri.trim().is_empty() {
                return Err(ErrorKind::InvalidArgument(format!(
                    "the request at position {position} has an empty uri"
                )));
            }
            if request.id.is_none() {
                request.id = Some(position.to_string());
            }
        }

        Ok(Pool(requests))
    }

    /// Number of descriptors in the pool
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the pool holds no descriptors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The normalized descriptors, in dispatch order
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.0
    }

    /// Dispatch every descriptor concurrently and merge the outcomes.
    ///
    /// One task is spawned per descriptor, with no upper bound on in-flight
    /// fetches; pools are assumed small enough that unconditional
    /// concurrency is acceptable. Each task fetches, classifies, fires the
    /// per-descriptor hooks and sends its outcome to the merge loop below.
    /// The merge loop is the single writer of the aggregate: it records
    /// errors in arrival order, stores each outcome under its id (first
    /// writer wins on a collision, which is recorded as an extra error) and
    /// returns once every descriptor has been counted. One descriptor's
    /// failure never aborts its siblings, and nothing is retried.
    pub async fn run<T>(self, transport: &T) -> Aggregate
    where
        T: Transport + Clone + 'static,
    {
        let expected = self.0.len();
        debug!("dispatching {expected} request(s)");
        let (tx, mut rx) = mpsc::channel(expected.max(1));

        for request in self.0 {
            let transport = transport.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let reply = transport.http_get(&request.uri).await;
                let outcome = checker::classify(&request, reply);
                checker::notify_hooks(&request, &outcome);
                tx.send((request.node_id().to_owned(), outcome))
                    .await
                    .expect("outcome channel closed before the pool completed");
            });
        }
        drop(tx);

        let mut aggregate = Aggregate::default();
        let mut completed = 0;
        while completed < expected {
            // `None` means a fetch task panicked (a hook, most likely) and
            // its outcome can never arrive; bail out instead of waiting
            // forever.
            let Some((id, outcome)) = rx.recv().await else {
                break;
            };

            if let Outcome::Failed(error) = &outcome {
                aggregate.errors.push(error.clone());
            }
            match aggregate.results.entry(id) {
                Entry::Occupied(slot) => {
                    let id = slot.key().clone();
                    debug!("id collision on `{id}`, keeping the first outcome");
                    aggregate
                        .errors
                        .push(FetchError::new(FetchErrorKind::DuplicateId(id.clone()), None, id));
                }
                Entry::Vacant(slot) => {
                    slot.insert(outcome);
                }
            }
            completed += 1;
        }

        debug!(
            "pool complete: {} result(s), {} error(s)",
            aggregate.results.len(),
            aggregate.errors.len()
        );
        aggregate
    }
}
