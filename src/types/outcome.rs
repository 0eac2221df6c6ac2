use std::collections::HashMap;
use std::fmt::Display;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::FetchError;

/// Result of one descriptor's fetch: the decoded payload or one classified
/// error, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The response body decoded to this JSON value
    Success(Value),
    /// The fetch failed somewhere between transport and payload
    Failed(FetchError),
}

impl Outcome {
    /// Whether this outcome holds a decoded payload
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The decoded payload, if this outcome is a success
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    /// The classified error, if this outcome is a failure
    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failed(error) => Some(error),
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success(value) => write!(f, "{value}"),
            Outcome::Failed(error) => write!(f, "{error}"),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Outcome::Success(value) => value.serialize(serializer),
            Outcome::Failed(error) => error.serialize(serializer),
        }
    }
}

/// Everything one aggregation run produced.
///
/// `results` holds one entry per distinct descriptor id; on an id collision
/// the first arrival keeps the slot. `errors` holds every classified
/// failure, ordered by completion arrival, which is timing-dependent when
/// several fetches fail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregate {
    /// Outcome per descriptor id
    pub results: HashMap<String, Outcome>,
    /// All classified errors, in arrival order
    pub errors: Vec<FetchError>,
}

impl Aggregate {
    /// Whether every descriptor in the run succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Outcome stored under the given descriptor id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Outcome> {
        self.results.get(id)
    }
}
