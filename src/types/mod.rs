mod error;
mod outcome;
mod request;

pub use error::{ErrorKind, FetchError, FetchErrorKind};
pub use outcome::{Aggregate, Outcome};
pub use request::{ItemCompleteHook, ItemFailHook, Request, RequestSet, RequestSetEntry};

/// The jackdaw `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;
