use std::{fmt, time::Duration};
use thiserror::Error as ThisError;

/// Boxed error produced by a caller-supplied finalize step.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

///
/// InvalidRankError
///
/// The generator could not produce a value strictly below the upper bound.
/// Only reachable through caller misuse (asking for a rank below `MIN_CHAR`,
/// above `MAX_CHAR`, or between equal bounds).
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error(
    "no rank fits strictly between {} and {}; the supplied bounds are out of range or not ordered",
    render_bound(.before.as_deref()),
    render_bound(.after.as_deref())
)]
pub struct InvalidRankError {
    pub before: Option<String>,
    pub after: Option<String>,
}

impl InvalidRankError {
    pub(crate) fn new(before: Option<&str>, after: Option<&str>) -> Self {
        Self {
            before: before.map(str::to_string),
            after: after.map(str::to_string),
        }
    }
}

fn render_bound(bound: Option<&str>) -> String {
    bound.map_or_else(|| "nil".to_string(), |value| format!("{value:?}"))
}

///
/// InvalidConfigError
///
/// Registration-time misconfiguration. A collection type that fails with
/// this error never becomes ranking-capable.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum InvalidConfigError {
    #[error("the ranking field cannot be empty")]
    MissingField,

    #[error(
        "cannot enable advisory locks for '{collection}': no named-lock provider was supplied"
    )]
    LockUnavailable { collection: String },
}

///
/// CollectionError
///
/// Failure reported by the ordered collection a ranking runs against.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CollectionError {
    #[error("rank conflict in '{collection}': {message}")]
    Conflict { collection: String, message: String },

    #[error("query against '{collection}' failed: {message}")]
    Query { collection: String, message: String },
}

///
/// LockError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum LockError {
    #[error("timed out after {timeout:?} waiting for lock '{name}'")]
    Timeout { name: String, timeout: Duration },

    #[error("lock '{name}' is unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    Internal,
    InvariantViolation,
    Unavailable,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::Unavailable => "unavailable",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Rank,
    Collection,
    Lock,
    Finalize,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Rank => "rank",
            Self::Collection => "collection",
            Self::Lock => "lock",
            Self::Finalize => "finalize",
        };
        write!(f, "{label}")
    }
}

///
/// RankingError
///
/// Everything a `move_to` call can surface to its caller.
/// Rank failures are never retried or swallowed: retrying with the same
/// neighbors reproduces the same failure.
///

#[derive(Debug, ThisError)]
pub enum RankingError {
    #[error(transparent)]
    InvalidRank(#[from] InvalidRankError),

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("finalize step failed: {0}")]
    Finalize(#[source] BoxError),
}

impl RankingError {
    /// Wrap a failure raised by a caller-supplied finalize step.
    pub fn finalize(err: impl Into<BoxError>) -> Self {
        Self::Finalize(err.into())
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidRank(_) => ErrorClass::InvariantViolation,
            Self::Collection(CollectionError::Conflict { .. }) => ErrorClass::Conflict,
            Self::Collection(CollectionError::Query { .. }) | Self::Finalize(_) => {
                ErrorClass::Internal
            }
            Self::Lock(_) => ErrorClass::Unavailable,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::InvalidRank(_) => ErrorOrigin::Rank,
            Self::Collection(_) => ErrorOrigin::Collection,
            Self::Lock(_) => ErrorOrigin::Lock,
            Self::Finalize(_) => ErrorOrigin::Finalize,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin(), self.class())
    }
}

///
/// TESTS
///
