mod generate;

pub use generate::value_between;

use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};

///
/// CONSTANTS
///

/// Lowest character a generated rank is built from.
pub const MIN_CHAR: char = '0';

/// Highest character a generated rank is built from.
/// No generated rank ever reaches `"z"` itself; it is the open upper bound.
pub const MAX_CHAR: char = 'z';

///
/// Rank
///
/// Immutable sort key for one record. Ranks compare by byte order, which for
/// UTF-8 is code point order; the backing column must use a binary collation
/// for the storage sort to agree with this `Ord`.
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[deref(forward)]
#[serde(transparent)]
pub struct Rank(String);

impl Rank {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Rank {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Rank {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

impl AsRef<str> for Rank {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Rank {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Rank {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

///
/// TESTS
///
