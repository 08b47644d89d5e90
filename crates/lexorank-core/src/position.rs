use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Position
///
/// Target slot for a move, counted in the final order of the record's group.
/// Indexes past the current length clamp to `End`.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Position {
    At(usize),
    End,
}

impl Position {
    pub const TOP: Self = Self::At(0);

    #[must_use]
    pub const fn is_top(self) -> bool {
        matches!(self, Self::At(0))
    }
}

impl From<usize> for Position {
    fn from(index: usize) -> Self {
        Self::At(index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(index) => write!(f, "{index}"),
            Self::End => write!(f, "end"),
        }
    }
}

///
/// Direction
///
/// Sort direction for the ranked view.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

///
/// TESTS
///
