//! Position resolution: map a requested slot onto the pair of neighbors
//! whose ranks bound the new rank.

use crate::{
    collection::{RankScope, RankedCollection},
    error::{CollectionError, InvalidRankError},
    position::Position,
    rank::{Rank, value_between},
};

///
/// Neighbors
///
/// Records immediately before and after the requested slot. `None` marks an
/// open boundary.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Neighbors<R> {
    pub before: Option<R>,
    pub after: Option<R>,
}

///
/// Resolution
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// The record already sits in the requested slot; its rank is kept.
    Reused(Rank),
    Generated(Rank),
}

impl Resolution {
    #[must_use]
    pub fn into_rank(self) -> Rank {
        match self {
            Self::Reused(rank) | Self::Generated(rank) => rank,
        }
    }
}

/// Resolve the neighbors of `position` within `scope`.
///
/// The scope is expected to exclude the record being moved. An index past
/// the end of the view resolves like `Position::End`.
pub fn resolve_neighbors<C: RankedCollection>(
    collection: &C,
    scope: &RankScope<'_, C::Id, C::GroupKey>,
    position: Position,
) -> Result<Neighbors<C::Record>, CollectionError> {
    let (before, after) = match position {
        Position::End => (collection.last(scope)?, None),
        Position::At(0) => (None, collection.first(scope)?),
        Position::At(index) => {
            let mut window = collection.window(scope, index - 1, 2)?.into_iter();
            (window.next(), window.next())
        }
    };

    if before.is_none() && after.is_none() {
        return Ok(Neighbors {
            before: collection.last(scope)?,
            after: None,
        });
    }

    Ok(Neighbors { before, after })
}

/// Pick the rank for `record` between its resolved neighbors.
///
/// A record whose current rank already lies strictly between the neighbor
/// ranks keeps it, so repeating a move is a no-op on the rank value.
pub fn resolve_rank<C: RankedCollection>(
    collection: &C,
    field: &str,
    record: &C::Record,
    neighbors: &Neighbors<C::Record>,
) -> Result<Resolution, InvalidRankError> {
    let before = neighbors
        .before
        .as_ref()
        .and_then(|r| collection.rank(r, field));
    let after = neighbors
        .after
        .as_ref()
        .and_then(|r| collection.rank(r, field));

    if let Some(current) = collection.rank(record, field)
        && before.as_ref().is_none_or(|b| current > *b)
        && after.as_ref().is_none_or(|a| current < *a)
    {
        return Ok(Resolution::Reused(current));
    }

    value_between(
        before.as_ref().map(Rank::as_str),
        after.as_ref().map(Rank::as_str),
    )
    .map(Resolution::Generated)
}
