//! Boundary to the persisted collection a ranking runs against.
//!
//! The store owns insertion, uniqueness and transactions. The core only reads
//! ordered windows and stages the new rank on the in-memory record.

use crate::{error::CollectionError, position::Direction, rank::Rank};
use std::fmt;

///
/// GroupFilter
///
/// Restricts a ranked view to one group. A `None` value matches records
/// whose group column is null.
///

#[derive(Clone, Copy, Debug)]
pub struct GroupFilter<'a, G> {
    pub field: &'a str,
    pub value: Option<&'a G>,
}

///
/// RankScope
///
/// Filter for one ranked view: records with a non-null `field`, optionally
/// restricted to one group, optionally excluding the record being moved.
///

#[derive(Clone, Copy, Debug)]
pub struct RankScope<'a, I, G> {
    pub field: &'a str,
    pub group: Option<GroupFilter<'a, G>>,
    pub exclude: Option<&'a I>,
}

impl<'a, I, G> RankScope<'a, I, G> {
    #[must_use]
    pub const fn new(field: &'a str) -> Self {
        Self {
            field,
            group: None,
            exclude: None,
        }
    }

    #[must_use]
    pub const fn in_group(mut self, field: &'a str, value: Option<&'a G>) -> Self {
        self.group = Some(GroupFilter { field, value });
        self
    }

    #[must_use]
    pub const fn excluding(mut self, id: Option<&'a I>) -> Self {
        self.exclude = id;
        self
    }
}

///
/// RankedCollection
///
/// Queryable view over the records of one collection type.
///
/// Every query sees only records whose rank `field` is non-null, ordered by
/// that field in byte order, and honors the scope's group and exclusion.
///

pub trait RankedCollection {
    type Record;
    type Id: PartialEq + fmt::Debug;
    type GroupKey: Clone + PartialEq + fmt::Display + fmt::Debug;

    /// Identity of a record, or `None` if it has never been stored.
    fn record_id(&self, record: &Self::Record) -> Option<Self::Id>;

    fn rank(&self, record: &Self::Record, field: &str) -> Option<Rank>;

    /// Stage a rank on the in-memory record. Persisting it is the caller's job.
    fn assign_rank(&self, record: &mut Self::Record, field: &str, rank: Rank);

    fn group_key(&self, record: &Self::Record, field: &str) -> Option<Self::GroupKey>;

    fn first(
        &self,
        scope: &RankScope<'_, Self::Id, Self::GroupKey>,
    ) -> Result<Option<Self::Record>, CollectionError> {
        Ok(self.window(scope, 0, 1)?.into_iter().next())
    }

    fn last(
        &self,
        scope: &RankScope<'_, Self::Id, Self::GroupKey>,
    ) -> Result<Option<Self::Record>, CollectionError>;

    /// Up to `limit` records starting at `offset` in ascending rank order.
    fn window(
        &self,
        scope: &RankScope<'_, Self::Id, Self::GroupKey>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Self::Record>, CollectionError>;

    /// The full ranked view in the requested direction.
    fn ordered(
        &self,
        scope: &RankScope<'_, Self::Id, Self::GroupKey>,
        direction: Direction,
    ) -> Result<Vec<Self::Record>, CollectionError>;
}

///
/// PersistRecord
///
/// Write path used by the `*_and_save` helpers.
///

pub trait PersistRecord: RankedCollection {
    fn save(&self, record: &mut Self::Record) -> Result<(), CollectionError>;
}
