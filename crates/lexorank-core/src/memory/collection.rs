use crate::{
    collection::{PersistRecord, RankScope, RankedCollection},
    error::CollectionError,
    position::Direction,
    rank::Rank,
};
use std::{
    collections::BTreeMap,
    fmt,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
};

///
/// MemoryRecord
///
/// One row: identity, an optional group value and any number of nullable
/// rank columns.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemoryRecord<G> {
    id: Option<u64>,
    group: Option<G>,
    ranks: BTreeMap<String, Rank>,
}

impl<G> MemoryRecord<G> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            id: None,
            group: None,
            ranks: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn in_group(mut self, group: G) -> Self {
        self.group = Some(group);
        self
    }

    #[must_use]
    pub fn with_rank(mut self, field: impl Into<String>, rank: impl Into<Rank>) -> Self {
        self.ranks.insert(field.into(), rank.into());
        self
    }

    #[must_use]
    pub const fn id(&self) -> Option<u64> {
        self.id
    }

    #[must_use]
    pub const fn group(&self) -> Option<&G> {
        self.group.as_ref()
    }

    pub fn set_group(&mut self, group: Option<G>) {
        self.group = group;
    }

    #[must_use]
    pub fn rank(&self, field: &str) -> Option<&Rank> {
        self.ranks.get(field)
    }
}

impl<G> Default for MemoryRecord<G> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// MemoryCollection
///
/// Thread-safe table enforcing rank uniqueness per `(group, rank column)`
/// on save. Reads hand out clones, like loading a row.
///

#[derive(Debug)]
pub struct MemoryCollection<G> {
    name: String,
    group_column: Option<String>,
    rows: Mutex<BTreeMap<u64, MemoryRecord<G>>>,
    next_id: AtomicU64,
}

impl<G> MemoryCollection<G>
where
    G: Clone + PartialEq + fmt::Display + fmt::Debug,
{
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_column: None,
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn with_group_column(mut self, column: impl Into<String>) -> Self {
        self.group_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a new row and return it with its assigned id.
    pub fn insert(&self, mut record: MemoryRecord<G>) -> Result<MemoryRecord<G>, CollectionError> {
        record.id = None;
        self.save(&mut record)?;

        Ok(record)
    }

    /// Reload a row by id.
    pub fn get(&self, id: u64) -> Result<Option<MemoryRecord<G>>, CollectionError> {
        Ok(self.rows()?.get(&id).cloned())
    }

    pub fn len(&self) -> Result<usize, CollectionError> {
        Ok(self.rows()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CollectionError> {
        Ok(self.rows()?.is_empty())
    }

    fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<u64, MemoryRecord<G>>>, CollectionError> {
        self.rows.lock().map_err(|_| CollectionError::Query {
            collection: self.name.clone(),
            message: "row table poisoned".to_string(),
        })
    }

    fn matches_group(
        &self,
        record: &MemoryRecord<G>,
        scope: &RankScope<'_, u64, G>,
    ) -> Result<bool, CollectionError> {
        let Some(filter) = &scope.group else {
            return Ok(true);
        };

        if self.group_column.as_deref() != Some(filter.field) {
            return Err(CollectionError::Query {
                collection: self.name.clone(),
                message: format!("unknown group column '{}'", filter.field),
            });
        }

        Ok(record.group.as_ref() == filter.value)
    }

    // Ascending by rank; id breaks ties so reads are stable even when the
    // uniqueness check has been bypassed.
    fn scoped(
        &self,
        scope: &RankScope<'_, u64, G>,
    ) -> Result<Vec<MemoryRecord<G>>, CollectionError> {
        let rows = self.rows()?;
        let mut matched = Vec::new();

        for record in rows.values() {
            if record.rank(scope.field).is_none() {
                continue;
            }
            if scope.exclude.is_some() && record.id.as_ref() == scope.exclude {
                continue;
            }
            if !self.matches_group(record, scope)? {
                continue;
            }
            matched.push(record.clone());
        }

        matched.sort_by(|a, b| {
            a.rank(scope.field)
                .cmp(&b.rank(scope.field))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(matched)
    }
}

impl<G> RankedCollection for MemoryCollection<G>
where
    G: Clone + PartialEq + fmt::Display + fmt::Debug,
{
    type Record = MemoryRecord<G>;
    type Id = u64;
    type GroupKey = G;

    fn record_id(&self, record: &Self::Record) -> Option<u64> {
        record.id
    }

    fn rank(&self, record: &Self::Record, field: &str) -> Option<Rank> {
        record.rank(field).cloned()
    }

    fn assign_rank(&self, record: &mut Self::Record, field: &str, rank: Rank) {
        record.ranks.insert(field.to_string(), rank);
    }

    fn group_key(&self, record: &Self::Record, field: &str) -> Option<G> {
        if self.group_column.as_deref() == Some(field) {
            record.group.clone()
        } else {
            None
        }
    }

    fn last(&self, scope: &RankScope<'_, u64, G>) -> Result<Option<Self::Record>, CollectionError> {
        Ok(self.scoped(scope)?.pop())
    }

    fn window(
        &self,
        scope: &RankScope<'_, u64, G>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Self::Record>, CollectionError> {
        Ok(self
            .scoped(scope)?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    fn ordered(
        &self,
        scope: &RankScope<'_, u64, G>,
        direction: Direction,
    ) -> Result<Vec<Self::Record>, CollectionError> {
        let mut records = self.scoped(scope)?;
        if direction == Direction::Desc {
            records.reverse();
        }

        Ok(records)
    }
}

impl<G> PersistRecord for MemoryCollection<G>
where
    G: Clone + PartialEq + fmt::Display + fmt::Debug,
{
    fn save(&self, record: &mut Self::Record) -> Result<(), CollectionError> {
        let mut rows = self.rows()?;

        for (field, rank) in &record.ranks {
            let taken = rows.values().any(|other| {
                other.id != record.id
                    && other.group == record.group
                    && other.rank(field) == Some(rank)
            });

            if taken {
                return Err(CollectionError::Conflict {
                    collection: self.name.clone(),
                    message: format!("{field} {:?} already taken in its group", rank.as_str()),
                });
            }
        }

        let id = match record.id {
            Some(id) => id,
            None => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                record.id = Some(id);
                id
            }
        };
        rows.insert(id, record.clone());

        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> MemoryCollection<u64> {
        MemoryCollection::new("paragraphs").with_group_column("page_id")
    }

    #[test]
    fn unranked_rows_are_invisible_to_ranked_reads() {
        let table = collection();
        table.insert(MemoryRecord::new()).expect("insert");
        table
            .insert(MemoryRecord::new().with_rank("rank", "U"))
            .expect("insert");

        let all = table
            .ordered(&RankScope::new("rank"), Direction::Asc)
            .expect("read");
        assert_eq!(all.len(), 1);
        assert_eq!(table.len().expect("len"), 2);
    }

    #[test]
    fn save_rejects_duplicate_rank_within_group_only() {
        let table = collection();
        table
            .insert(MemoryRecord::new().in_group(1).with_rank("rank", "U"))
            .expect("first row");

        table
            .insert(MemoryRecord::new().in_group(2).with_rank("rank", "U"))
            .expect("same rank in another group");

        let err = table
            .insert(MemoryRecord::new().in_group(1).with_rank("rank", "U"))
            .expect_err("duplicate rank in group 1");
        assert!(matches!(err, CollectionError::Conflict { .. }));
    }

    #[test]
    fn scope_filters_group_and_excluded_record() {
        let table = collection();
        let a = table
            .insert(MemoryRecord::new().in_group(1).with_rank("rank", "a"))
            .expect("a");
        table
            .insert(MemoryRecord::new().in_group(1).with_rank("rank", "c"))
            .expect("c");
        table
            .insert(MemoryRecord::new().in_group(2).with_rank("rank", "b"))
            .expect("b");

        let id = a.id();
        let scope = RankScope::new("rank")
            .in_group("page_id", Some(&1))
            .excluding(id.as_ref());
        let first = table.first(&scope).expect("read").expect("one left");

        assert_eq!(first.rank("rank").map(Rank::as_str), Some("c"));
    }

    #[test]
    fn unknown_group_column_is_a_query_error() {
        let table = collection();
        let scope = RankScope::new("rank").in_group("book_id", Some(&1));

        assert!(matches!(
            table.last(&scope),
            Err(CollectionError::Query { .. })
        ));
    }
}
