use crate::{
    collection::{PersistRecord, RankScope, RankedCollection},
    config::RankingConfig,
    error::{BoxError, CollectionError, InvalidConfigError, RankingError},
    guard::{ConcurrencyGuard, LockOptions, LockProvider, default_lock_name},
    obs::sink::{self, RankingEvent},
    position::{Direction, Position},
    rank::Rank,
    resolve::{Resolution, resolve_neighbors, resolve_rank},
    schema::Schema,
};
use std::{fmt, marker::PhantomData, sync::Arc};
use tracing::{debug, warn};

///
/// Ranking
///
/// Ranking capability of one collection type: validated configuration plus
/// the operations that position records within it.
///
/// Built once by [`Ranking::register`] and shared read-only afterwards.
/// Every move re-reads its neighbors; nothing is cached between calls.
///

pub struct Ranking<C: RankedCollection> {
    collection: String,
    field: String,
    group_by: Option<String>,
    guard: Option<ConcurrencyGuard<C::Record>>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: RankedCollection> Ranking<C> {
    /// Validate `config` against `schema` and build the ranking capability.
    ///
    /// Returns `Ok(None)` when the rank field is not a column of the
    /// schema: a warning is emitted and the type stays unranked. A group
    /// field that resolves to neither an association nor a column disables
    /// grouping with a warning.
    pub fn register(
        schema: &Schema,
        config: RankingConfig<C::Record>,
        provider: Option<Arc<dyn LockProvider>>,
    ) -> Result<Option<Self>, InvalidConfigError> {
        let collection = schema.table();
        let RankingConfig {
            field,
            group_by,
            advisory_lock,
        } = config;

        let lock_enabled = advisory_lock.enabled.unwrap_or(provider.is_some());
        if lock_enabled && provider.is_none() {
            return Err(InvalidConfigError::LockUnavailable {
                collection: collection.to_string(),
            });
        }

        if field.trim().is_empty() {
            return Err(InvalidConfigError::MissingField);
        }

        let group_by = group_by.and_then(|name| resolve_group_field(schema, &name));

        if !schema.column_exists(&field) {
            warn!(collection, field = %field, "rank field is not a column; ranking disabled");
            sink::record(RankingEvent::ConfigWarning { collection });

            return Ok(None);
        }

        let guard = match provider {
            Some(provider) if lock_enabled => Some(ConcurrencyGuard::new(
                provider,
                advisory_lock.lock_name,
                advisory_lock.options,
            )),
            _ => None,
        };

        debug!(
            collection,
            field = %field,
            group_by = ?group_by,
            lock_enabled = guard.is_some(),
            "ranking registered"
        );
        sink::record(RankingEvent::Registered { collection });

        Ok(Some(Self {
            collection: collection.to_string(),
            field,
            group_by,
            guard,
            _marker: PhantomData,
        }))
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Resolved group column (an association's foreign key when grouping
    /// was configured by association name).
    #[must_use]
    pub fn group_by(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    #[must_use]
    pub const fn lock_enabled(&self) -> bool {
        self.guard.is_some()
    }

    #[must_use]
    pub fn lock_options(&self) -> Option<&LockOptions> {
        self.guard.as_ref().map(ConcurrencyGuard::options)
    }

    /// Name of the lock a guarded move of `record` takes, if locking is on.
    #[must_use]
    pub fn lock_name(&self, collection: &C, record: &C::Record) -> Option<String> {
        self.guard
            .as_ref()
            .map(|guard| self.resolve_lock_name(collection, guard, record))
    }

    #[must_use]
    pub fn has_rank(&self, collection: &C, record: &C::Record) -> bool {
        collection.rank(record, &self.field).is_some()
    }

    /// All ranked records across every group.
    pub fn ranked(
        &self,
        collection: &C,
        direction: Direction,
    ) -> Result<Vec<C::Record>, CollectionError> {
        collection.ordered(&RankScope::new(&self.field), direction)
    }

    /// Ranked records of one group. Without grouping this is `ranked`.
    pub fn ranked_in(
        &self,
        collection: &C,
        group: Option<&C::GroupKey>,
        direction: Direction,
    ) -> Result<Vec<C::Record>, CollectionError> {
        let mut scope = RankScope::new(&self.field);
        if let Some(group_field) = self.group_by.as_deref() {
            scope = scope.in_group(group_field, group);
        }

        collection.ordered(&scope, direction)
    }

    /// Stage the rank for `position` on `record` and return it.
    pub fn move_to(
        &self,
        collection: &C,
        record: &mut C::Record,
        position: impl Into<Position>,
    ) -> Result<Rank, RankingError> {
        self.guarded(collection, record, position.into(), None, |_, rank| Ok(rank))
    }

    pub fn move_to_top(
        &self,
        collection: &C,
        record: &mut C::Record,
    ) -> Result<Rank, RankingError> {
        self.move_to(collection, record, Position::TOP)
    }

    pub fn move_to_end(
        &self,
        collection: &C,
        record: &mut C::Record,
    ) -> Result<Rank, RankingError> {
        self.move_to(collection, record, Position::End)
    }

    /// Move, then run `finalize` on the updated record.
    ///
    /// With locking on, `finalize` runs inside the lock so the neighbor read,
    /// rank computation and persistence are atomic against other guarded
    /// moves on the same lock name.
    pub fn move_to_with<T, E, F>(
        &self,
        collection: &C,
        record: &mut C::Record,
        position: impl Into<Position>,
        finalize: F,
    ) -> Result<T, RankingError>
    where
        E: Into<BoxError>,
        F: FnOnce(&mut C::Record) -> Result<T, E>,
    {
        self.guarded(collection, record, position.into(), None, |record, _| {
            finalize(record).map_err(RankingError::finalize)
        })
    }

    /// `move_to_with`, layering `overrides` over the configured lock options.
    pub fn move_to_with_options<T, E, F>(
        &self,
        collection: &C,
        record: &mut C::Record,
        position: impl Into<Position>,
        overrides: &LockOptions,
        finalize: F,
    ) -> Result<T, RankingError>
    where
        E: Into<BoxError>,
        F: FnOnce(&mut C::Record) -> Result<T, E>,
    {
        self.guarded(
            collection,
            record,
            position.into(),
            Some(overrides),
            |record, _| finalize(record).map_err(RankingError::finalize),
        )
    }

    fn guarded<T>(
        &self,
        collection: &C,
        record: &mut C::Record,
        position: Position,
        overrides: Option<&LockOptions>,
        finalize: impl FnOnce(&mut C::Record, Rank) -> Result<T, RankingError>,
    ) -> Result<T, RankingError> {
        let Some(guard) = &self.guard else {
            let rank = self.reposition(collection, record, position)?;
            return finalize(record, rank);
        };

        let name = self.resolve_lock_name(collection, guard, record);
        guard.run(&name, overrides, || {
            let rank = self.reposition(collection, record, position)?;
            finalize(record, rank)
        })
    }

    fn reposition(
        &self,
        collection: &C,
        record: &mut C::Record,
        position: Position,
    ) -> Result<Rank, RankingError> {
        sink::record(RankingEvent::MoveStart {
            collection: &self.collection,
        });

        let id = collection.record_id(record);
        let group = self
            .group_by
            .as_deref()
            .map(|field| (field, collection.group_key(record, field)));

        let mut scope = RankScope::new(&self.field).excluding(id.as_ref());
        if let Some((field, value)) = &group {
            scope = scope.in_group(field, value.as_ref());
        }

        let neighbors = resolve_neighbors(collection, &scope, position)?;
        let resolution = match resolve_rank(collection, &self.field, record, &neighbors) {
            Ok(resolution) => resolution,
            Err(err) => {
                sink::record(RankingEvent::RankRejected {
                    collection: &self.collection,
                });
                return Err(err.into());
            }
        };

        match &resolution {
            Resolution::Reused(_) => sink::record(RankingEvent::RankReused {
                collection: &self.collection,
            }),
            Resolution::Generated(rank) => sink::record(RankingEvent::RankGenerated {
                collection: &self.collection,
                len: rank.len(),
            }),
        }

        let rank = resolution.into_rank();
        debug!(
            collection = %self.collection,
            record = ?id,
            %position,
            %rank,
            "rank resolved"
        );
        collection.assign_rank(record, &self.field, rank.clone());

        Ok(rank)
    }

    fn resolve_lock_name(
        &self,
        collection: &C,
        guard: &ConcurrencyGuard<C::Record>,
        record: &C::Record,
    ) -> String {
        guard.lock_name(record, || {
            let group = self
                .group_by
                .as_deref()
                .map(|field| collection.group_key(record, field));

            default_lock_name(
                &self.collection,
                &self.field,
                group.as_ref().map(Option::as_ref),
            )
        })
    }
}

impl<C: PersistRecord> Ranking<C> {
    /// Move and save in one step (inside the lock when locking is on).
    pub fn move_to_and_save(
        &self,
        collection: &C,
        record: &mut C::Record,
        position: impl Into<Position>,
    ) -> Result<Rank, RankingError> {
        self.guarded(collection, record, position.into(), None, |record, rank| {
            collection.save(record)?;
            Ok(rank)
        })
    }

    pub fn move_to_top_and_save(
        &self,
        collection: &C,
        record: &mut C::Record,
    ) -> Result<Rank, RankingError> {
        self.move_to_and_save(collection, record, Position::TOP)
    }

    pub fn move_to_end_and_save(
        &self,
        collection: &C,
        record: &mut C::Record,
    ) -> Result<Rank, RankingError> {
        self.move_to_and_save(collection, record, Position::End)
    }
}

impl<C: RankedCollection> fmt::Debug for Ranking<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ranking")
            .field("collection", &self.collection)
            .field("field", &self.field)
            .field("group_by", &self.group_by)
            .field("guard", &self.guard)
            .finish()
    }
}

// Association names resolve to their foreign key; otherwise the name must
// be a column.
fn resolve_group_field(schema: &Schema, name: &str) -> Option<String> {
    if let Some(foreign_key) = schema.resolve_association_foreign_key(name) {
        return Some(foreign_key.to_string());
    }

    if schema.column_exists(name) {
        return Some(name.to_string());
    }

    warn!(
        collection = schema.table(),
        group_by = name,
        "group field is neither an association nor a column; grouping disabled"
    );
    sink::record(RankingEvent::ConfigWarning {
        collection: schema.table(),
    });

    None
}
