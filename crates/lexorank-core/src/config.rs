use crate::guard::{LockNameFn, LockOptions};
use std::{fmt, sync::Arc};

/// Rank field used when none is configured.
pub const DEFAULT_RANK_FIELD: &str = "rank";

///
/// RankingConfig
///
/// Per-collection-type ranking settings, validated once by
/// `Ranking::register` and immutable afterwards.
///
/// - `field`: column holding the rank.
/// - `group_by`: column or association partitioning the order.
/// - `advisory_lock`: whether and how moves are serialized per group.
///

pub struct RankingConfig<R> {
    pub(crate) field: String,
    pub(crate) group_by: Option<String>,
    pub(crate) advisory_lock: AdvisoryLockConfig<R>,
}

impl<R> RankingConfig<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Partition the order by a column, or by an association resolved to
    /// its foreign key at registration.
    #[must_use]
    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    #[must_use]
    pub fn advisory_lock(mut self, advisory_lock: AdvisoryLockConfig<R>) -> Self {
        self.advisory_lock = advisory_lock;
        self
    }
}

impl<R> Default for RankingConfig<R> {
    fn default() -> Self {
        Self {
            field: DEFAULT_RANK_FIELD.to_string(),
            group_by: None,
            advisory_lock: AdvisoryLockConfig::default(),
        }
    }
}

impl<R> fmt::Debug for RankingConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankingConfig")
            .field("field", &self.field)
            .field("group_by", &self.group_by)
            .field("advisory_lock", &self.advisory_lock)
            .finish()
    }
}

///
/// AdvisoryLockConfig
///
/// `enabled` left unset means "on whenever a lock provider is supplied".
///

pub struct AdvisoryLockConfig<R> {
    pub(crate) enabled: Option<bool>,
    pub(crate) lock_name: Option<LockNameFn<R>>,
    pub(crate) options: LockOptions,
}

impl<R> AdvisoryLockConfig<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Replace the default `{collection}_update_{field}[_group_{key}]` name.
    #[must_use]
    pub fn lock_name(mut self, lock_name: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.lock_name = Some(Arc::new(lock_name));
        self
    }

    /// Options handed to the lock provider on every guarded move.
    #[must_use]
    pub fn options(mut self, options: LockOptions) -> Self {
        self.options = options;
        self
    }
}

impl<R> Default for AdvisoryLockConfig<R> {
    fn default() -> Self {
        Self {
            enabled: None,
            lock_name: None,
            options: LockOptions::default(),
        }
    }
}

impl<R> fmt::Debug for AdvisoryLockConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisoryLockConfig")
            .field("enabled", &self.enabled)
            .field("custom_lock_name", &self.lock_name.is_some())
            .field("options", &self.options)
            .finish()
    }
}
