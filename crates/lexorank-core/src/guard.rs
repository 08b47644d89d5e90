//! Named-lock serialization of moves within one group.
//!
//! A guarded move runs Idle → Acquiring → Running → Releasing → Idle. The
//! only blocking point is acquisition; release happens when the
//! `NamedLockGuard` drops, on both the success and the error path.

use crate::{
    error::{LockError, RankingError},
    obs::sink::{self, RankingEvent},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, sync::Arc, time::Duration};
use tracing::debug;

///
/// LockOptions
///
/// Options passed through to the lock provider untouched. Unset fields
/// leave the provider's own default in place.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LockOptions {
    pub timeout_ms: Option<u64>,
    pub shared: Option<bool>,
    pub transaction: Option<bool>,
    pub extra: BTreeMap<String, String>,
}

impl LockOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub const fn with_shared(mut self, shared: bool) -> Self {
        self.shared = Some(shared);
        self
    }

    #[must_use]
    pub const fn with_transaction(mut self, transaction: bool) -> Self {
        self.transaction = Some(transaction);
        self
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Layer per-call overrides on top of these options; set fields win.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        let mut extra = self.extra.clone();
        extra.extend(overrides.extra.clone());

        Self {
            timeout_ms: overrides.timeout_ms.or(self.timeout_ms),
            shared: overrides.shared.or(self.shared),
            transaction: overrides.transaction.or(self.transaction),
            extra,
        }
    }
}

///
/// NamedLockGuard
///
/// Held lock on one name; dropping it releases the lock.
///

pub struct NamedLockGuard {
    name: String,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl NamedLockGuard {
    pub fn new(name: impl Into<String>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            name: name.into(),
            release: Some(Box::new(release)),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for NamedLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedLockGuard")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Drop for NamedLockGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            debug!(lock = %self.name, "named lock released");
        }
    }
}

///
/// LockProvider
///
/// External named mutual exclusion (an advisory lock in the database, a
/// distributed lock service, or `MemoryLockProvider` in-process).
/// Acquisition may block until the lock is free or the provider's timeout
/// elapses. Recursive acquisition is only as safe as the provider makes it.
///

pub trait LockProvider: Send + Sync {
    fn lock(&self, name: &str, options: &LockOptions) -> Result<NamedLockGuard, LockError>;
}

/// Caller-supplied lock naming function.
pub type LockNameFn<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// Default lock name: `{collection}_update_{field}[_group_{key}]`.
///
/// `group` is `None` when grouping is disabled, `Some(None)` for a record
/// whose group value is null.
#[must_use]
pub fn default_lock_name<G: fmt::Display>(
    collection: &str,
    field: &str,
    group: Option<Option<&G>>,
) -> String {
    let mut name = format!("{collection}_update_{field}");

    if let Some(key) = group {
        name.push_str("_group_");
        if let Some(key) = key {
            name.push_str(&key.to_string());
        }
    }

    name
}

///
/// ConcurrencyGuard
///

pub struct ConcurrencyGuard<R> {
    provider: Arc<dyn LockProvider>,
    lock_name: Option<LockNameFn<R>>,
    options: LockOptions,
}

impl<R> ConcurrencyGuard<R> {
    pub(crate) fn new(
        provider: Arc<dyn LockProvider>,
        lock_name: Option<LockNameFn<R>>,
        options: LockOptions,
    ) -> Self {
        Self {
            provider,
            lock_name,
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &LockOptions {
        &self.options
    }

    /// Resolve the lock name for `record`, preferring the custom naming
    /// function when one was configured.
    pub fn lock_name(&self, record: &R, default: impl FnOnce() -> String) -> String {
        match &self.lock_name {
            Some(name_fn) => name_fn(record),
            None => default(),
        }
    }

    /// Run `body` while holding the lock `name`.
    pub fn run<T>(
        &self,
        name: &str,
        overrides: Option<&LockOptions>,
        body: impl FnOnce() -> Result<T, RankingError>,
    ) -> Result<T, RankingError> {
        let options = overrides.map_or_else(|| self.options.clone(), |o| self.options.merge(o));

        debug!(lock = name, timeout_ms = ?options.timeout_ms, "acquiring named lock");
        let held = match self.provider.lock(name, &options) {
            Ok(held) => held,
            Err(err) => {
                sink::record(RankingEvent::LockFailed { name });
                return Err(err.into());
            }
        };
        sink::record(RankingEvent::LockAcquired { name });

        let result = body();
        drop(held);

        result
    }
}

impl<R> fmt::Debug for ConcurrencyGuard<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrencyGuard")
            .field("custom_lock_name", &self.lock_name.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///
