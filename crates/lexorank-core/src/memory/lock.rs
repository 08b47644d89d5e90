use crate::{
    error::LockError,
    guard::{LockOptions, LockProvider, NamedLockGuard},
};
use std::{
    collections::BTreeSet,
    sync::{Arc, Condvar, Mutex},
    time::{Duration, Instant},
};

///
/// LockTable
///

#[derive(Debug, Default)]
struct LockTable {
    held: Mutex<BTreeSet<String>>,
    released: Condvar,
    requests: Mutex<Vec<(String, LockOptions)>>,
}

impl LockTable {
    fn release(&self, name: &str) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(name);
        }
        self.released.notify_all();
    }
}

///
/// MemoryLockProvider
///
/// Exclusive, non-reentrant named locks within one process. Honors
/// `LockOptions::timeout`; `shared`, `transaction` and `extra` are recorded
/// but otherwise ignored.
///

#[derive(Clone, Debug, Default)]
pub struct MemoryLockProvider {
    table: Arc<LockTable>,
}

impl MemoryLockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(name, options)` pair this provider was asked to lock, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<(String, LockOptions)> {
        self.table
            .requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<(String, LockOptions)> {
        self.requests().pop()
    }

    #[must_use]
    pub fn is_held(&self, name: &str) -> bool {
        self.table
            .held
            .lock()
            .is_ok_and(|held| held.contains(name))
    }
}

fn poisoned(name: &str) -> LockError {
    LockError::Unavailable {
        name: name.to_string(),
        reason: "lock table poisoned".to_string(),
    }
}

impl LockProvider for MemoryLockProvider {
    fn lock(&self, name: &str, options: &LockOptions) -> Result<NamedLockGuard, LockError> {
        if let Ok(mut requests) = self.table.requests.lock() {
            requests.push((name.to_string(), options.clone()));
        }

        let timeout = options.timeout();
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut held = self.table.held.lock().map_err(|_| poisoned(name))?;

        while held.contains(name) {
            held = match deadline {
                None => self
                    .table
                    .released
                    .wait(held)
                    .map_err(|_| poisoned(name))?,
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining == Duration::ZERO {
                        return Err(LockError::Timeout {
                            name: name.to_string(),
                            timeout: timeout.unwrap_or_default(),
                        });
                    }

                    self.table
                        .released
                        .wait_timeout(held, remaining)
                        .map_err(|_| poisoned(name))?
                        .0
                }
            };
        }

        held.insert(name.to_string());
        drop(held);

        let table = Arc::clone(&self.table);
        let owned = name.to_string();

        Ok(NamedLockGuard::new(name, move || table.release(&owned)))
    }
}

///
/// TESTS
///
