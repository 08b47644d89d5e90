//! Metrics sink boundary.
//!
//! Ranking logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through RankingEvent and RankingSink.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn RankingSink>>> = RefCell::new(None);
}

///
/// RankingEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RankingEvent<'a> {
    Registered {
        collection: &'a str,
    },
    ConfigWarning {
        collection: &'a str,
    },
    MoveStart {
        collection: &'a str,
    },
    RankGenerated {
        collection: &'a str,
        len: usize,
    },
    RankReused {
        collection: &'a str,
    },
    RankRejected {
        collection: &'a str,
    },
    LockAcquired {
        name: &'a str,
    },
    LockFailed {
        name: &'a str,
    },
}

///
/// RankingSink
///

pub trait RankingSink {
    fn record(&self, event: RankingEvent<'_>);
}

/// GlobalRankingSink
/// Default sink that writes into the thread's counters when no scoped
/// override is installed.

pub(crate) struct GlobalRankingSink;

impl RankingSink for GlobalRankingSink {
    fn record(&self, event: RankingEvent<'_>) {
        metrics::with_state_mut(|m| match event {
            RankingEvent::Registered { .. } => {
                m.ops.registrations = m.ops.registrations.saturating_add(1);
            }

            RankingEvent::ConfigWarning { .. } => {
                m.ops.config_warnings = m.ops.config_warnings.saturating_add(1);
            }

            RankingEvent::MoveStart { collection } => {
                m.ops.moves = m.ops.moves.saturating_add(1);
                let entry = m.collections.entry(collection.to_string()).or_default();
                entry.moves = entry.moves.saturating_add(1);
            }

            RankingEvent::RankGenerated { collection, len } => {
                let len = u64::try_from(len).unwrap_or(u64::MAX);
                m.ops.ranks_generated = m.ops.ranks_generated.saturating_add(1);

                let entry = m.collections.entry(collection.to_string()).or_default();
                entry.ranks_generated = entry.ranks_generated.saturating_add(1);
                entry.rank_len_total = entry.rank_len_total.saturating_add(len);
                entry.rank_len_max = entry.rank_len_max.max(len);
            }

            RankingEvent::RankReused { collection } => {
                m.ops.ranks_reused = m.ops.ranks_reused.saturating_add(1);
                let entry = m.collections.entry(collection.to_string()).or_default();
                entry.ranks_reused = entry.ranks_reused.saturating_add(1);
            }

            RankingEvent::RankRejected { collection } => {
                m.ops.rank_failures = m.ops.rank_failures.saturating_add(1);
                let entry = m.collections.entry(collection.to_string()).or_default();
                entry.rank_failures = entry.rank_failures.saturating_add(1);
            }

            RankingEvent::LockAcquired { .. } => {
                m.ops.lock_acquisitions = m.ops.lock_acquisitions.saturating_add(1);
            }

            RankingEvent::LockFailed { .. } => {
                m.ops.lock_failures = m.ops.lock_failures.saturating_add(1);
            }
        });
    }
}

pub(crate) fn record(event: RankingEvent<'_>) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match override_sink {
        Some(sink) => sink.record(event),
        None => GlobalRankingSink.record(event),
    }
}

/// Snapshot the current thread's ranking counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset the current thread's ranking counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary sink override on the current thread.
pub fn with_ranking_sink<T>(sink: Rc<dyn RankingSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn RankingSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
