use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral counters for ranking operations on the current thread.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct EventState {
    pub(crate) ops: EventOps,
    pub(crate) collections: BTreeMap<String, CollectionCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Moves
    pub moves: u64,
    pub ranks_generated: u64,
    pub ranks_reused: u64,
    pub rank_failures: u64,

    // Named locks
    pub lock_acquisitions: u64,
    pub lock_failures: u64,

    // Registration
    pub registrations: u64,
    pub config_warnings: u64,
}

///
/// CollectionCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct CollectionCounters {
    pub(crate) moves: u64,
    pub(crate) ranks_generated: u64,
    pub(crate) ranks_reused: u64,
    pub(crate) rank_failures: u64,
    pub(crate) rank_len_total: u64,
    pub(crate) rank_len_max: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub collections: Vec<CollectionSummary>,
}

///
/// CollectionSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub moves: u64,
    pub ranks_generated: u64,
    pub ranks_reused: u64,
    pub rank_failures: u64,
    pub avg_rank_len: f64,
    pub max_rank_len: u64,
}

/// Build a report from the in-memory counters, longest ranks first.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let mut collections: Vec<CollectionSummary> = snap
        .collections
        .into_iter()
        .map(|(name, c)| {
            let avg_rank_len = if c.ranks_generated > 0 {
                c.rank_len_total as f64 / c.ranks_generated as f64
            } else {
                0.0
            };

            CollectionSummary {
                name,
                moves: c.moves,
                ranks_generated: c.ranks_generated,
                ranks_reused: c.ranks_reused,
                rank_failures: c.rank_failures,
                avg_rank_len,
                max_rank_len: c.rank_len_max,
            }
        })
        .collect();

    collections.sort_by(|a, b| {
        b.max_rank_len
            .cmp(&a.max_rank_len)
            .then_with(|| a.name.cmp(&b.name))
    });

    EventReport {
        ops: snap.ops,
        collections,
    }
}
