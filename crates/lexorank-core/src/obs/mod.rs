//! Observability: in-process counters and the sink boundary that feeds them.
//!
//! Ranking logic never touches `metrics` directly; it emits `RankingEvent`s
//! through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{CollectionSummary, EventOps, EventReport};
pub use sink::{RankingEvent, RankingSink, metrics_report, metrics_reset_all, with_ranking_sink};
