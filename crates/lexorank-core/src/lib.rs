//! Core runtime for Lexorank: rank generation, position resolution, the
//! named-lock guard, and the ergonomics exported via the `prelude`.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod collection;
pub mod config;
pub mod error;
pub mod guard;
pub mod memory;
pub mod obs;
pub mod position;
pub mod rank;
pub mod ranking;
pub mod resolve;
pub mod schema;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or in-memory collaborators are re-exported here.
///

pub mod prelude {
    pub use crate::{
        collection::{PersistRecord, RankScope, RankedCollection},
        config::{AdvisoryLockConfig, RankingConfig},
        guard::{LockOptions, LockProvider, NamedLockGuard},
        position::{Direction, Position},
        rank::{Rank, value_between},
        ranking::Ranking,
        schema::Schema,
    };
}
