//! ## Crate layout
//! - `core`: rank generation, position resolution, locking and observability.
//!
//! The `prelude` module mirrors the surface used by application code that
//! registers ranked collections and moves records within them.

pub use lexorank_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::{
    error::{InvalidConfigError, InvalidRankError, RankingError},
    rank::{MAX_CHAR, MIN_CHAR},
};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        collection::{PersistRecord as _, RankedCollection as _},
        prelude::{
            AdvisoryLockConfig, Direction, LockOptions, LockProvider, Position, Rank,
            RankingConfig, Schema, value_between,
        },
        ranking::Ranking,
    };
}

///
/// TESTS
///
