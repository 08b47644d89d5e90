//! In-process reference collaborators.
//!
//! `MemoryCollection` stands in for a table with a unique rank index and
//! `MemoryLockProvider` for a database advisory lock. Both are thread-safe
//! so contention can be exercised without a database.

mod collection;
mod lock;

pub use collection::{MemoryCollection, MemoryRecord};
pub use lock::MemoryLockProvider;
