//! Shared registries touched directly by request handlers.
//!
//! Both pools synchronise internally and are meant to be shared behind an `Arc`.

mod pending;
pub use pending::PendingTaskPool;

mod provider;
pub use provider::TaskProviderPool;

use std::sync::{LockResult, PoisonError};

// Pool writes are single map operations; a poisoned guard still holds consistent data.
fn relock<G>(res: LockResult<G>) -> G {
    res.unwrap_or_else(PoisonError::into_inner)
}
