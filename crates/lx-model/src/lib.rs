//! Plain data shared by every layer of the bridge.
//!
//! Nothing in this crate synchronises or performs I/O; ownership of these values is
//! managed by the pools and loops in `lx-core`.

mod domain;
pub use domain::*;
