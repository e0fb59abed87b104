//! Work partitioning for the worker pool.
//!
//! `select` narrows the resolved file list (optional seeded shuffle, then
//! truncation); `split` deals the result round-robin into one disjoint
//! sub-list per worker.

mod plan;
mod select;

pub use plan::{split, PartitionPlan};
pub use select::{select, shuffle_seeded, DEFAULT_SHUFFLE_SEED};
