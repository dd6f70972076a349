//! Data Fetching
//!
//! Retrieves monthly aggregates from the statistics API and keeps them in a
//! process-wide query cache.
//!
//! ## Architecture
//!
//! - **MonthlySource**: transport seam, implemented over HTTP by [`HttpSource`]
//! - **QueryCache**: key → entry map shared by every chart instance, so a
//!   second mount reuses the first mount's result instead of refetching

mod cache;
mod client;

pub use cache::{CacheEntry, QueryCache, QueryKey, QueryStatus};
pub use client::{FetchError, HttpSource, MonthlySource};
