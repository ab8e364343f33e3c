//! Log analytics engine
//!
//! Pure transforms from in-memory log/query data to derived statistics.
//! Nothing in here performs I/O or keeps state between calls; the HTTP
//! handlers own loading, caching and presentation. Diagnostics go through
//! `tracing`, so tests and embedders can install their own subscriber.
//!
//! Pipeline:
//!
//! ```text
//! raw JSON ──▶ normalizer ──▶ [LogRecord] ──▶ filter ──▶ stats ──▶ AnalyticsData
//!                                │
//!                                └──▶ timers (per-record stopwatch extraction)
//!
//! [QueryResult] ──▶ queries ──▶ QuerySummary / index usage / categories
//! ```

pub mod filter;
pub mod normalizer;
pub mod queries;
pub mod stats;
pub mod timers;

#[cfg(test)]
mod tests;

pub use filter::{FilterSpec, filter_records};
pub use normalizer::normalize;
pub use queries::{Dimension, IndexUsage, QuerySummary};
pub use stats::{AnalyticsData, DateRange, TimerStat};
pub use timers::extract_timers;
