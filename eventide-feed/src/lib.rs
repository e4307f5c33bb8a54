//! Timeline aggregation engine for the Eventide platform.
//!
//! Merges events from every producing module into one chronologically
//! ordered, filterable feed scoped to a single entity. Aggregation is a
//! best-effort union: a failing source contributes nothing and is surfaced
//! as data, never as an abort.

pub mod aggregator;
pub mod error;
pub mod memory;
pub mod source;

pub use aggregator::{FeedOptions, FeedSnapshot, TimelineFeed};
pub use error::{FeedError, SourceFailure};
pub use memory::MemoryEventSource;
pub use source::{EventSource, FeedScope};
