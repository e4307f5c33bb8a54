//! Shared protocol types for the Eventide timeline platform.
//!
//! Everything the feed aggregator and the timeline service exchange lives
//! here: the event model, the per-module registry, filter predicates and
//! aggregate statistics.

pub mod timeline;

pub mod prelude {
    pub use crate::timeline::{
        filter_events, DateRange, EntityRef, EntityType, EventModule, EventPriority, EventStatus,
        FeedStats, InteractionType, ModuleConfig, ModuleRegistry, TimelineEvent, TimelineFilters,
        TimelineEventType,
    };
}
