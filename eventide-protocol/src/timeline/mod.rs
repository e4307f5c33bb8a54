mod event;
mod filter;
mod registry;
mod stats;

pub use event::{
    EntityRef, EntityType, EventModule, EventPriority, EventStatus, InteractionType,
    TimelineEvent, TimelineEventBuilder, TimelineEventType,
};
pub use filter::{filter_events, DateRange, TimelineFilters};
pub use registry::{
    EventValidationError, ModuleConfig, ModuleRegistry, FALLBACK_COLOR, FALLBACK_ICON,
};
pub use stats::FeedStats;
