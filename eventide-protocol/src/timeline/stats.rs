use serde::{Deserialize, Serialize};

use crate::timeline::event::{EventModule, EventPriority, EventStatus, TimelineEvent};

/// Aggregate counters derived from a merged feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedStats {
    pub total_events: u64,
    pub active_events: u64,
    pub resolved_events: u64,
    pub pending_events: u64,
    pub cancelled_events: u64,
    pub critical_events: u64,
    pub inter_entity_events: u64,
    pub modules: Vec<EventModule>,
}

impl FeedStats {
    /// Derives the counters from a merged event collection.
    pub fn collect(events: &[TimelineEvent]) -> Self {
        let mut stats = FeedStats::default();

        for event in events {
            stats.total_events += 1;
            match event.status {
                EventStatus::Active => stats.active_events += 1,
                EventStatus::Resolved => stats.resolved_events += 1,
                EventStatus::Pending => stats.pending_events += 1,
                EventStatus::Cancelled => stats.cancelled_events += 1,
            }
            if event.priority == EventPriority::Critical {
                stats.critical_events += 1;
            }
            if event.is_inter_entity() {
                stats.inter_entity_events += 1;
            }
        }

        let mut modules: Vec<EventModule> = events.iter().map(|event| event.module).collect();
        modules.sort();
        modules.dedup();
        stats.modules = modules;

        stats
    }
}
