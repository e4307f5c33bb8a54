use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timeline::event::{
    EntityRef, EntityType, EventModule, EventPriority, EventStatus, InteractionType,
    TimelineEvent, TimelineEventType,
};

/// Inclusive time window. An absent bound leaves that side open.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| timestamp >= from)
            && self.to.map_or(true, |to| timestamp <= to)
    }
}

/// Predicate bundle narrowing a feed.
///
/// Dimensions combine with logical AND; within a set dimension an empty set
/// places no restriction. The default value matches every event. `search`
/// is a case-insensitive substring match over `title` and `description`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimelineFilters {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<EventModule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TimelineEventType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<EventStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority: Vec<EventPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_entity_type: Option<EntityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_entity_type: Option<EntityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<InteractionType>,
}

impl TimelineFilters {
    /// Whether the bundle places no restriction at all.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
            && self.types.is_empty()
            && self.status.is_empty()
            && self.priority.is_empty()
            && self.date_range.is_none()
            && self.search.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.source_entity_type.is_none()
            && self.target_entity_type.is_none()
            && self.interaction_type.is_none()
    }

    /// Whether `event` satisfies every non-empty predicate in the bundle.
    pub fn matches(&self, event: &TimelineEvent) -> bool {
        if !self.modules.is_empty() && !self.modules.contains(&event.module) {
            return false;
        }

        if !self.types.is_empty() && !self.types.contains(&event.event_type) {
            return false;
        }

        if !self.status.is_empty() && !self.status.contains(&event.status) {
            return false;
        }

        if !self.priority.is_empty() && !self.priority.contains(&event.priority) {
            return false;
        }

        if let Some(range) = &self.date_range {
            if !range.contains(event.timestamp) {
                return false;
            }
        }

        if let Some(search) = self.search.as_deref() {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() && !haystack_contains(event, &needle) {
                return false;
            }
        }

        if let Some(expected) = self.source_entity_type {
            if !entity_has_type(event.source_entity.as_ref(), expected) {
                return false;
            }
        }

        if let Some(expected) = self.target_entity_type {
            if !entity_has_type(event.target_entity.as_ref(), expected) {
                return false;
            }
        }

        if let Some(expected) = self.interaction_type {
            if event.interaction_type() != Some(expected) {
                return false;
            }
        }

        true
    }
}

fn haystack_contains(event: &TimelineEvent, needle: &str) -> bool {
    event.title.to_lowercase().contains(needle)
        || event.description.to_lowercase().contains(needle)
}

// An event without the corresponding entity ref cannot match a refinement.
fn entity_has_type(entity: Option<&EntityRef>, expected: EntityType) -> bool {
    entity.map_or(false, |entity| entity.entity_type == expected)
}

/// Returns the subset of `events` matching `filters`.
///
/// Pure function of its inputs: no side effects, relative order preserved.
pub fn filter_events(events: &[TimelineEvent], filters: &TimelineFilters) -> Vec<TimelineEvent> {
    events
        .iter()
        .filter(|event| filters.matches(event))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use test_case::test_case;

    use super::*;

    fn sample_event(
        module: EventModule,
        event_type: TimelineEventType,
        status: EventStatus,
        priority: EventPriority,
        title: &str,
    ) -> TimelineEvent {
        TimelineEvent::builder(module, event_type, title)
            .description("fixture event")
            .status(status)
            .priority(priority)
            .subject("c1", EntityType::Company)
            .company("acme")
            .build()
    }

    fn fixture() -> Vec<TimelineEvent> {
        vec![
            sample_event(
                EventModule::Crm,
                TimelineEventType::ContactCreated,
                EventStatus::Active,
                EventPriority::Low,
                "New contact",
            ),
            sample_event(
                EventModule::Support,
                TimelineEventType::TicketResolved,
                EventStatus::Resolved,
                EventPriority::High,
                "Ticket closed",
            ),
            sample_event(
                EventModule::Support,
                TimelineEventType::TicketEscalated,
                EventStatus::Resolved,
                EventPriority::Critical,
                "Escalation wrapped up",
            ),
            sample_event(
                EventModule::Workflow,
                TimelineEventType::WorkflowFailed,
                EventStatus::Resolved,
                EventPriority::Low,
                "Nightly sync failed",
            ),
        ]
    }

    #[test]
    fn empty_filter_is_identity() {
        let events = fixture();
        let filtered = filter_events(&events, &TimelineFilters::default());
        assert_eq!(filtered, events);
    }

    #[test]
    fn status_and_priority_combine_conjunctively() {
        let events = fixture();
        let filters = TimelineFilters {
            status: vec![EventStatus::Resolved],
            priority: vec![EventPriority::High, EventPriority::Critical],
            ..TimelineFilters::default()
        };

        let filtered = filter_events(&events, &filters);
        let titles: Vec<&str> = filtered.iter().map(|event| event.title.as_str()).collect();
        assert_eq!(titles, vec!["Ticket closed", "Escalation wrapped up"]);
        assert!(filtered.iter().all(|event| events.contains(event)));
    }

    #[test_case(EventModule::Crm, 1 ; "crm only")]
    #[test_case(EventModule::Support, 2 ; "support only")]
    #[test_case(EventModule::Assistant, 0 ; "module with no events")]
    fn module_membership_restricts_the_feed(module: EventModule, expected: usize) {
        let filters = TimelineFilters {
            modules: vec![module],
            ..TimelineFilters::default()
        };
        assert_eq!(filter_events(&fixture(), &filters).len(), expected);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let events = fixture();

        let by_title = TimelineFilters {
            search: Some("TICKET".into()),
            ..TimelineFilters::default()
        };
        assert_eq!(filter_events(&events, &by_title).len(), 1);

        let by_description = TimelineFilters {
            search: Some("Fixture".into()),
            ..TimelineFilters::default()
        };
        assert_eq!(filter_events(&events, &by_description).len(), events.len());

        let blank = TimelineFilters {
            search: Some("   ".into()),
            ..TimelineFilters::default()
        };
        assert_eq!(filter_events(&events, &blank).len(), events.len());
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let now = Utc::now();
        let mut events = fixture();
        events[0].timestamp = now;

        let range = DateRange {
            from: Some(now),
            to: Some(now),
        };
        assert!(range.contains(now));
        assert!(!range.contains(now + Duration::seconds(1)));

        let filters = TimelineFilters {
            date_range: Some(range),
            ..TimelineFilters::default()
        };
        let filtered = filter_events(&events[..1], &filters);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn entity_refinements_skip_single_party_events() {
        let mut events = fixture();
        events.push(
            TimelineEvent::builder(
                EventModule::InterEntity,
                TimelineEventType::RequestSent,
                "Stock transfer",
            )
            .subject("c1", EntityType::Company)
            .company("acme")
            .source_entity(EntityRef::new("z-1", EntityType::Zone))
            .target_entity(EntityRef::new("z-2", EntityType::Zone))
            .interaction(InteractionType::Transfer)
            .build(),
        );

        let by_source = TimelineFilters {
            source_entity_type: Some(EntityType::Zone),
            ..TimelineFilters::default()
        };
        assert_eq!(filter_events(&events, &by_source).len(), 1);

        let by_interaction = TimelineFilters {
            interaction_type: Some(InteractionType::Transfer),
            ..TimelineFilters::default()
        };
        assert_eq!(filter_events(&events, &by_interaction).len(), 1);

        let mismatched = TimelineFilters {
            interaction_type: Some(InteractionType::Request),
            ..TimelineFilters::default()
        };
        assert!(filter_events(&events, &mismatched).is_empty());
    }
}
