use std::collections::HashMap;

use tracing::{info, warn};

use eventide_feed::MemoryEventSource;
use eventide_protocol::timeline::{
    EntityRef, EntityType, EventModule, EventPriority, EventStatus, InteractionType,
    TimelineEvent, TimelineEventBuilder, TimelineEventType,
};

/// Seeds a small cross-module fixture so a fresh instance has something to
/// show. The demo tenant is `acme-demo`, scoped to company `c1`.
pub fn seed_demo_events(sources: &HashMap<EventModule, MemoryEventSource>) {
    let events = demo_events();
    let mut seeded = 0usize;

    for event in events {
        match sources.get(&event.module) {
            Some(source) => match source.ingest(event) {
                Ok(()) => seeded += 1,
                Err(err) => warn!(error = %err, "skipping invalid demo event"),
            },
            None => warn!(module = %event.module, "no store for demo event module"),
        }
    }

    info!(seeded, "seeded demo timeline events");
}

fn demo_events() -> Vec<TimelineEvent> {
    let subject = |builder: TimelineEventBuilder| {
        builder.subject("c1", EntityType::Company).company("acme-demo")
    };

    vec![
        subject(TimelineEvent::builder(
            EventModule::Crm,
            TimelineEventType::ContactCreated,
            "New contact: Dana Reyes",
        ))
        .description("Imported from the spring trade-show list")
        .build(),
        subject(TimelineEvent::builder(
            EventModule::Crm,
            TimelineEventType::DealStageChanged,
            "Acme renewal moved to negotiation",
        ))
        .priority(EventPriority::High)
        .build(),
        subject(TimelineEvent::builder(
            EventModule::Support,
            TimelineEventType::TicketOpened,
            "Login loop on the mobile app",
        ))
        .priority(EventPriority::Critical)
        .build(),
        subject(TimelineEvent::builder(
            EventModule::Support,
            TimelineEventType::TicketResolved,
            "Invoice export fixed",
        ))
        .status(EventStatus::Resolved)
        .build(),
        subject(TimelineEvent::builder(
            EventModule::Workflow,
            TimelineEventType::WorkflowCompleted,
            "Nightly sync finished",
        ))
        .status(EventStatus::Resolved)
        .priority(EventPriority::Low)
        .build(),
        subject(TimelineEvent::builder(
            EventModule::Assistant,
            TimelineEventType::SuggestionIssued,
            "Assistant drafted a follow-up email",
        ))
        .build(),
        subject(TimelineEvent::builder(
            EventModule::InterEntity,
            TimelineEventType::RequestSent,
            "Stock transfer requested from the north zone",
        ))
        .source_entity(EntityRef::new("z-north", EntityType::Zone))
        .target_entity(EntityRef::new("z-south", EntityType::Zone))
        .interaction(InteractionType::Transfer)
        .status(EventStatus::Pending)
        .build(),
    ]
}
