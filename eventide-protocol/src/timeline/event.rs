use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Lifecycle state of a timeline event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Active,
    Resolved,
    Pending,
    Cancelled,
}

impl Default for EventStatus {
    fn default() -> Self {
        EventStatus::Active
    }
}

/// Urgency attached to a timeline event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for EventPriority {
    fn default() -> Self {
        EventPriority::Medium
    }
}

/// Logical subsystem that produced a timeline event.
///
/// `Unknown` absorbs module names that are not part of the closed set when
/// deserializing foreign input; such events are rendered with fallback
/// styling instead of being rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EventModule {
    Crm,
    InterEntity,
    Support,
    Workflow,
    Assistant,
    Unknown,
}

impl From<String> for EventModule {
    fn from(value: String) -> Self {
        match value.as_str() {
            "crm" => EventModule::Crm,
            "inter_entity" => EventModule::InterEntity,
            "support" => EventModule::Support,
            "workflow" => EventModule::Workflow,
            "assistant" => EventModule::Assistant,
            _ => EventModule::Unknown,
        }
    }
}

impl EventModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventModule::Crm => "crm",
            EventModule::InterEntity => "inter_entity",
            EventModule::Support => "support",
            EventModule::Workflow => "workflow",
            EventModule::Assistant => "assistant",
            EventModule::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed vocabulary of event kinds, grouped by origin module.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventType {
    // CRM
    ContactCreated,
    DealStageChanged,
    InteractionLogged,
    NoteAdded,
    // Inter-entity process
    RequestSent,
    RequestReceived,
    RequestAccepted,
    RequestDeclined,
    // Helpdesk
    TicketOpened,
    TicketUpdated,
    TicketResolved,
    TicketEscalated,
    // Workflow engine
    WorkflowStarted,
    WorkflowCompleted,
    WorkflowFailed,
    // AI assistant
    ChatSessionStarted,
    ChatSessionEnded,
    SuggestionIssued,
}

impl TimelineEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineEventType::ContactCreated => "contact_created",
            TimelineEventType::DealStageChanged => "deal_stage_changed",
            TimelineEventType::InteractionLogged => "interaction_logged",
            TimelineEventType::NoteAdded => "note_added",
            TimelineEventType::RequestSent => "request_sent",
            TimelineEventType::RequestReceived => "request_received",
            TimelineEventType::RequestAccepted => "request_accepted",
            TimelineEventType::RequestDeclined => "request_declined",
            TimelineEventType::TicketOpened => "ticket_opened",
            TimelineEventType::TicketUpdated => "ticket_updated",
            TimelineEventType::TicketResolved => "ticket_resolved",
            TimelineEventType::TicketEscalated => "ticket_escalated",
            TimelineEventType::WorkflowStarted => "workflow_started",
            TimelineEventType::WorkflowCompleted => "workflow_completed",
            TimelineEventType::WorkflowFailed => "workflow_failed",
            TimelineEventType::ChatSessionStarted => "chat_session_started",
            TimelineEventType::ChatSessionEnded => "chat_session_ended",
            TimelineEventType::SuggestionIssued => "suggestion_issued",
        }
    }
}

impl fmt::Display for TimelineEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of subject a feed can be scoped to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Company,
    Customer,
    Employee,
    Zone,
    Country,
    Department,
    Project,
    Initiative,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Company => "company",
            EntityType::Customer => "customer",
            EntityType::Employee => "employee",
            EntityType::Zone => "zone",
            EntityType::Country => "country",
            EntityType::Department => "department",
            EntityType::Project => "project",
            EntityType::Initiative => "initiative",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative nature of a directed interaction between two entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Request,
    Response,
    Transfer,
    Notification,
}

/// One party of an inter-entity event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityRef {
    pub id: String,
    pub entity_type: EntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            entity_type,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Unit of record on a timeline feed.
///
/// Events are immutable once created; a feed is a read projection over
/// them, never an editable list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: TimelineEventType,
    pub module: EventModule,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub priority: EventPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_entity: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_entity: Option<EntityRef>,
    pub entity_id: String,
    pub entity_type: EntityType,
    pub company_id: String,
}

impl TimelineEvent {
    /// Start building an event with the minimum required information.
    pub fn builder(
        module: EventModule,
        event_type: TimelineEventType,
        title: impl Into<String>,
    ) -> TimelineEventBuilder {
        TimelineEventBuilder::new(module, event_type, title)
    }

    /// Whether the event represents a directed interaction between two parties.
    pub fn is_inter_entity(&self) -> bool {
        self.source_entity.is_some() && self.target_entity.is_some()
    }

    /// Typed accessor over the open metadata bag.
    pub fn interaction_type(&self) -> Option<InteractionType> {
        self.metadata
            .as_ref()
            .and_then(|meta| meta.get("interaction_type"))
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Insert/override a metadata key.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let entry = self
            .metadata
            .get_or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = entry {
            map.insert(key.into(), value.into());
        }
    }

    /// Whether the event belongs to the given feed subject and tenant.
    pub fn matches_scope(&self, entity_id: &str, entity_type: EntityType, company_id: &str) -> bool {
        self.entity_id == entity_id
            && self.entity_type == entity_type
            && self.company_id == company_id
    }
}

/// Builder helper to create events with many optional fields.
pub struct TimelineEventBuilder {
    event: TimelineEvent,
}

impl TimelineEventBuilder {
    pub fn new(
        module: EventModule,
        event_type: TimelineEventType,
        title: impl Into<String>,
    ) -> Self {
        let event = TimelineEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type,
            module,
            title: title.into(),
            description: String::new(),
            status: EventStatus::default(),
            priority: EventPriority::default(),
            metadata: None,
            source_entity: None,
            target_entity: None,
            entity_id: String::new(),
            entity_type: EntityType::Company,
            company_id: String::new(),
        };

        Self { event }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.event.id = id;
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.event.timestamp = timestamp;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.event.description = description.into();
        self
    }

    pub fn status(mut self, status: EventStatus) -> Self {
        self.event.status = status;
        self
    }

    pub fn priority(mut self, priority: EventPriority) -> Self {
        self.event.priority = priority;
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.event.metadata = Some(metadata);
        self
    }

    /// The feed subject the event is attached to.
    pub fn subject(mut self, entity_id: impl Into<String>, entity_type: EntityType) -> Self {
        self.event.entity_id = entity_id.into();
        self.event.entity_type = entity_type;
        self
    }

    pub fn company(mut self, company_id: impl Into<String>) -> Self {
        self.event.company_id = company_id.into();
        self
    }

    pub fn source_entity(mut self, entity: EntityRef) -> Self {
        self.event.source_entity = Some(entity);
        self
    }

    pub fn target_entity(mut self, entity: EntityRef) -> Self {
        self.event.target_entity = Some(entity);
        self
    }

    /// Record the qualitative nature of an inter-entity interaction in the
    /// metadata bag, where [`TimelineEvent::interaction_type`] reads it back.
    pub fn interaction(mut self, interaction: InteractionType) -> Self {
        self.event.add_metadata(
            "interaction_type",
            serde_json::to_value(interaction).unwrap_or(Value::Null),
        );
        self
    }

    pub fn build(self) -> TimelineEvent {
        self.event
    }
}
