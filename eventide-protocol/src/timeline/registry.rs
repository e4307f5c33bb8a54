use std::collections::HashMap;

use thiserror::Error;

use crate::timeline::event::{EventModule, TimelineEvent, TimelineEventType};

/// Display hints used when an event's module is absent from the registry.
pub const FALLBACK_ICON: &str = "circle";
pub const FALLBACK_COLOR: &str = "gray";

/// Static registry entry describing one event-producing module.
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    pub source: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub events: &'static [TimelineEventType],
}

/// Raised when an ingested event violates the registry's declarations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventValidationError {
    #[error("event type `{event_type}` is not declared by module `{module}`")]
    UndeclaredEventType {
        module: EventModule,
        event_type: TimelineEventType,
    },

    #[error("event `{event_type}` carries only one of source/target entity")]
    IncompleteEntityPair { event_type: TimelineEventType },
}

/// Immutable map from module to its declared event vocabulary and display
/// hints. The single source of truth for which event types are legal for
/// which module; built once at startup and injected wherever needed.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: HashMap<EventModule, ModuleConfig>,
}

impl ModuleRegistry {
    /// Registry covering the five built-in producer modules.
    pub fn builtin() -> Self {
        let mut modules = HashMap::new();

        modules.insert(
            EventModule::Crm,
            ModuleConfig {
                source: "CRM",
                label: "Sales & contacts",
                description: "Customer relationship activity",
                icon: "users",
                color: "blue",
                events: &[
                    TimelineEventType::ContactCreated,
                    TimelineEventType::DealStageChanged,
                    TimelineEventType::InteractionLogged,
                    TimelineEventType::NoteAdded,
                ],
            },
        );

        modules.insert(
            EventModule::InterEntity,
            ModuleConfig {
                source: "Inter-entity",
                label: "Cross-entity requests",
                description: "Directed interactions between two entities",
                icon: "arrow-left-right",
                color: "purple",
                events: &[
                    TimelineEventType::RequestSent,
                    TimelineEventType::RequestReceived,
                    TimelineEventType::RequestAccepted,
                    TimelineEventType::RequestDeclined,
                ],
            },
        );

        modules.insert(
            EventModule::Support,
            ModuleConfig {
                source: "Helpdesk",
                label: "Support tickets",
                description: "Ticket lifecycle activity",
                icon: "life-buoy",
                color: "orange",
                events: &[
                    TimelineEventType::TicketOpened,
                    TimelineEventType::TicketUpdated,
                    TimelineEventType::TicketResolved,
                    TimelineEventType::TicketEscalated,
                ],
            },
        );

        modules.insert(
            EventModule::Workflow,
            ModuleConfig {
                source: "Workflow",
                label: "Workflow runs",
                description: "Automated workflow execution",
                icon: "git-branch",
                color: "green",
                events: &[
                    TimelineEventType::WorkflowStarted,
                    TimelineEventType::WorkflowCompleted,
                    TimelineEventType::WorkflowFailed,
                ],
            },
        );

        modules.insert(
            EventModule::Assistant,
            ModuleConfig {
                source: "Assistant",
                label: "AI assistant",
                description: "Assistant chat sessions and suggestions",
                icon: "bot",
                color: "cyan",
                events: &[
                    TimelineEventType::ChatSessionStarted,
                    TimelineEventType::ChatSessionEnded,
                    TimelineEventType::SuggestionIssued,
                ],
            },
        );

        Self { modules }
    }

    /// Build a registry from an explicit module table.
    pub fn with_modules(modules: HashMap<EventModule, ModuleConfig>) -> Self {
        Self { modules }
    }

    /// Returns the config for a module. Absence signals an unknown module
    /// and is never an error; callers fall back to default styling.
    pub fn module_config(&self, module: EventModule) -> Option<&ModuleConfig> {
        self.modules.get(&module)
    }

    /// Display icon for an event, falling back to [`FALLBACK_ICON`].
    pub fn event_icon(&self, event: &TimelineEvent) -> &str {
        self.module_config(event.module)
            .map(|config| config.icon)
            .unwrap_or(FALLBACK_ICON)
    }

    /// Display color for an event, falling back to [`FALLBACK_COLOR`].
    pub fn event_color(&self, event: &TimelineEvent) -> &str {
        self.module_config(event.module)
            .map(|config| config.color)
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Whether `event_type` belongs to `module`'s declared event set.
    pub fn allows(&self, module: EventModule, event_type: TimelineEventType) -> bool {
        self.module_config(module)
            .map(|config| config.events.contains(&event_type))
            .unwrap_or(false)
    }

    /// Ingestion-time validation.
    ///
    /// A known module rejects event types outside its declared set. An
    /// unknown module passes: it has no declaration to check against and
    /// degrades to fallback styling downstream rather than failing closed.
    pub fn validate_event(&self, event: &TimelineEvent) -> Result<(), EventValidationError> {
        if let Some(config) = self.module_config(event.module) {
            if !config.events.contains(&event.event_type) {
                return Err(EventValidationError::UndeclaredEventType {
                    module: event.module,
                    event_type: event.event_type,
                });
            }
        }

        if event.source_entity.is_some() != event.target_entity.is_some() {
            return Err(EventValidationError::IncompleteEntityPair {
                event_type: event.event_type,
            });
        }

        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::event::{EntityRef, EntityType};

    fn event_for(module: EventModule, event_type: TimelineEventType) -> TimelineEvent {
        TimelineEvent::builder(module, event_type, "fixture")
            .subject("c1", EntityType::Company)
            .company("acme")
            .build()
    }

    #[test]
    fn unknown_module_gets_fallback_styling() {
        let registry = ModuleRegistry::builtin();
        let event = event_for(EventModule::Unknown, TimelineEventType::NoteAdded);

        assert!(registry.module_config(EventModule::Unknown).is_none());
        assert_eq!(registry.event_icon(&event), FALLBACK_ICON);
        assert_eq!(registry.event_color(&event), FALLBACK_COLOR);
    }

    #[test]
    fn every_builtin_module_declares_its_vocabulary() {
        let registry = ModuleRegistry::builtin();
        for module in [
            EventModule::Crm,
            EventModule::InterEntity,
            EventModule::Support,
            EventModule::Workflow,
            EventModule::Assistant,
        ] {
            let config = registry.module_config(module).expect("builtin module");
            assert!(!config.events.is_empty());
        }
    }

    #[test]
    fn validation_rejects_undeclared_event_types() {
        let registry = ModuleRegistry::builtin();
        let event = event_for(EventModule::Crm, TimelineEventType::TicketOpened);

        let err = registry.validate_event(&event).unwrap_err();
        assert_eq!(
            err,
            EventValidationError::UndeclaredEventType {
                module: EventModule::Crm,
                event_type: TimelineEventType::TicketOpened,
            }
        );
        assert!(!registry.allows(EventModule::Crm, TimelineEventType::TicketOpened));
        assert!(registry.allows(EventModule::Crm, TimelineEventType::NoteAdded));
    }

    #[test]
    fn validation_accepts_unknown_modules() {
        let registry = ModuleRegistry::builtin();
        let event = event_for(EventModule::Unknown, TimelineEventType::NoteAdded);
        assert!(registry.validate_event(&event).is_ok());
    }

    #[test]
    fn validation_requires_both_entity_refs_or_neither() {
        let registry = ModuleRegistry::builtin();
        let mut event = event_for(EventModule::InterEntity, TimelineEventType::RequestSent);
        event.source_entity = Some(EntityRef::new("z-1", EntityType::Zone));

        let err = registry.validate_event(&event).unwrap_err();
        assert_eq!(
            err,
            EventValidationError::IncompleteEntityPair {
                event_type: TimelineEventType::RequestSent,
            }
        );

        event.target_entity = Some(EntityRef::new("z-2", EntityType::Zone));
        assert!(registry.validate_event(&event).is_ok());
    }
}
