use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use eventide_protocol::timeline::{EventModule, ModuleRegistry, TimelineEvent};

use crate::error::{FeedError, Result};
use crate::source::{EventSource, FeedScope};

/// In-memory multi-tenant event store backing one module.
///
/// Every producing module in the platform runs on mock/in-process data;
/// this store is that data layer. Ingestion validates against the module
/// registry, and fetches filter by the full scope triple, which is what
/// upholds the tenant/entity isolation the aggregator relies on.
#[derive(Clone)]
pub struct MemoryEventSource {
    module: EventModule,
    registry: Arc<ModuleRegistry>,
    events: Arc<RwLock<Vec<TimelineEvent>>>,
}

impl MemoryEventSource {
    /// Creates an empty store for the given module.
    pub fn new(module: EventModule, registry: Arc<ModuleRegistry>) -> Self {
        Self {
            module,
            registry,
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Validates and appends an event. Events are immutable once stored.
    pub fn ingest(&self, event: TimelineEvent) -> Result<()> {
        if event.module != self.module {
            return Err(FeedError::ModuleMismatch {
                expected: self.module,
                actual: event.module,
            });
        }
        self.registry.validate_event(&event)?;

        self.events.write().push(event);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl EventSource for MemoryEventSource {
    fn module(&self) -> EventModule {
        self.module
    }

    async fn fetch_events(&self, scope: &FeedScope) -> Result<Vec<TimelineEvent>> {
        let events = self.events.read();
        Ok(events
            .iter()
            .filter(|event| {
                event.matches_scope(&scope.entity_id, scope.entity_type, &scope.company_id)
            })
            .cloned()
            .collect())
    }
}
