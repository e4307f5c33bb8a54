use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use eventide_protocol::timeline::{EntityType, EventModule, TimelineEvent};

use crate::error::Result;

/// Subject a feed is scoped to: one entity within one tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedScope {
    pub entity_id: String,
    pub entity_type: EntityType,
    pub company_id: String,
}

impl FeedScope {
    pub fn new(
        entity_id: impl Into<String>,
        entity_type: EntityType,
        company_id: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_type,
            company_id: company_id.into(),
        }
    }
}

/// Contract every event-producing module exposes to the aggregator.
///
/// Implementations return only events already scoped to the given
/// tenant/entity pair; the aggregator trusts producers and does not
/// re-filter for isolation.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// The module this source produces events for.
    fn module(&self) -> EventModule;

    /// Fetch the events attached to `scope`.
    async fn fetch_events(&self, scope: &FeedScope) -> Result<Vec<TimelineEvent>>;
}
