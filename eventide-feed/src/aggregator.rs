use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;
use tracing::{debug, warn};

use eventide_protocol::timeline::{
    filter_events, EventModule, FeedStats, TimelineEvent, TimelineFilters,
};

use crate::error::SourceFailure;
use crate::source::{EventSource, FeedScope};

/// Per-feed knobs.
#[derive(Debug, Clone, Default)]
pub struct FeedOptions {
    /// Display truncation bound applied after filtering.
    pub max_items: Option<usize>,
}

/// Read-only view over the feed state at one point in time.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub events: Vec<TimelineEvent>,
    pub is_loading: bool,
    pub filters: TimelineFilters,
    pub active_modules: Vec<EventModule>,
    pub failures: Vec<SourceFailure>,
}

#[derive(Default)]
struct FeedState {
    scope: Option<FeedScope>,
    filters: TimelineFilters,
    events: Vec<TimelineEvent>,
    failures: Vec<SourceFailure>,
    is_loading: bool,
    generation: u64,
}

/// Aggregates events from every registered source into one chronologically
/// ordered feed for a single subject.
///
/// Reloads are generation-guarded: a fetch superseded by a newer
/// `set_scope`/`refresh` is discarded wholesale, so a snapshot never shows
/// a partial merge or the previous subject's events under a new scope.
#[derive(Clone)]
pub struct TimelineFeed {
    sources: Arc<Vec<Arc<dyn EventSource>>>,
    options: FeedOptions,
    state: Arc<RwLock<FeedState>>,
}

impl TimelineFeed {
    pub fn new(sources: Vec<Arc<dyn EventSource>>) -> Self {
        Self::with_options(sources, FeedOptions::default())
    }

    pub fn with_options(sources: Vec<Arc<dyn EventSource>>, options: FeedOptions) -> Self {
        Self {
            sources: Arc::new(sources),
            options,
            state: Arc::new(RwLock::new(FeedState::default())),
        }
    }

    /// Switch the feed subject and reload from every source.
    pub async fn set_scope(&self, scope: FeedScope) {
        let generation = {
            let mut state = self.state.write();
            state.generation += 1;
            state.scope = Some(scope.clone());
            state.is_loading = true;
            state.generation
        };

        self.load(scope, generation).await;
    }

    /// Re-fetch for the current scope. No-op when no scope is set yet.
    pub async fn refresh(&self) {
        let pending = {
            let mut state = self.state.write();
            state.scope.clone().map(|scope| {
                state.generation += 1;
                state.is_loading = true;
                (scope, state.generation)
            })
        };

        if let Some((scope, generation)) = pending {
            self.load(scope, generation).await;
        }
    }

    /// Narrow the visible feed without refetching.
    pub fn set_filters(&self, filters: TimelineFilters) {
        self.state.write().filters = filters;
    }

    pub fn filters(&self) -> TimelineFilters {
        self.state.read().filters.clone()
    }

    pub fn scope(&self) -> Option<FeedScope> {
        self.state.read().scope.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    /// Current view: filtered, truncated events plus derived feed metadata.
    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.read();

        let mut events = filter_events(&state.events, &state.filters);
        if let Some(max_items) = self.options.max_items {
            events.truncate(max_items);
        }

        FeedSnapshot {
            events,
            is_loading: state.is_loading,
            filters: state.filters.clone(),
            active_modules: active_modules(&state.events),
            failures: state.failures.clone(),
        }
    }

    /// Aggregate counters over the raw merged feed (ignores filters).
    pub fn stats(&self) -> FeedStats {
        FeedStats::collect(&self.state.read().events)
    }

    /// Fan out to every source, await all, merge the successes and record
    /// the failures. Commits only if `generation` is still current.
    async fn load(&self, scope: FeedScope, generation: u64) {
        let fetches = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let scope = scope.clone();
            async move {
                let module = source.module();
                let outcome = source.fetch_events(&scope).await;
                (module, outcome)
            }
        });

        let settled = join_all(fetches).await;

        let mut merged = Vec::new();
        let mut failures = Vec::new();
        for (module, outcome) in settled {
            match outcome {
                Ok(events) => merged.extend(events),
                Err(err) => {
                    warn!(%module, error = %err, "timeline source failed, continuing without it");
                    failures.push(SourceFailure {
                        module,
                        message: err.to_string(),
                    });
                }
            }
        }

        merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));

        let mut state = self.state.write();
        if state.generation != generation {
            debug!(
                generation,
                current = state.generation,
                "discarding stale timeline fetch"
            );
            return;
        }

        state.events = merged;
        state.failures = failures;
        state.is_loading = false;
    }
}

// Modules that contributed at least one event, in declaration order. A
// derived value; never stored independently of the events themselves.
fn active_modules(events: &[TimelineEvent]) -> Vec<EventModule> {
    let mut modules: Vec<EventModule> = events.iter().map(|event| event.module).collect();
    modules.sort();
    modules.dedup();
    modules
}
