mod seed;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

use eventide_core::config::CoreConfig;
use eventide_core::errors::EventideError;
use eventide_core::logging;
use eventide_feed::{
    EventSource, FeedError, FeedOptions, FeedScope, MemoryEventSource, SourceFailure,
    TimelineFeed,
};
use eventide_protocol::timeline::{
    DateRange, EntityRef, EntityType, EventModule, EventPriority, EventStatus, FeedStats,
    TimelineEvent, TimelineEventType, TimelineFilters, ModuleRegistry,
};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    if let Err(err) = logging::init_tracing(None) {
        eprintln!("failed to initialise tracing: {err}");
    }

    let config = load_timeline_config()?;
    let bind_addr: SocketAddr = config
        .http_bind
        .clone()
        .unwrap_or_else(|| "0.0.0.0:8082".to_string())
        .parse()?;

    let state = AppState::new(Arc::new(ModuleRegistry::builtin()), config.max_feed_items);
    if config.seed_demo {
        seed::seed_demo_events(&state.sources);
    }

    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr()?;
    info!(%actual_addr, "starting eventide-timeline service");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn load_timeline_config() -> Result<CoreConfig, EventideError> {
    CoreConfig::from_env_with_prefix("TIMELINE_").map_err(Into::into)
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/events", post(ingest_event))
        .route("/v1/feed", get(get_feed))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    sources: HashMap<EventModule, MemoryEventSource>,
    feed_options: FeedOptions,
    broadcaster: broadcast::Sender<TimelineEvent>,
}

impl AppState {
    fn new(registry: Arc<ModuleRegistry>, max_feed_items: Option<usize>) -> Self {
        // One store per known producer, plus one absorbing unknown modules
        // so foreign events stay displayable instead of being dropped.
        let mut sources = HashMap::new();
        for module in [
            EventModule::Crm,
            EventModule::InterEntity,
            EventModule::Support,
            EventModule::Workflow,
            EventModule::Assistant,
            EventModule::Unknown,
        ] {
            sources.insert(module, MemoryEventSource::new(module, Arc::clone(&registry)));
        }

        let (tx, _rx) = broadcast::channel(128);

        Self {
            sources,
            feed_options: FeedOptions {
                max_items: max_feed_items,
            },
            broadcaster: tx,
        }
    }

    fn feed(&self) -> TimelineFeed {
        let sources: Vec<Arc<dyn EventSource>> = self
            .sources
            .values()
            .map(|source| Arc::new(source.clone()) as Arc<dyn EventSource>)
            .collect();
        TimelineFeed::with_options(sources, self.feed_options.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<TimelineEvent> {
        self.broadcaster.subscribe()
    }
}

type AppResult<T> = Result<T, AppError>;

async fn ingest_event(
    State(state): State<AppState>,
    Json(payload): Json<IngestEventRequest>,
) -> AppResult<(StatusCode, Json<TimelineEvent>)> {
    let event = payload.into_event();

    let source = state
        .sources
        .get(&event.module)
        .ok_or_else(|| AppError::bad_request(format!("no store for module `{}`", event.module)))?;
    source.ingest(event.clone())?;

    if let Err(err) = state.broadcaster.send(event.clone()) {
        warn!(?err, "failed to broadcast new event");
    }

    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_feed(
    State(state): State<AppState>,
    Query(request): Query<FeedRequest>,
) -> AppResult<Json<FeedResponse>> {
    let (scope, filters) = request.into_parts();

    let feed = state.feed();
    feed.set_filters(filters);
    feed.set_scope(scope).await;

    let stats = feed.stats();
    let snapshot = feed.snapshot();

    Ok(Json(FeedResponse {
        events: snapshot.events,
        active_modules: snapshot.active_modules,
        failures: snapshot.failures,
        stats,
    }))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        if let Err(err) = handle_socket(socket, state).await {
            warn!(?err, "timeline websocket closed with error");
        }
    })
}

async fn handle_socket(socket: WebSocket, state: AppState) -> AppResult<()> {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.subscribe();

    // Drain incoming messages so the socket stays healthy.
    tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            if let Err(err) = result {
                error!(?err, "error receiving websocket payload");
                break;
            }
        }
    });

    let ready = serde_json::json!({ "type": "ready" });
    sender
        .send(Message::Text(ready.to_string()))
        .await
        .map_err(|err| AppError::internal(format!("failed to send ready message: {err}")))?;

    while let Ok(event) = rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(serialized) => {
                if let Err(err) = sender.send(Message::Text(serialized)).await {
                    return Err(AppError::internal(format!("failed to push event: {err}")));
                }
            }
            Err(err) => {
                warn!(?err, "failed to encode timeline event");
            }
        }
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct IngestEventRequest {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    event_type: TimelineEventType,
    module: EventModule,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<EventStatus>,
    #[serde(default)]
    priority: Option<EventPriority>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
    #[serde(default)]
    source_entity: Option<EntityRef>,
    #[serde(default)]
    target_entity: Option<EntityRef>,
    entity_id: String,
    entity_type: EntityType,
    company_id: String,
}

impl IngestEventRequest {
    fn into_event(self) -> TimelineEvent {
        TimelineEvent {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            event_type: self.event_type,
            module: self.module,
            title: self.title,
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            metadata: self.metadata,
            source_entity: self.source_entity,
            target_entity: self.target_entity,
            entity_id: self.entity_id,
            entity_type: self.entity_type,
            company_id: self.company_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedRequest {
    entity_id: String,
    entity_type: EntityType,
    company_id: String,
    #[serde(default)]
    module: Option<EventModule>,
    #[serde(default, rename = "type")]
    event_type: Option<TimelineEventType>,
    #[serde(default)]
    status: Option<EventStatus>,
    #[serde(default)]
    priority: Option<EventPriority>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    from: Option<DateTime<Utc>>,
    #[serde(default)]
    to: Option<DateTime<Utc>>,
}

impl FeedRequest {
    fn into_parts(self) -> (FeedScope, TimelineFilters) {
        let scope = FeedScope::new(self.entity_id, self.entity_type, self.company_id);

        let date_range = if self.from.is_some() || self.to.is_some() {
            Some(DateRange {
                from: self.from,
                to: self.to,
            })
        } else {
            None
        };

        let filters = TimelineFilters {
            modules: self.module.into_iter().collect(),
            types: self.event_type.into_iter().collect(),
            status: self.status.into_iter().collect(),
            priority: self.priority.into_iter().collect(),
            date_range,
            search: self.search,
            ..TimelineFilters::default()
        };

        (scope, filters)
    }
}

#[derive(Debug, Serialize)]
struct FeedResponse {
    events: Vec<TimelineEvent>,
    active_modules: Vec<EventModule>,
    failures: Vec<SourceFailure>,
    stats: FeedStats,
}

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error("failed to bind timeline service: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid bind address: {0}")]
    Addr(#[from] std::net::AddrParseError),
    #[error("configuration error: {0}")]
    Config(#[from] EventideError),
}

#[derive(Debug, Clone)]
struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Validation(_) | FeedError::ModuleMismatch { .. } => {
                AppError::bad_request(err.to_string())
            }
            FeedError::Unavailable(_) => AppError::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    fn test_state() -> AppState {
        AppState::new(Arc::new(ModuleRegistry::builtin()), None)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("parse body")
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ingested_events_show_up_in_the_feed() {
        let state = test_state();
        let app = build_router(state);

        let payload = serde_json::json!({
            "type": "ticket_opened",
            "module": "support",
            "title": "Printer on fire",
            "priority": "critical",
            "entity_id": "c1",
            "entity_type": "company",
            "company_id": "acme",
        });
        let response = app
            .clone()
            .oneshot(
                Request::post("/v1/events")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::get("/v1/feed?entity_id=c1&entity_type=company&company_id=acme")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["events"].as_array().map(|events| events.len()), Some(1));
        assert_eq!(body["events"][0]["type"], "ticket_opened");
        assert_eq!(body["active_modules"][0], "support");
        assert_eq!(body["stats"]["total_events"], 1);
    }

    #[tokio::test]
    async fn feed_is_tenant_isolated() {
        let state = test_state();
        let app = build_router(state);

        for company in ["acme", "globex"] {
            let payload = serde_json::json!({
                "type": "note_added",
                "module": "crm",
                "title": format!("note for {company}"),
                "entity_id": "c1",
                "entity_type": "company",
                "company_id": company,
            });
            let response = app
                .clone()
                .oneshot(
                    Request::post("/v1/events")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(payload.to_string()))
                        .unwrap(),
                )
                .await
                .expect("request");
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(
                Request::get("/v1/feed?entity_id=c1&entity_type=company&company_id=acme")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("request");
        let body = body_json(response).await;
        assert_eq!(body["events"].as_array().map(|events| events.len()), Some(1));
        assert_eq!(body["events"][0]["company_id"], "acme");
    }

    #[tokio::test]
    async fn undeclared_event_type_is_a_bad_request() {
        let app = build_router(test_state());

        let payload = serde_json::json!({
            "type": "ticket_opened",
            "module": "crm",
            "title": "wrong module",
            "entity_id": "c1",
            "entity_type": "company",
            "company_id": "acme",
        });
        let response = app
            .oneshot(
                Request::post("/v1/events")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .expect("request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("not declared"));
    }

    #[tokio::test]
    async fn unknown_module_is_accepted_and_served_unstyled() {
        let app = build_router(test_state());

        let payload = serde_json::json!({
            "type": "note_added",
            "module": "billing",
            "title": "from a module we do not know",
            "entity_id": "c1",
            "entity_type": "company",
            "company_id": "acme",
        });
        let response = app
            .clone()
            .oneshot(
                Request::post("/v1/events")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::get("/v1/feed?entity_id=c1&entity_type=company&company_id=acme")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("request");
        let body = body_json(response).await;
        assert_eq!(body["events"][0]["module"], "unknown");
    }
}
