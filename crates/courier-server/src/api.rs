//! HTTP routes and handlers
//!
//! Thin adapters: each handler resolves a queue or topic by name, calls one
//! core operation and maps the result onto a status code.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        Query, State,
    },
    http::{StatusCode, Version},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use courier_core::{Broker, QueueManager};
use courier_types::{DeliveryConfig, Error, QueueId, QueueStats, TopicStats, DEFAULT_QUEUE};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::docs::ApiDoc;
use crate::error::{ApiErrorBody, AppError};
use crate::stream;

// ==================== App State ====================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub queues: Arc<QueueManager>,
    pub broker: Arc<Broker>,
}

impl AppState {
    pub fn new(delivery: DeliveryConfig) -> Self {
        Self {
            queues: Arc::new(QueueManager::new(delivery.clone())),
            broker: Arc::new(Broker::new(delivery)),
        }
    }
}

// ==================== Request/Response Types ====================

/// Create queue or topic request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRequest {
    /// Name to register
    pub name: String,
}

/// Create queue response
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateQueueResponse {
    /// Identifier assigned to the new queue
    pub id: QueueId,
}

/// A single message, as published, consumed and streamed
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    /// Message payload
    pub message: String,
}

/// Topic publish response
#[derive(Debug, Serialize, ToSchema)]
pub struct TopicPublishResponse {
    /// Subscribers the message was offered to
    pub subscribers: usize,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status
    pub status: String,
    /// Server version
    pub version: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QueueQuery {
    /// Queue name (defaults to "default")
    #[serde(default = "default_queue")]
    pub queue: String,
}

fn default_queue() -> String {
    DEFAULT_QUEUE.to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopicQuery {
    /// Topic name
    pub topic: Option<String>,
}

impl TopicQuery {
    fn name(self) -> Result<String, Error> {
        self.topic
            .ok_or_else(|| Error::InvalidRequest("missing query parameter: topic".to_string()))
    }
}

fn validate_name(name: String) -> Result<String, Error> {
    if name.trim().is_empty() {
        return Err(Error::InvalidRequest("name must not be empty".to_string()));
    }
    Ok(name)
}

// ==================== Handlers ====================

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// List all queue names
#[utoipa::path(
    get,
    path = "/queues",
    tag = "queues",
    responses(
        (status = 200, description = "Names of all queues", body = Vec<String>)
    )
)]
pub async fn list_queues(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.queues.list_queues())
}

/// Create a new queue
#[utoipa::path(
    post,
    path = "/queues",
    tag = "queues",
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Queue created", body = CreateQueueResponse),
        (status = 400, description = "Invalid or empty name", body = ApiErrorBody),
        (status = 409, description = "Queue already exists", body = ApiErrorBody)
    )
)]
pub async fn create_queue(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateQueueResponse>), AppError> {
    let Json(req) = payload?;
    let name = validate_name(req.name)?;
    let id = state.queues.create_queue(name)?;

    Ok((StatusCode::CREATED, Json(CreateQueueResponse { id })))
}

/// Publish a message to a queue
#[utoipa::path(
    post,
    path = "/queue",
    tag = "messages",
    params(QueueQuery),
    request_body = MessageBody,
    responses(
        (status = 201, description = "Message queued"),
        (status = 400, description = "Invalid body", body = ApiErrorBody),
        (status = 404, description = "Queue not found", body = ApiErrorBody)
    )
)]
pub async fn publish_message(
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
    payload: Result<Json<MessageBody>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(body) = payload?;
    state.queues.queue(&query.queue)?.publish(body.message);

    Ok(StatusCode::CREATED)
}

/// Consume the oldest message from a queue
#[utoipa::path(
    get,
    path = "/queue",
    tag = "messages",
    params(QueueQuery),
    responses(
        (status = 200, description = "Oldest pending message", body = MessageBody),
        (status = 204, description = "Queue is empty"),
        (status = 404, description = "Queue not found", body = ApiErrorBody)
    )
)]
pub async fn consume_message(
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> Result<Response, AppError> {
    let response = match state.queues.queue(&query.queue)?.consume() {
        Some(message) => Json(MessageBody { message }).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    };

    Ok(response)
}

/// Get queue statistics
#[utoipa::path(
    get,
    path = "/queue/stats",
    tag = "queues",
    params(QueueQuery),
    responses(
        (status = 200, description = "Queue statistics", body = QueueStats),
        (status = 404, description = "Queue not found", body = ApiErrorBody)
    )
)]
pub async fn queue_stats(
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> Result<Json<QueueStats>, AppError> {
    Ok(Json(state.queues.queue(&query.queue)?.stats()))
}

/// Watch a queue over a WebSocket
///
/// Every message published to the queue after the upgrade is sent as a
/// `{"message": ...}` text frame. Watching does not consume.
#[utoipa::path(
    get,
    path = "/queue/ws",
    tag = "messages",
    params(QueueQuery),
    responses(
        (status = 101, description = "Switching to WebSocket"),
        (status = 404, description = "Queue not found", body = ApiErrorBody),
        (status = 500, description = "Upgrade failed", body = ApiErrorBody)
    )
)]
pub async fn watch_queue(
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AppError> {
    let queue = state.queues.queue(&query.queue)?;
    let upgrade = upgrade.map_err(|e| Error::StreamingUnsupported(e.body_text()))?;

    let subscription = queue.subscribe();
    info!(queue = %query.queue, subscriber = %subscription.id(), "Queue watcher connected");

    Ok(upgrade.on_upgrade(move |socket| {
        stream::relay_websocket(socket, subscription, query.queue)
    }))
}

/// Create a new topic
#[utoipa::path(
    post,
    path = "/topics",
    tag = "topics",
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Topic created"),
        (status = 400, description = "Invalid or empty name", body = ApiErrorBody),
        (status = 409, description = "Topic already exists", body = ApiErrorBody)
    )
)]
pub async fn create_topic(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(req) = payload?;
    let name = validate_name(req.name)?;
    state.broker.create_topic(name)?;

    Ok(StatusCode::CREATED)
}

/// Publish a message to every current subscriber of a topic
#[utoipa::path(
    post,
    path = "/topics/publish",
    tag = "topics",
    params(TopicQuery),
    request_body = MessageBody,
    responses(
        (status = 200, description = "Message fanned out", body = TopicPublishResponse),
        (status = 400, description = "Invalid body or missing topic", body = ApiErrorBody),
        (status = 404, description = "Topic not found", body = ApiErrorBody)
    )
)]
pub async fn publish_to_topic(
    State(state): State<AppState>,
    Query(query): Query<TopicQuery>,
    payload: Result<Json<MessageBody>, JsonRejection>,
) -> Result<Json<TopicPublishResponse>, AppError> {
    let Json(body) = payload?;
    let topic = state.broker.topic(&query.name()?)?;
    let subscribers = topic.publish(body.message);

    Ok(Json(TopicPublishResponse { subscribers }))
}

/// Subscribe to a topic as a stream of JSON lines
#[utoipa::path(
    get,
    path = "/topics/subscribe",
    tag = "topics",
    params(TopicQuery),
    responses(
        (status = 200, description = "One JSON message per line", body = String, content_type = "application/x-ndjson"),
        (status = 400, description = "Missing topic", body = ApiErrorBody),
        (status = 404, description = "Topic not found", body = ApiErrorBody),
        (status = 500, description = "Streaming unsupported", body = ApiErrorBody)
    )
)]
pub async fn subscribe_to_topic(
    State(state): State<AppState>,
    Query(query): Query<TopicQuery>,
    version: Version,
) -> Result<Response, AppError> {
    let name = query.name()?;
    let topic = state.broker.topic(&name)?;

    // HTTP/1.0 has no chunked transfer encoding
    if version == Version::HTTP_09 || version == Version::HTTP_10 {
        return Err(Error::StreamingUnsupported(format!("{version:?} cannot stream")).into());
    }

    let subscription = topic.subscribe();
    info!(topic = %name, subscriber = %subscription.id(), "Topic stream opened");

    Ok(stream::ndjson_response(subscription))
}

/// Get topic statistics
#[utoipa::path(
    get,
    path = "/topics/stats",
    tag = "topics",
    params(TopicQuery),
    responses(
        (status = 200, description = "Topic statistics", body = TopicStats),
        (status = 400, description = "Missing topic", body = ApiErrorBody),
        (status = 404, description = "Topic not found", body = ApiErrorBody)
    )
)]
pub async fn topic_stats(
    State(state): State<AppState>,
    Query(query): Query<TopicQuery>,
) -> Result<Json<TopicStats>, AppError> {
    Ok(Json(state.broker.topic(&query.name()?)?.stats()))
}

// ==================== Router ====================

pub fn router(state: AppState) -> Router {
    Router::new()
        // Health and docs
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi))
        // Queues
        .route("/queues", get(list_queues).post(create_queue))
        .route("/queue", get(consume_message).post(publish_message))
        .route("/queue/stats", get(queue_stats))
        .route("/queue/ws", get(watch_queue))
        // Topics
        .route("/topics", post(create_topic))
        .route("/topics/publish", post(publish_to_topic))
        .route("/topics/subscribe", get(subscribe_to_topic))
        .route("/topics/stats", get(topic_stats))
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
