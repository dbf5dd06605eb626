//! OpenAPI documentation

use courier_types::{QueueId, QueueStats, TopicStats};
use utoipa::OpenApi;

use crate::api::{
    CreateQueueResponse, CreateRequest, HealthResponse, MessageBody, TopicPublishResponse,
};
use crate::error::ApiErrorBody;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Courier API",
        version = "0.1.0",
        description = "Courier - in-memory queues and topics over HTTP",
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::api::health,
        crate::api::list_queues,
        crate::api::create_queue,
        crate::api::publish_message,
        crate::api::consume_message,
        crate::api::queue_stats,
        crate::api::watch_queue,
        crate::api::create_topic,
        crate::api::publish_to_topic,
        crate::api::subscribe_to_topic,
        crate::api::topic_stats,
    ),
    components(
        schemas(
            HealthResponse,
            CreateRequest,
            CreateQueueResponse,
            MessageBody,
            TopicPublishResponse,
            QueueId,
            QueueStats,
            TopicStats,
            ApiErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "queues", description = "Queue management endpoints"),
        (name = "messages", description = "Queue message endpoints"),
        (name = "topics", description = "Pub/sub topic endpoints")
    )
)]
pub struct ApiDoc;
