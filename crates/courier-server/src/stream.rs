//! Streaming adapters
//!
//! Bridges a [`Subscription`] to a remote listener, either as a chunked
//! NDJSON response body or as a WebSocket. Either way the subscription is
//! dropped, and so unsubscribed, as soon as the remote goes away or a
//! write fails.

use axum::{
    body::Body,
    extract::ws::{Message, WebSocket},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use courier_core::Subscription;
use futures::{sink::SinkExt, stream::StreamExt};
use tracing::{debug, info, warn};

use crate::api::MessageBody;

/// Content type of the topic stream
pub const NDJSON: &str = "application/x-ndjson";

fn encode_line(message: String) -> Result<Bytes, serde_json::Error> {
    let mut line = serde_json::to_vec(&MessageBody { message })?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// Stream every message from `subscription` as one JSON line.
///
/// The body owns the subscription; hyper drops the body when the client
/// disconnects, which unsubscribes.
pub fn ndjson_response(subscription: Subscription) -> Response {
    let events = futures::stream::unfold(subscription, |mut subscription| async move {
        let message = subscription.recv().await?;
        Some((encode_line(message), subscription))
    });

    (
        [
            (header::CONTENT_TYPE, NDJSON),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(events),
    )
        .into_response()
}

/// Relay every message from `subscription` to `socket` as a text frame
pub async fn relay_websocket(socket: WebSocket, mut subscription: Subscription, queue: String) {
    let subscriber = subscription.id();
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = subscription.recv().await {
            let frame = match serde_json::to_string(&MessageBody { message }) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "Failed to encode message");
                    break;
                }
            };
            if let Err(e) = sender.send(Message::Text(frame)).await {
                debug!(error = %e, "WebSocket write failed");
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    // Whichever side finishes first ends the connection
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    info!(queue = %queue, subscriber = %subscriber, "Queue watcher disconnected");
}
