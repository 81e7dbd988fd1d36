//! Server-sent event stream.
//!
//! `GET /api/stream` emits `STREAM_EVENT_COUNT` events, one every
//! `STREAM_INTERVAL_MS`, then closes:
//!
//! ```text
//! data: {"index":0,"timestamp":"2024-01-15T10:30:00Z"}
//!
//! data: {"index":1,"timestamp":"2024-01-15T10:30:00.100Z"}
//! ```
//!
//! Events are produced by a tracked background task feeding a bounded
//! channel. The task stops early when the client goes away or the
//! application shuts down.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Extension, State};
use axum::response::sse::{Event, Sse};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info_span, instrument};

use crate::error::ErrorEnvelope;
use crate::metrics;
use crate::middleware::AuthenticatedKey;
use crate::models::StreamEvent;
use crate::state::AppState;

type EventSender = mpsc::Sender<Result<Event, Infallible>>;

#[utoipa::path(
    get,
    path = "/api/stream",
    tag = "stream",
    responses(
        (status = 200, description = "Server-sent events, one JSON payload each",
            content_type = "text/event-stream", body = StreamEvent),
        (status = 401, description = "No credential", body = ErrorEnvelope),
        (status = 403, description = "Credential not accepted", body = ErrorEnvelope)
    ),
    security(("bearer_auth" = []), ("api_key" = []))
)]
#[instrument(skip_all, fields(key = %key.masked()))]
pub async fn stream_data(
    State(state): State<AppState>,
    Extension(key): Extension<AuthenticatedKey>,
) -> Sse<ReceiverStream<Result<Event, Infallible>>> {
    let count = state.config.stream_event_count;
    let interval = state.config.stream_interval;

    // Capacity 1: the producer never runs ahead of the client.
    let (tx, rx) = mpsc::channel(1);
    state.spawn(
        produce_events(tx, count, interval, state.shutdown_token())
            .instrument(info_span!("stream_producer", count)),
    );

    Sse::new(ReceiverStream::new(rx))
}

async fn produce_events(
    tx: EventSender,
    count: u32,
    interval: Duration,
    shutdown: CancellationToken,
) {
    for index in 0..count {
        if index > 0 {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!(index, "Shutdown requested, ending stream");
                    return;
                }
                () = tx.closed() => {
                    debug!(index, "Client disconnected");
                    return;
                }
                () = tokio::time::sleep(interval) => {}
            }
        }

        let event = match Event::default().json_data(StreamEvent::now(index)) {
            Ok(event) => event,
            Err(e) => {
                error!(index, error = %e, "Failed to encode stream event");
                return;
            }
        };

        if tx.send(Ok(event)).await.is_err() {
            debug!(index, "Client disconnected");
            return;
        }
        metrics::record_stream_event();
    }

    debug!(count, "Stream complete");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_producer_emits_count_events() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = tokio::spawn(produce_events(
            tx,
            3,
            Duration::from_millis(1),
            CancellationToken::new(),
        ));

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        handle.await.unwrap();
        assert_eq!(received, 3);
    }

    #[tokio::test]
    async fn test_producer_stops_when_receiver_dropped() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = tokio::spawn(produce_events(
            tx,
            1_000,
            Duration::from_millis(1),
            CancellationToken::new(),
        ));

        rx.recv().await.unwrap();
        drop(rx);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("producer should stop after the receiver is dropped")
            .unwrap();
    }

    #[tokio::test]
    async fn test_producer_stops_on_shutdown() {
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        let handle = tokio::spawn(produce_events(
            tx,
            1_000,
            Duration::from_secs(60),
            token.clone(),
        ));

        rx.recv().await.unwrap();
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("producer should stop on shutdown")
            .unwrap();
    }
}
