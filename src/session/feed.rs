//! WebSocket reader that turns a call's live frames into bus events.

use super::{CallEvent, SessionEvents};
use futures_util::StreamExt;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Read frames from `url` until the call ends or the socket closes.
///
/// Connection and transport failures are published as [`CallEvent::Error`] so the UI
/// leaves the live-call state instead of waiting forever.
pub(crate) async fn run_event_feed(url: String, events: SessionEvents) {
    let mut stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            warn!(%url, error = %err, "event feed connect failed");
            events.publish(CallEvent::Error(format!("event feed unavailable: {err}")));
            return;
        }
    };
    info!(%url, "event feed connected");

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let Some(event) = CallEvent::from_frame(&text) else {
                    debug!(frame = %text, "ignoring unrecognized session frame");
                    continue;
                };
                debug!(event = event.name(), "session event");
                let call_ended = event == CallEvent::CallEnd;
                events.publish(event);
                if call_ended {
                    let _ = stream.close(None).await;
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "event feed dropped");
                events.publish(CallEvent::Error(format!("event feed dropped: {err}")));
                break;
            }
        }
    }
    info!(%url, "event feed closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_feed_publishes_an_error_event() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind probe port");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let bus = SessionEvents::new();
        let sub = bus.subscribe();
        run_event_feed(format!("ws://{addr}/call/x/events"), bus.clone()).await;

        match sub.try_next() {
            Some(CallEvent::Error(message)) => {
                assert!(message.starts_with("event feed unavailable"), "{message}");
            }
            other => panic!("expected error event, got {other:?}"),
        }
    }
}
