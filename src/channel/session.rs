/// Channel task: keeps the WebSocket open and forwards frames to the view
use futures_util::StreamExt;
use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::channel::connection::{back_off, connect_with_retry, TelemetryStream};
use crate::channel::{emit, ChannelEvent};
use crate::config::ReconnectPolicy;
use crate::error::ChannelError;

const EVENT_BUFFER: usize = 64;
/// A session open at least this long counts as healthy even without data
const STABLE_SESSION: Duration = Duration::from_secs(10);

/// How a session ended
struct SessionEnd {
    reason: String,
    messages: u64,
}

/// Start the channel task and return the receiving end of its events
///
/// A fatal channel error is delivered to the view as a final `Closed` event.
pub fn spawn_channel(
    endpoint: Url,
    policy: ReconnectPolicy,
) -> (mpsc::Receiver<ChannelEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let handle = tokio::spawn(async move {
        if let Err(e) = run_channel(endpoint, policy, tx.clone()).await {
            error!("Telemetry channel stopped: {}", e);
            if tx.send(ChannelEvent::Closed(e.to_string())).await.is_err() {
                debug!("View already gone; final channel state not delivered");
            }
        }
    });
    (rx, handle)
}

/// Run the channel until it closes for good
///
/// With reconnection disabled this returns after the first session ends,
/// leaving the view frozen at its last values.
///
/// A session that ends without delivering a message and before
/// `STABLE_SESSION` counts as a failure, same as a refused connection.
pub async fn run_channel(
    endpoint: Url,
    policy: ReconnectPolicy,
    events: mpsc::Sender<ChannelEvent>,
) -> Result<(), ChannelError> {
    info!("Opening telemetry channel to {}", endpoint);
    let mut failures: u32 = 0;

    loop {
        let stream = connect_with_retry(&endpoint, &policy, &events, &mut failures).await?;
        emit(&events, ChannelEvent::Opened).await?;
        let opened_at = Instant::now();

        let end = forward_frames(stream, &events).await?;
        info!(
            "Telemetry channel closed after {} messages: {}",
            end.messages, end.reason
        );
        emit(&events, ChannelEvent::Closed(end.reason)).await?;

        if !policy.enabled {
            info!("Reconnection disabled; keeping last known values");
            return Ok(());
        }

        if end.messages > 0 || opened_at.elapsed() >= STABLE_SESSION {
            failures = 0;
        }
        back_off(&policy, &events, &mut failures).await?;
    }
}

/// Forward frames until the session ends
async fn forward_frames(
    mut stream: TelemetryStream,
    events: &mpsc::Sender<ChannelEvent>,
) -> Result<SessionEnd, ChannelError> {
    let mut messages = 0;

    while let Some(frame) = stream.next().await {
        let reason = match frame {
            Ok(Message::Text(text)) => {
                debug!("Received {} byte text frame", text.len());
                messages += 1;
                emit(events, ChannelEvent::Message(text)).await?;
                continue;
            }
            Ok(Message::Binary(bytes)) => {
                let event = match String::from_utf8(bytes) {
                    Ok(text) => ChannelEvent::Message(text),
                    Err(e) => ChannelEvent::Malformed(format!("binary frame is not UTF-8: {}", e)),
                };
                messages += 1;
                emit(events, event).await?;
                continue;
            }
            Ok(Message::Close(frame)) => match frame {
                Some(frame) if !frame.reason.is_empty() => {
                    format!("closed by hub: {}", frame.reason)
                }
                Some(frame) => format!("closed by hub (code {})", u16::from(frame.code)),
                None => "closed by hub".to_string(),
            },
            Ok(other) => {
                debug!("Ignoring control frame: {:?}", other);
                continue;
            }
            Err(e) => format!("connection lost: {}", e),
        };
        return Ok(SessionEnd { reason, messages });
    }

    Ok(SessionEnd {
        reason: "connection ended".to_string(),
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::SinkExt;
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn serve_once(frames: Vec<Message>) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            for frame in frames {
                ws.send(frame).await.unwrap();
            }
            let _ = ws.close(None).await;
        });
        Url::parse(&format!("ws://{}/ws", addr)).unwrap()
    }

    async fn collect(mut rx: mpsc::Receiver<ChannelEvent>) -> Vec<ChannelEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn forwards_frames_in_order_then_closes() {
        let endpoint = serve_once(vec![
            Message::Text(r#"{"bpm":70}"#.to_string()),
            Message::Binary(vec![0xff, 0xfe]),
            Message::Binary(br#"{"sosLog":"S1"}"#.to_vec()),
        ])
        .await;
        let (tx, rx) = mpsc::channel(16);

        run_channel(endpoint, ReconnectPolicy::disabled(), tx)
            .await
            .unwrap();

        let events = collect(rx).await;
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], ChannelEvent::Opened);
        assert_eq!(events[1], ChannelEvent::Message(r#"{"bpm":70}"#.to_string()));
        assert!(matches!(events[2], ChannelEvent::Malformed(_)));
        assert_eq!(events[3], ChannelEvent::Message(r#"{"sosLog":"S1"}"#.to_string()));
        assert!(matches!(events[4], ChannelEvent::Closed(_)));
    }

    #[tokio::test]
    async fn reconnects_after_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for n in 0..2 {
                let (tcp, _) = listener.accept().await.unwrap();
                let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
                ws.send(Message::Text(format!(r#"{{"bpm":{}}}"#, 60 + n)))
                    .await
                    .unwrap();
                let _ = ws.close(None).await;
            }
        });
        let endpoint = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
        let policy = ReconnectPolicy {
            enabled: true,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            max_attempts: Some(2),
        };

        let (mut rx, handle) = spawn_channel(endpoint, policy);
        let mut messages = Vec::new();
        let mut opened = 0;
        while let Some(event) = rx.recv().await {
            match event {
                ChannelEvent::Opened => opened += 1,
                ChannelEvent::Message(text) => messages.push(text),
                _ => {}
            }
        }
        handle.await.unwrap();

        assert_eq!(opened, 2);
        assert_eq!(messages, vec![r#"{"bpm":60}"#, r#"{"bpm":61}"#]);
    }

    #[tokio::test]
    async fn empty_sessions_back_off_and_give_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                if let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await {
                    let _ = ws.close(None).await;
                }
            }
        });
        let endpoint = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
        let policy = ReconnectPolicy {
            enabled: true,
            initial_delay: Duration::from_millis(2),
            max_delay: Duration::from_millis(50),
            max_attempts: Some(3),
        };
        let (tx, rx) = mpsc::channel(64);

        let result = run_channel(endpoint, policy, tx).await;
        assert!(matches!(result, Err(ChannelError::RetriesExhausted(3))));

        let events = collect(rx).await;
        let opened = events
            .iter()
            .filter(|e| matches!(e, ChannelEvent::Opened))
            .count();
        let delays: Vec<Duration> = events
            .iter()
            .filter_map(|e| match e {
                ChannelEvent::Reconnecting { delay, .. } => Some(*delay),
                _ => None,
            })
            .collect();

        assert_eq!(opened, 3);
        assert_eq!(
            delays,
            vec![Duration::from_millis(2), Duration::from_millis(4)]
        );
    }
}
