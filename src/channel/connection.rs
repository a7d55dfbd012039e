use log::{error, info};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::channel::{emit, ChannelEvent};
use crate::config::ReconnectPolicy;
use crate::error::{ChannelError, ConfigError};

pub type TelemetryStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Build `ws://<host>:<port><path>` for the hub's telemetry socket
pub fn telemetry_endpoint(host: &str, port: u16, path: &str) -> Result<Url, ConfigError> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    Ok(Url::parse(&format!("ws://{}:{}{}", host, port, path))?)
}

/// Parse a full endpoint URL; only `ws` and `wss` are accepted
pub fn parse_endpoint_override(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(ConfigError::InvalidValue {
            key: "SENSEBAND_URL",
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}', expected ws or wss", other),
        }),
    }
}

/// Open a single WebSocket connection to the endpoint
pub async fn connect(endpoint: &Url) -> Result<TelemetryStream, ChannelError> {
    let (stream, response) = connect_async(endpoint.as_str()).await?;
    info!(
        "Connected to {} (HTTP {})",
        endpoint,
        response.status().as_u16()
    );
    Ok(stream)
}

/// Count one more consecutive failure and wait out its backoff delay
///
/// Fails with `RetriesExhausted` once the policy's attempt limit is reached.
/// The delay is reported to the view as `ChannelEvent::Reconnecting` first.
pub async fn back_off(
    policy: &ReconnectPolicy,
    events: &mpsc::Sender<ChannelEvent>,
    failures: &mut u32,
) -> Result<(), ChannelError> {
    *failures += 1;
    if policy.exhausted(*failures) {
        return Err(ChannelError::RetriesExhausted(*failures));
    }

    let delay = policy.delay_for(*failures);
    emit(
        events,
        ChannelEvent::Reconnecting {
            attempt: *failures,
            delay,
        },
    )
    .await?;
    sleep(delay).await;
    Ok(())
}

/// Connect, retrying with exponential backoff when the policy allows it
///
/// `failures` counts consecutive failures and carries over from earlier
/// sessions, so a hub that keeps dropping connections still backs off.
pub async fn connect_with_retry(
    endpoint: &Url,
    policy: &ReconnectPolicy,
    events: &mpsc::Sender<ChannelEvent>,
    failures: &mut u32,
) -> Result<TelemetryStream, ChannelError> {
    loop {
        let err = match connect(endpoint).await {
            Ok(stream) => return Ok(stream),
            Err(e) => e,
        };

        error!(
            "Attempt {}: connection to {} failed: {}",
            *failures + 1,
            endpoint,
            err
        );

        if !policy.enabled {
            return Err(err);
        }
        back_off(policy, events, failures).await?;
    }
}
