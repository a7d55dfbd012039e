pub mod connection;
pub mod session;

use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::ChannelError;

pub use session::spawn_channel;

/// Events the channel task hands to the view owner
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Opened,
    /// Raw text payload of one telemetry message
    Message(String),
    /// A frame that cannot even be read as text
    Malformed(String),
    Reconnecting { attempt: u32, delay: Duration },
    Closed(String),
}

pub(crate) async fn emit(
    events: &mpsc::Sender<ChannelEvent>,
    event: ChannelEvent,
) -> Result<(), ChannelError> {
    events.send(event).await.map_err(|_| ChannelError::ViewGone)
}
