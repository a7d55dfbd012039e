pub mod activity;
pub mod bounded_log;
pub mod handler;
pub mod render;
pub mod state;

use log::{info, warn};
use time::OffsetDateTime;

use crate::channel::ChannelEvent;
use crate::error::ViewError;
use crate::models::ConnectionStatus;

pub use handler::handle_message;
pub use render::render_panel;
pub use state::ViewState;

/// Single owner of the view state
///
/// All mutation goes through `handle_event`, called from one event loop.
#[derive(Debug, Default)]
pub struct TelemetryView {
    state: ViewState,
}

impl TelemetryView {
    pub fn new() -> Self {
        Self {
            state: ViewState::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Apply a channel event; returns true when the panel should be redrawn
    pub fn handle_event(&mut self, event: ChannelEvent) -> bool {
        match event {
            ChannelEvent::Opened => {
                info!("Telemetry channel open");
                self.state.set_status(ConnectionStatus::Connected {
                    since: OffsetDateTime::now_utc(),
                });
                true
            }
            ChannelEvent::Message(payload) => match handle_message(&mut self.state, &payload) {
                Ok(summary) => {
                    if summary.sos_raised {
                        if let Some(alert) = self.state.sos_log().latest() {
                            warn!("SOS alert from device: {}", alert);
                        }
                    }
                    !summary.is_empty()
                }
                Err(_) => false,
            },
            ChannelEvent::Malformed(reason) => {
                self.state.record_dropped();
                warn!("Dropping telemetry frame: {}", reason);
                false
            }
            ChannelEvent::Reconnecting { attempt, delay } => {
                info!(
                    "Reconnecting to telemetry channel in {} ms (attempt {})",
                    delay.as_millis(),
                    attempt
                );
                self.state
                    .set_status(ConnectionStatus::Reconnecting { attempt });
                true
            }
            ChannelEvent::Closed(reason) => {
                warn!("{}", ViewError::ChannelClosed(reason.clone()));
                self.state
                    .set_status(ConnectionStatus::Disconnected { reason });
                true
            }
        }
    }
}
