/// Inbound message handling: decode first, then apply as a whole
use log::{debug, warn};

use crate::error::ViewError;
use crate::models::TelemetrySnapshot;
use crate::view::state::{ApplySummary, ViewState};

/// Decode a raw channel payload into a snapshot
///
/// The payload must be a JSON object. Anything else, including an object
/// whose known keys carry the wrong type, is `ViewError::MalformedMessage`.
pub fn decode_snapshot(payload: &str) -> Result<TelemetrySnapshot, ViewError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    if !value.is_object() {
        return Err(ViewError::MalformedMessage(serde::de::Error::custom(
            "expected a JSON object",
        )));
    }
    Ok(serde_json::from_value(value)?)
}

/// Handle one inbound message against the view state
///
/// Decoding completes before any mutation, so a malformed payload leaves every
/// displayed value exactly as it was.
pub fn handle_message(state: &mut ViewState, payload: &str) -> Result<ApplySummary, ViewError> {
    let snapshot = match decode_snapshot(payload) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            state.record_dropped();
            warn!("Dropping telemetry message: {}", e);
            debug!("Dropped payload: {}", payload);
            return Err(e);
        }
    };

    let summary = state.apply(&snapshot);
    debug!(
        "Applied snapshot: {} fields, {} log entries",
        summary.fields_updated, summary.log_entries_added
    );
    Ok(summary)
}
