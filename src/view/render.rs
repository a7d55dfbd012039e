/// Text rendering of the dashboard panel
///
/// Rendering is pure: it reads the view state and returns the panel text.
use std::fmt::Write;

use crate::models::ConnectionStatus;
use crate::utils::format_datetime;
use crate::view::bounded_log::BoundedEventLog;
use crate::view::state::ViewState;

const PLACEHOLDER: &str = "--";

fn or_placeholder(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(PLACEHOLDER)
}

pub fn status_label(status: &ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Connecting => "Connecting".to_string(),
        ConnectionStatus::Connected { since } => {
            format!("Connected since {}", format_datetime(since))
        }
        ConnectionStatus::Reconnecting { attempt } => {
            format!("Reconnecting (attempt {})", attempt)
        }
        ConnectionStatus::Disconnected { reason } => format!("Disconnected: {}", reason),
    }
}

fn write_log(out: &mut String, title: &str, log: &BoundedEventLog) {
    let _ = writeln!(out, "{} ({})", title, log.len());
    if log.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for entry in log.entries() {
        let _ = writeln!(out, "  - {}", entry);
    }
}

/// Render the full panel for the current state
pub fn render_panel(state: &ViewState) -> String {
    let fields = state.fields();
    let mut out = String::new();

    let _ = writeln!(out, "=== SenseBand Dashboard === [{}]", status_label(state.status()));

    let _ = writeln!(out, "Live Location");
    let _ = writeln!(
        out,
        "  Lat: {}, Lng: {}",
        or_placeholder(&fields.lat),
        or_placeholder(&fields.lng)
    );

    let _ = writeln!(out, "Device Status");
    let _ = writeln!(
        out,
        "  Battery Level: {}",
        fields.battery.as_deref().unwrap_or("--%")
    );
    let _ = writeln!(out, "  Signal Strength: {}", or_placeholder(&fields.signal));
    let _ = writeln!(out, "  Last Sync: {}", or_placeholder(&fields.last_sync));

    let _ = writeln!(out, "Heart Rate");
    let _ = writeln!(out, "  Current BPM: {}", or_placeholder(&fields.bpm));
    write_log(&mut out, "Heart Rate Log", state.heart_rate_log());

    write_log(&mut out, "Obstacle Alerts", state.obstacle_log());

    let _ = writeln!(out, "Environment");
    let _ = writeln!(out, "  Temperature: {} °C", or_placeholder(&fields.temperature));
    let _ = writeln!(out, "  Humidity: {}%", or_placeholder(&fields.humidity));
    let _ = writeln!(out, "  Rain Detected: {}", or_placeholder(&fields.rain));

    write_log(&mut out, "SOS Alerts", state.sos_log());

    out
}
