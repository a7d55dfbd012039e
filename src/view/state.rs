/// Owned view state: the latest displayed values plus the three event logs
use crate::models::{ConnectionStatus, Reading, TelemetrySnapshot};
use crate::utils::format_coordinate;
use crate::view::bounded_log::BoundedEventLog;

/// Display text for every scalar field, `None` until first received
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayFields {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub battery: Option<String>,
    pub bpm: Option<String>,
    pub signal: Option<String>,
    pub last_sync: Option<String>,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub rain: Option<String>,
}

/// What a single snapshot changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub fields_updated: usize,
    pub log_entries_added: usize,
    pub sos_raised: bool,
}

impl ApplySummary {
    pub fn is_empty(&self) -> bool {
        self.fields_updated == 0 && self.log_entries_added == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    fields: DisplayFields,
    obstacles: BoundedEventLog,
    sos: BoundedEventLog,
    heart_rate: BoundedEventLog,
    status: ConnectionStatus,
    messages_applied: u64,
    messages_dropped: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            fields: DisplayFields::default(),
            obstacles: BoundedEventLog::new(),
            sos: BoundedEventLog::new(),
            heart_rate: BoundedEventLog::new(),
            status: ConnectionStatus::Connecting,
            messages_applied: 0,
            messages_dropped: 0,
        }
    }

    /// Apply one decoded snapshot
    ///
    /// Present scalar fields overwrite their display value (last write wins,
    /// no range checks). Truthy log fields are prepended to their own log.
    /// Absent fields leave the current display untouched.
    pub fn apply(&mut self, snapshot: &TelemetrySnapshot) -> ApplySummary {
        let mut summary = ApplySummary::default();
        let fields = &mut self.fields;

        let mut set = |slot: &mut Option<String>, value: Option<String>| {
            if let Some(value) = value {
                *slot = Some(value);
                summary.fields_updated += 1;
            }
        };

        set(&mut fields.lat, snapshot.lat.map(format_coordinate));
        set(&mut fields.lng, snapshot.lng.map(format_coordinate));
        set(
            &mut fields.battery,
            snapshot.battery.as_ref().map(|b| format!("{}%", b)),
        );
        set(&mut fields.bpm, snapshot.bpm.as_ref().map(Reading::to_string));
        set(&mut fields.signal, snapshot.signal.as_ref().map(Reading::to_string));
        set(
            &mut fields.last_sync,
            snapshot.last_sync.as_ref().map(Reading::to_string),
        );
        set(
            &mut fields.temperature,
            snapshot.temperature.as_ref().map(Reading::to_string),
        );
        set(
            &mut fields.humidity,
            snapshot.humidity.as_ref().map(Reading::to_string),
        );
        set(&mut fields.rain, snapshot.rain.as_ref().map(Reading::to_string));

        let mut push = |log: &mut BoundedEventLog, entry: &Option<Reading>| match entry {
            Some(entry) if entry.is_truthy() => {
                log.push(entry.to_string());
                summary.log_entries_added += 1;
                true
            }
            _ => false,
        };

        push(&mut self.obstacles, &snapshot.obstacle_log);
        let sos_raised = push(&mut self.sos, &snapshot.sos_log);
        push(&mut self.heart_rate, &snapshot.bpm_log);
        summary.sos_raised = sos_raised;

        self.messages_applied += 1;
        summary
    }

    pub fn record_dropped(&mut self) {
        self.messages_dropped += 1;
    }

    pub fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
    }

    pub fn fields(&self) -> &DisplayFields {
        &self.fields
    }

    pub fn obstacle_log(&self) -> &BoundedEventLog {
        &self.obstacles
    }

    pub fn sos_log(&self) -> &BoundedEventLog {
        &self.sos
    }

    pub fn heart_rate_log(&self) -> &BoundedEventLog {
        &self.heart_rate
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn messages_applied(&self) -> u64 {
        self.messages_applied
    }

    pub fn messages_dropped(&self) -> u64 {
        self.messages_dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<Reading> {
        Some(Reading::Text(s.to_string()))
    }

    fn num(n: i64) -> Option<Reading> {
        Some(Reading::Number(n.into()))
    }

    #[test]
    fn subset_only_touches_present_fields() {
        let mut state = ViewState::new();
        state.apply(&TelemetrySnapshot {
            lat: Some(60.0),
            lng: Some(24.0),
            battery: num(90),
            bpm: num(65),
            signal: text("Good"),
            ..Default::default()
        });

        let summary = state.apply(&TelemetrySnapshot {
            bpm: num(88),
            ..Default::default()
        });

        assert_eq!(summary.fields_updated, 1);
        let fields = state.fields();
        assert_eq!(fields.bpm.as_deref(), Some("88"));
        assert_eq!(fields.lat.as_deref(), Some("60.000000"));
        assert_eq!(fields.battery.as_deref(), Some("90%"));
        assert_eq!(fields.signal.as_deref(), Some("Good"));
        assert_eq!(fields.temperature, None);
    }

    #[test]
    fn logs_are_independent() {
        let mut state = ViewState::new();
        state.apply(&TelemetrySnapshot {
            obstacle_log: text("Wall at 1m"),
            ..Default::default()
        });
        state.apply(&TelemetrySnapshot {
            sos_log: text("Fall detected"),
            bpm_log: text("Spike 140"),
            ..Default::default()
        });

        assert_eq!(state.obstacle_log().entries().collect::<Vec<_>>(), vec!["Wall at 1m"]);
        assert_eq!(state.sos_log().entries().collect::<Vec<_>>(), vec!["Fall detected"]);
        assert_eq!(state.heart_rate_log().entries().collect::<Vec<_>>(), vec!["Spike 140"]);
    }

    #[test]
    fn falsy_log_entries_are_skipped() {
        let mut state = ViewState::new();
        let summary = state.apply(&TelemetrySnapshot {
            obstacle_log: text(""),
            sos_log: Some(Reading::Flag(false)),
            ..Default::default()
        });

        assert!(summary.is_empty());
        assert!(state.obstacle_log().is_empty());
        assert!(state.sos_log().is_empty());
        assert_eq!(state.messages_applied(), 1);
    }

    #[test]
    fn out_of_range_values_render_as_is() {
        let mut state = ViewState::new();
        state.apply(&TelemetrySnapshot {
            battery: num(250),
            bpm: num(-4),
            ..Default::default()
        });
        assert_eq!(state.fields().battery.as_deref(), Some("250%"));
        assert_eq!(state.fields().bpm.as_deref(), Some("-4"));
    }

    #[test]
    fn text_scalars_render_as_sent() {
        let mut state = ViewState::new();
        state.apply(&TelemetrySnapshot {
            battery: text("82"),
            temperature: text("n/a"),
            ..Default::default()
        });
        assert_eq!(state.fields().battery.as_deref(), Some("82%"));
        assert_eq!(state.fields().temperature.as_deref(), Some("n/a"));
    }
}
