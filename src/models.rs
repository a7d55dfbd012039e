use serde::Deserialize;
use serde_json::Number;
use std::fmt;
use time::OffsetDateTime;

/// A display scalar as sent by the hub: free text, a number or a flag
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Flag(bool),
    Number(Number),
    Text(String),
}

impl Reading {
    /// Whether this reading carries an event worth logging
    ///
    /// Empty text, zero and `false` mean "nothing happened this tick".
    pub fn is_truthy(&self) -> bool {
        match self {
            Reading::Flag(flag) => *flag,
            Reading::Number(n) => n.as_f64().map_or(true, |v| v != 0.0),
            Reading::Text(text) => !text.is_empty(),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Flag(flag) => write!(f, "{}", flag),
            Reading::Number(n) => write!(f, "{}", n),
            Reading::Text(text) => f.write_str(text),
        }
    }
}

/// One decoded telemetry message
///
/// Every field is optional; an absent (or `null`) field means "no update this
/// tick". Unknown keys are ignored. Only the coordinates must be numbers;
/// every other scalar is displayed as sent, whatever its JSON type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub battery: Option<Reading>,
    pub bpm: Option<Reading>,
    pub signal: Option<Reading>,
    pub last_sync: Option<Reading>,
    #[serde(rename = "temp")]
    pub temperature: Option<Reading>,
    pub humidity: Option<Reading>,
    pub rain: Option<Reading>,
    pub obstacle_log: Option<Reading>,
    pub sos_log: Option<Reading>,
    pub bpm_log: Option<Reading>,
}

/// Live state of the telemetry channel as shown in the panel header
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connecting,
    Connected { since: OffsetDateTime },
    Reconnecting { attempt: u32 },
    Disconnected { reason: String },
}
