/// Formatting helpers shared by the view and the logs
use time::{format_description, OffsetDateTime};

/// Digits after the decimal point for latitude/longitude
pub const COORDINATE_PRECISION: usize = 6;

/// Format a timestamp for human-readable display
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format.
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    match format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]") {
        Ok(format) => dt.format(&format).unwrap_or_else(|_| dt.to_string()),
        Err(_) => dt.to_string(),
    }
}

/// Format a coordinate in decimal degrees with a fixed six-digit fraction
///
/// The input precision does not matter: `12.3` renders as `12.300000`.
pub fn format_coordinate(degrees: f64) -> String {
    format!("{:.*}", COORDINATE_PRECISION, degrees)
}
