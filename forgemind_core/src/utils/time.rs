//! Display-time helpers.

use chrono::{DateTime, Utc};

/// Coarse human-readable age of a timestamp, for listing rows.
///
/// Resolution drops as the age grows: seconds collapse to "just now", then
/// whole minutes, hours, and days. Timestamps in the future (clock skew)
/// read as "just now".
pub fn coarse_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0);

    match seconds {
        0..=59 => "just now".to_string(),
        60..=3_599 => format!("{}m ago", seconds / 60),
        3_600..=86_399 => format!("{}h ago", seconds / 3_600),
        _ => format!("{}d ago", seconds / 86_400),
    }
}
