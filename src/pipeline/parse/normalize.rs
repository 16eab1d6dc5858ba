use crate::pipeline::classify::classify;
use crate::pipeline::parse::{RawActivity, SportHint, TimestampHint};
use crate::types::track::Track;

/// Collapses raw activities into tracks. Activities without points are
/// dropped, so every returned track has at least one point.
pub fn normalize(raw: Vec<RawActivity>, filename: &str) -> Vec<Track> {
    raw.into_iter()
        .filter_map(|activity| {
            if activity.points.is_empty() {
                tracing::debug!("Dropping empty activity '{}' from {}", activity.name, filename);
                return None;
            }

            let sport = match &activity.sport {
                SportHint::Declared(declared) => classify(declared.as_deref(), filename),
                SportHint::Fixed(sport) => *sport,
            };

            let timestamp = match activity.timestamp {
                TimestampHint::Explicit(timestamp) => timestamp,
                TimestampHint::FirstPoint => activity.points.iter().find_map(|p| p.timestamp),
            };

            Some(Track {
                name: activity.name,
                sport,
                timestamp,
                points: activity.points,
            })
        })
        .collect()
}
