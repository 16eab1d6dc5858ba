use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::types::track::{SportKind, Track};

/// Date range and sport selection for the track list. Tracks without a
/// timestamp are never excluded by the date range.
#[derive(Debug, Clone, Default)]
pub struct TrackFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub sports: Vec<SportKind>,
}

impl TrackFilter {
    pub fn matches(&self, track: &Track) -> bool {
        if !self.sports.is_empty() && !self.sports.contains(&track.sport) {
            return false;
        }

        let Some(timestamp) = track.timestamp else {
            return true;
        };
        if self.from.is_some_and(|from| timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| timestamp > to) {
            return false;
        }
        true
    }
}

/// Newest first; undated tracks go last, keeping their relative order.
pub fn compare_newest_first(a: &Track, b: &Track) -> Ordering {
    match (a.timestamp, b.timestamp) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
