use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::track::{Point, SportKind, Track, TrackId};

/// Row of the track list: what the session shows without loading points.
#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    pub id: TrackId,
    pub name: String,
    pub sport: SportKind,
    pub timestamp: Option<DateTime<Utc>>,
    pub point_count: usize,
    pub distance_km: f64,
    pub duration_seconds: Option<u64>,
}

impl TrackSummary {
    pub fn new(id: TrackId, track: &Track) -> Self {
        Self {
            id,
            name: track.name.clone(),
            sport: track.sport,
            timestamp: track.timestamp,
            point_count: track.points.len(),
            distance_km: total_distance_km(&track.points),
            duration_seconds: duration_seconds(&track.points),
        }
    }
}

/// Sum of great-circle distances between consecutive points.
pub fn total_distance_km(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(pair[0].lat, pair[0].lng, pair[1].lat, pair[1].lng))
        .sum()
}

/// Time between the first and last timestamped points.
pub fn duration_seconds(points: &[Point]) -> Option<u64> {
    let first = points.iter().find_map(|p| p.timestamp)?;
    let last = points.iter().rev().find_map(|p| p.timestamp)?;
    Some((last - first).num_seconds().max(0) as u64)
}

fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    R * c
}
