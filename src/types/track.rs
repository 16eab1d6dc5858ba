use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type TrackId = String;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Point {
    /// Builds a point from decimal degrees, rejecting NaN, infinities and
    /// coordinates outside the valid latitude/longitude ranges.
    pub fn from_degrees(lat: f64, lng: f64, timestamp: Option<DateTime<Utc>>) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if lat.abs() > 90.0 || lng.abs() > 180.0 {
            return None;
        }
        Some(Self { lat, lng, timestamp })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportKind {
    Cycling,
    Running,
    Walking,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sport: {0}")]
pub struct UnknownSport(pub String);

impl FromStr for SportKind {
    type Err = UnknownSport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cycling" => Ok(SportKind::Cycling),
            "running" => Ok(SportKind::Running),
            "walking" => Ok(SportKind::Walking),
            "other" => Ok(SportKind::Other),
            _ => Err(UnknownSport(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub sport: SportKind,
    pub timestamp: Option<DateTime<Utc>>,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Gpx,
    Tcx,
    Fit,
    Json,
}

impl SourceFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_lowercase().as_str() {
            "gpx" => Some(SourceFormat::Gpx),
            "tcx" => Some(SourceFormat::Tcx),
            "fit" => Some(SourceFormat::Fit),
            "json" => Some(SourceFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Gpx => "gpx",
            SourceFormat::Tcx => "tcx",
            SourceFormat::Fit => "fit",
            SourceFormat::Json => "json",
        }
    }
}
