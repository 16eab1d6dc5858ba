use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ParseError;
use crate::pipeline::parse::{Parser, RawActivity, SportHint, TimestampHint};
use crate::types::track::Point;

/// Reader for the JSON account export (`{"exercises": [...]}`).
pub struct JsonParser;

#[derive(Debug, Deserialize)]
struct Export {
    exercises: Option<Vec<Value>>,
}

// Every field below is read leniently: a value of the wrong type becomes
// `None` so one bad entry never rejects the rest of the export.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Exercise {
    #[serde(default, deserialize_with = "lenient")]
    sport: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    samples: Option<Samples>,
    #[serde(default, deserialize_with = "lenient")]
    recorded_route: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Samples {
    #[serde(default, deserialize_with = "lenient")]
    recorded_route: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteSample {
    #[serde(default, deserialize_with = "lenient")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    date_time: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl Parser for JsonParser {
    fn parse(&self, filename: &str, bytes: &[u8]) -> Result<Vec<RawActivity>, ParseError> {
        let export: Export = serde_json::from_slice(bytes)
            .map_err(|e| ParseError::DecodeError(format!("Invalid JSON: {}", e)))?;

        let exercises = export.exercises.ok_or_else(|| {
            ParseError::MalformedDocument("JSON export has no 'exercises' field".to_string())
        })?;

        let activities = exercises
            .into_iter()
            .filter_map(|value| serde_json::from_value::<Exercise>(value).ok())
            .filter_map(|exercise| {
                let route = exercise
                    .samples
                    .and_then(|s| s.recorded_route)
                    .or(exercise.recorded_route)?;

                let points = route
                    .into_iter()
                    .filter_map(|entry| serde_json::from_value::<RouteSample>(entry).ok())
                    .filter_map(|sample| read_sample(&sample))
                    .collect();

                Some(RawActivity {
                    name: filename.to_string(),
                    sport: SportHint::Declared(exercise.sport),
                    timestamp: TimestampHint::FirstPoint,
                    points,
                })
            })
            .collect();

        Ok(activities)
    }
}

fn read_sample(sample: &RouteSample) -> Option<Point> {
    let timestamp = sample.date_time.as_deref().and_then(parse_local_or_utc);
    Point::from_degrees(sample.latitude?, sample.longitude?, timestamp)
}

/// The export writes `dateTime` without an offset; those are read as UTC.
fn parse_local_or_utc(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = text.parse::<DateTime<Utc>>() {
        return Some(dt);
    }
    chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
