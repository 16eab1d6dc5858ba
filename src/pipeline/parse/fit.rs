use chrono::{DateTime, Utc};
use fitparser::profile::MesgNum;
use fitparser::Value;

use crate::error::ParseError;
use crate::pipeline::parse::{Parser, RawActivity, SportHint, TimestampHint};
use crate::types::track::{Point, SportKind};

/// Zwift's FIT manufacturer id. Its files are virtual rides.
const ZWIFT_MANUFACTURER_ID: u16 = 260;
const ZWIFT_MANUFACTURER_NAME: &str = "zwift";

pub struct FitParser;

impl Parser for FitParser {
    fn parse(&self, filename: &str, bytes: &[u8]) -> Result<Vec<RawActivity>, ParseError> {
        let data = fitparser::from_bytes(bytes)
            .map_err(|e| ParseError::DecodeError(format!("Failed to parse FIT file: {}", e)))?;

        let mut points = Vec::new();
        let mut record_count = 0usize;
        let mut last_timestamp: Option<DateTime<Utc>> = None;
        let mut declared_sport: Option<String> = None;
        let mut manufacturer_is_zwift = false;

        for message in data {
            match message.kind() {
                MesgNum::Record => {
                    record_count += 1;

                    let mut lat = None;
                    let mut lng = None;
                    let mut time = None;

                    for field in message.fields() {
                        match (field.name(), field.value()) {
                            ("position_lat", Value::SInt32(val)) => {
                                lat = Some(semicircles_to_degrees(*val))
                            }
                            ("position_long", Value::SInt32(val)) => {
                                lng = Some(semicircles_to_degrees(*val))
                            }
                            ("timestamp", Value::Timestamp(val)) => {
                                time = Some(val.with_timezone(&Utc))
                            }
                            _ => {}
                        }
                    }

                    // Single forward pass: the last record seen wins, the
                    // file is trusted to be in chronological order.
                    if time.is_some() {
                        last_timestamp = time;
                    }

                    if let (Some(lat), Some(lng)) = (lat, lng) {
                        if let Some(point) = Point::from_degrees(lat, lng, time) {
                            points.push(point);
                        }
                    }
                }
                MesgNum::Sport | MesgNum::Session => {
                    if declared_sport.is_some() {
                        continue;
                    }
                    for field in message.fields() {
                        if field.name() == "sport" {
                            if let Value::String(sport) = field.value() {
                                declared_sport = Some(sport.clone());
                            }
                        }
                    }
                }
                MesgNum::FileId => {
                    for field in message.fields() {
                        if field.name() == "manufacturer" {
                            manufacturer_is_zwift = is_zwift(field.value());
                        }
                    }
                }
                _ => {}
            }
        }

        if record_count == 0 {
            return Err(ParseError::EmptyRecordSet);
        }

        let sport = match declared_sport {
            None if manufacturer_is_zwift => SportHint::Fixed(SportKind::Cycling),
            declared => SportHint::Declared(declared),
        };

        Ok(vec![RawActivity {
            name: filename.to_string(),
            sport,
            timestamp: TimestampHint::Explicit(last_timestamp),
            points,
        }])
    }
}

fn is_zwift(value: &Value) -> bool {
    match value {
        Value::String(name) => name.eq_ignore_ascii_case(ZWIFT_MANUFACTURER_NAME),
        Value::UInt16(id) => *id == ZWIFT_MANUFACTURER_ID,
        _ => false,
    }
}

fn semicircles_to_degrees(semicircles: i32) -> f64 {
    (semicircles as f64) * (180.0 / 2_147_483_648.0)
}
