use chrono::{DateTime, Utc};

use crate::error::ParseError;
use crate::pipeline::parse::xml::XmlElement;
use crate::pipeline::parse::{RawActivity, SportHint, TimestampHint};
use crate::types::track::{Point, SportKind};

const UNTITLED: &str = "untitled";

pub fn read_gpx(root: &XmlElement) -> Result<Vec<RawActivity>, ParseError> {
    let tracks: Vec<&XmlElement> = root.children_named("trk").collect();
    let routes: Vec<&XmlElement> = root.children_named("rte").collect();

    if tracks.is_empty() && routes.is_empty() {
        return Err(ParseError::MalformedDocument(
            "GPX contains neither <trk> nor <rte>".to_string(),
        ));
    }

    let mut activities = Vec::with_capacity(tracks.len() + routes.len());

    for trk in tracks {
        let points = trk
            .children_named("trkseg")
            .flat_map(|seg| seg.children_named("trkpt"))
            .filter_map(|pt| read_point(pt, pt.child_text("time").and_then(parse_time)))
            .collect();

        activities.push(RawActivity {
            name: element_name(trk),
            sport: SportHint::Declared(declared_type(trk)),
            timestamp: TimestampHint::FirstPoint,
            points,
        });
    }

    for rte in routes {
        let rtepts: Vec<&XmlElement> = rte.children_named("rtept").collect();
        let timestamp = rtepts
            .iter()
            .find_map(|pt| pt.child_text("time").and_then(parse_time));
        let points = rtepts.iter().filter_map(|pt| read_point(pt, None)).collect();

        activities.push(RawActivity {
            name: element_name(rte),
            sport: SportHint::Fixed(SportKind::Other),
            timestamp: TimestampHint::Explicit(timestamp),
            points,
        });
    }

    Ok(activities)
}

/// Some exporters write numeric activity codes in `<type>`; those say
/// nothing we can map, so the filename decides instead.
fn declared_type(trk: &XmlElement) -> Option<String> {
    trk.child_text("type")
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

fn read_point(el: &XmlElement, timestamp: Option<DateTime<Utc>>) -> Option<Point> {
    let lat = el.attr("lat")?.trim().parse().ok()?;
    let lng = el.attr("lon")?.trim().parse().ok()?;
    Point::from_degrees(lat, lng, timestamp)
}

fn element_name(el: &XmlElement) -> String {
    el.child_text("name").unwrap_or(UNTITLED).to_string()
}

pub(crate) fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    text.parse::<DateTime<Utc>>().ok()
}
