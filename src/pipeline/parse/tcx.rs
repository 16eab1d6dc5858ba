use crate::error::ParseError;
use crate::pipeline::parse::gpx::parse_time;
use crate::pipeline::parse::xml::XmlElement;
use crate::pipeline::parse::{RawActivity, SportHint, TimestampHint};
use crate::types::track::Point;

pub fn read_tcx(root: &XmlElement, filename: &str) -> Result<Vec<RawActivity>, ParseError> {
    let activities = root.child("Activities").ok_or_else(|| {
        ParseError::MalformedDocument("TCX has no <Activities> element".to_string())
    })?;

    Ok(activities
        .children_named("Activity")
        .map(|activity| read_activity(activity, filename))
        .collect())
}

fn read_activity(activity: &XmlElement, filename: &str) -> RawActivity {
    let points = activity
        .children_named("Lap")
        .flat_map(|lap| lap.children_named("Track"))
        .flat_map(|track| track.children_named("Trackpoint"))
        .filter_map(read_trackpoint)
        .collect();

    RawActivity {
        name: activity
            .child_text("Notes")
            .unwrap_or(filename)
            .to_string(),
        sport: SportHint::Declared(declared_sport(activity)),
        timestamp: TimestampHint::FirstPoint,
        points,
    }
}

/// `Sport="Other"` is what most devices write for anything that is not a run
/// or a ride; the training plan name is usually more specific.
fn declared_sport(activity: &XmlElement) -> Option<String> {
    let sport = activity
        .attr("Sport")
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match sport {
        Some(sport) if sport.eq_ignore_ascii_case("other") => activity
            .path(&["Training", "Plan"])
            .and_then(|plan| plan.child_text("Name"))
            .map(str::to_string),
        Some(sport) => Some(sport.to_string()),
        None => None,
    }
}

fn read_trackpoint(tp: &XmlElement) -> Option<Point> {
    let position = tp.child("Position")?;
    let lat = position.child_text("LatitudeDegrees")?.parse().ok()?;
    let lng = position.child_text("LongitudeDegrees")?.parse().ok()?;
    Point::from_degrees(lat, lng, tp.child_text("Time").and_then(parse_time))
}
