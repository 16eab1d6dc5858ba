mod fit;
mod gpx;
mod json;
mod normalize;
mod tcx;
mod xml;

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::error::ParseError;
use crate::types::track::{Point, SourceFormat, SportKind, Track};

pub use normalize::normalize;

/// How the sport of a raw activity should be decided.
#[derive(Debug, Clone, PartialEq)]
pub enum SportHint {
    /// Sport string found in the file, if any. Resolved by the classifier.
    Declared(Option<String>),
    Fixed(SportKind),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimestampHint {
    FirstPoint,
    Explicit(Option<DateTime<Utc>>),
}

/// One activity as read from a source file, before normalization.
#[derive(Debug, Clone)]
pub struct RawActivity {
    pub name: String,
    pub sport: SportHint,
    pub timestamp: TimestampHint,
    pub points: Vec<Point>,
}

pub trait Parser {
    fn parse(&self, filename: &str, bytes: &[u8]) -> Result<Vec<RawActivity>, ParseError>;
}

/// Parses one file into normalized tracks. The filename only selects the
/// parser and feeds the sport heuristics; no I/O happens here.
pub fn extract_tracks(filename: &str, bytes: &[u8]) -> Result<Vec<Track>, ParseError> {
    let format = SourceFormat::from_filename(filename)
        .ok_or_else(|| ParseError::UnsupportedFormat(filename.to_string()))?;

    let raw = match format {
        SourceFormat::Gpx | SourceFormat::Tcx => xml::XmlParser.parse(filename, bytes)?,
        SourceFormat::Fit => fit::FitParser.parse(filename, bytes)?,
        SourceFormat::Json => json::JsonParser.parse(filename, bytes)?,
    };

    let tracks = normalize(raw, filename);
    tracing::debug!(
        "Extracted {} track(s) from {} file {}",
        tracks.len(),
        format.as_str(),
        filename
    );
    Ok(tracks)
}

#[derive(Debug)]
pub struct FileOutcome {
    pub filename: String,
    pub result: Result<Vec<Track>, ParseError>,
}

/// Parses independent files in parallel. Results keep the input order and a
/// failing file never affects the others.
pub fn extract_batch(files: &[(String, Vec<u8>)]) -> Vec<FileOutcome> {
    files
        .par_iter()
        .map(|(filename, bytes)| FileOutcome {
            filename: filename.clone(),
            result: extract_tracks(filename, bytes),
        })
        .collect()
}
