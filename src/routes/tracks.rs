use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::pipeline::filter::{compare_newest_first, TrackFilter};
use crate::pipeline::process::TrackSummary;
use crate::state::AppState;
use crate::types::track::{SportKind, Track};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tracks", get(list_tracks))
        .route("/api/tracks/:id", get(get_track))
}

#[derive(Debug, Deserialize, Default)]
struct ListQuery {
    from: Option<String>,
    to: Option<String>,
    /// Comma separated sport names.
    sport: Option<String>,
}

async fn list_tracks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TrackSummary>>, AppError> {
    let filter = build_filter(&query)?;

    let mut refs: Vec<_> = state
        .track_refs()
        .into_iter()
        .filter(|r| filter.matches(&r.track))
        .collect();
    refs.sort_by(|a, b| compare_newest_first(&a.track, &b.track));

    Ok(Json(
        refs.into_iter()
            .map(|r| TrackSummary::new(r.id, &r.track))
            .collect(),
    ))
}

async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Track>, AppError> {
    let track = state.get(&id).ok_or_else(|| AppError::NotFound(id.clone()))?;
    Ok(Json(Track::clone(&track)))
}

fn build_filter(query: &ListQuery) -> Result<TrackFilter, AppError> {
    let from = query
        .from
        .as_deref()
        .map(|s| parse_bound(s, false))
        .transpose()?;
    let to = query
        .to
        .as_deref()
        .map(|s| parse_bound(s, true))
        .transpose()?;

    let sports = match query.sport.as_deref() {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<SportKind>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(TrackFilter { from, to, sports })
}

/// Accepts RFC 3339 timestamps or plain dates. A plain date used as the
/// upper bound covers that whole day.
fn parse_bound(s: &str, end_of_day: bool) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = s.parse::<DateTime<Utc>>() {
        return Ok(dt);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {}", s)))?;
    let time = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", s)))
}
