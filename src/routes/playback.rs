use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::pipeline::playback::{drive, FixedIntervalScheduler, PlaybackEngine, TrackRef};
use crate::state::AppState;
use crate::types::playback::{AnimationMode, AnimationOptions, Frame, RunOutcome};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/playback", post(playback))
}

#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct PlaybackRequest {
    /// Tracks to replay, in any order. Defaults to every stored track.
    track_ids: Option<Vec<String>>,
    #[serde(default)]
    mode: AnimationMode,
    #[serde(default = "default_playback_rate")]
    playback_rate: f64,
    frame_interval_ms: Option<f64>,
}

fn default_playback_rate() -> f64 {
    1.0
}

#[derive(Serialize)]
struct PlaybackResponse {
    /// `None` when there was nothing to play.
    outcome: Option<RunOutcome>,
    frames: Vec<Frame>,
}

async fn playback(
    State(state): State<AppState>,
    Json(request): Json<PlaybackRequest>,
) -> Result<Json<PlaybackResponse>, AppError> {
    if !request.playback_rate.is_finite() || request.playback_rate <= 0.0 {
        return Err(AppError::BadRequest(format!(
            "playback_rate must be positive, got {}",
            request.playback_rate
        )));
    }

    let config = state.config();
    let interval_ms = match request.frame_interval_ms {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            return Err(AppError::BadRequest(format!(
                "frame_interval_ms must be positive, got {}",
                v
            )))
        }
        None => config.frame_interval_ms,
    };

    let tracks = select_tracks(&state, request.track_ids.as_deref())?;

    let mut engine = PlaybackEngine::new();
    let start_events = engine.start(
        &tracks,
        AnimationOptions {
            mode: request.mode,
            playback_rate: request.playback_rate,
        },
    );

    let mut frames = Vec::new();
    if !start_events.is_empty() {
        frames.push(Frame {
            tick_ms: 0.0,
            virtual_ms: None,
            events: start_events,
        });
    }

    let mut scheduler = FixedIntervalScheduler::new(interval_ms, config.max_playback_frames);
    frames.extend(drive(&mut engine, &mut scheduler));

    let outcome = engine.last_outcome();
    tracing::info!(
        "Playback of {} track(s) in {:?} mode finished: {:?}, {} frames",
        tracks.len(),
        request.mode,
        outcome,
        frames.len()
    );

    Ok(Json(PlaybackResponse { outcome, frames }))
}

fn select_tracks(state: &AppState, ids: Option<&[String]>) -> Result<Vec<TrackRef>, AppError> {
    match ids {
        Some(ids) => state.track_refs_for(ids).map_err(AppError::NotFound),
        None => Ok(state.track_refs()),
    }
}
