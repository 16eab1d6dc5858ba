use serde::{Deserialize, Serialize};

use crate::types::track::{Point, TrackId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationMode {
    /// Every track starts at virtual time zero.
    #[default]
    Simultaneous,
    /// Tracks share one absolute timeline.
    Synchronized,
    /// Only the most recently added track is replayed.
    Latest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationOptions {
    pub mode: AnimationMode,
    /// Virtual milliseconds per real millisecond.
    pub playback_rate: f64,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            mode: AnimationMode::Simultaneous,
            playback_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Completed,
    Stopped,
}

/// Draw commands for the map surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    ClearLine { track_id: TrackId },
    AppendLinePoint { track_id: TrackId, point: Point },
    SetMarkerPosition { track_id: TrackId, point: Point },
    RemoveMarker { track_id: TrackId },
    RestoreFullLine { track_id: TrackId },
    PlaybackCompleted,
    PlaybackStopped,
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub tick_ms: f64,
    pub virtual_ms: Option<i64>,
    pub events: Vec<PlaybackEvent>,
}
