use std::sync::Arc;

use crate::pipeline::search::search;
use crate::types::playback::{
    AnimationMode, AnimationOptions, Frame, PlaybackEvent, PlaybackState, RunOutcome,
};
use crate::types::track::{Track, TrackId};

/// A track handed to the engine, in the order the session added it.
#[derive(Debug, Clone)]
pub struct TrackRef {
    pub id: TrackId,
    pub track: Arc<Track>,
}

#[derive(Debug)]
struct ActiveTrack {
    id: TrackId,
    track: Arc<Track>,
    /// `(millis, point index)` for every timestamped point, in file order.
    timeline: Vec<(i64, usize)>,
    /// Added to the step time to get this track's query time.
    offset_ms: i64,
    /// Timeline entries already appended to the partial line.
    cursor: usize,
    displayed: Option<usize>,
    finished: bool,
}

impl ActiveTrack {
    fn new(track_ref: &TrackRef) -> Option<Self> {
        let timeline: Vec<(i64, usize)> = track_ref
            .track
            .points
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| p.timestamp.map(|t| (t.timestamp_millis(), idx)))
            .collect();

        if timeline.is_empty() {
            return None;
        }

        Some(Self {
            id: track_ref.id.clone(),
            track: Arc::clone(&track_ref.track),
            timeline,
            offset_ms: 0,
            cursor: 0,
            displayed: None,
            finished: false,
        })
    }

    fn first_ms(&self) -> i64 {
        self.timeline.first().map(|(t, _)| *t).unwrap_or(0)
    }

    fn last_ms(&self) -> i64 {
        self.timeline.last().map(|(t, _)| *t).unwrap_or(0)
    }

    fn resolve(&mut self, query_ms: i64, events: &mut Vec<PlaybackEvent>) {
        if self.finished {
            return;
        }

        let len = self.timeline.len();
        let cursor = self.cursor.min(len);
        let found = search(&self.timeline[cursor..], &query_ms, |(t, _), q| {
            t.saturating_sub(*q)
        });

        let display = if found >= 0 {
            cursor + found as usize
        } else {
            let insertion = cursor + (!found) as usize;
            if insertion == 0 {
                return;
            }
            if insertion >= len {
                self.finish_track(events);
                return;
            }
            insertion - 1
        };

        if self.displayed == Some(display) {
            return;
        }

        let points = &self.track.points;
        for &(_, point_idx) in &self.timeline[cursor.min(display + 1)..=display] {
            events.push(PlaybackEvent::AppendLinePoint {
                track_id: self.id.clone(),
                point: points[point_idx],
            });
        }
        self.cursor = self.cursor.max(display + 1);
        self.displayed = Some(display);

        events.push(PlaybackEvent::SetMarkerPosition {
            track_id: self.id.clone(),
            point: points[self.timeline[display].1],
        });
    }

    fn finish_track(&mut self, events: &mut Vec<PlaybackEvent>) {
        if self.displayed.take().is_some() {
            events.push(PlaybackEvent::RemoveMarker {
                track_id: self.id.clone(),
            });
        }
        events.push(PlaybackEvent::RestoreFullLine {
            track_id: self.id.clone(),
        });
        self.cursor = self.timeline.len();
        self.finished = true;
    }

    fn restore(&mut self, events: &mut Vec<PlaybackEvent>) {
        if self.displayed.take().is_some() {
            events.push(PlaybackEvent::RemoveMarker {
                track_id: self.id.clone(),
            });
        }
        if !self.finished {
            events.push(PlaybackEvent::RestoreFullLine {
                track_id: self.id.clone(),
            });
        }
    }
}

/// Frame-driven replay of tracks over a virtual clock.
///
/// The engine never owns a timer. The host calls [`PlaybackEngine::tick`]
/// once per rendered frame with a monotonically increasing timestamp in
/// milliseconds and applies the returned draw events. One run is active at a
/// time: starting a new run stops and restores the current one first.
#[derive(Debug)]
pub struct PlaybackEngine {
    state: PlaybackState,
    mode: AnimationMode,
    playback_rate: f64,
    lower_bound_ms: i64,
    upper_bound_ms: i64,
    first_tick_ms: Option<f64>,
    last_virtual_ms: Option<i64>,
    stop_requested: bool,
    tracks: Vec<ActiveTrack>,
    last_outcome: Option<RunOutcome>,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            mode: AnimationMode::default(),
            playback_rate: 1.0,
            lower_bound_ms: 0,
            upper_bound_ms: 0,
            first_tick_ms: None,
            last_virtual_ms: None,
            stop_requested: false,
            tracks: Vec::new(),
            last_outcome: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    /// How the most recent run ended, once it has ended.
    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.last_outcome
    }

    /// Elapsed virtual time of the current run, from the latest distinct tick.
    pub fn virtual_time_ms(&self) -> Option<i64> {
        self.last_virtual_ms
    }

    /// `(lower, upper)` bounds of the current run's step time.
    pub fn bounds_ms(&self) -> (i64, i64) {
        (self.lower_bound_ms, self.upper_bound_ms)
    }

    /// Starts a run over `tracks`. Tracks without any timestamped point are
    /// left alone. When nothing is playable the engine stays idle.
    pub fn start(&mut self, tracks: &[TrackRef], options: AnimationOptions) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        if self.state == PlaybackState::Running {
            events.extend(self.finish(RunOutcome::Stopped));
        }

        let candidates: Vec<&TrackRef> = match options.mode {
            AnimationMode::Latest => tracks.last().into_iter().collect(),
            AnimationMode::Simultaneous | AnimationMode::Synchronized => tracks.iter().collect(),
        };

        let mut active: Vec<ActiveTrack> = candidates
            .into_iter()
            .filter_map(ActiveTrack::new)
            .collect();

        if active.is_empty() {
            tracing::debug!("No playable tracks, playback stays idle");
            return events;
        }

        let (lower, upper) = match options.mode {
            AnimationMode::Simultaneous | AnimationMode::Latest => {
                for track in active.iter_mut() {
                    track.offset_ms = track.first_ms();
                }
                let longest = active
                    .iter()
                    .map(|t| t.last_ms().saturating_sub(t.first_ms()))
                    .max()
                    .unwrap_or(0);
                (0, longest)
            }
            AnimationMode::Synchronized => {
                let lower = active.iter().map(|t| t.first_ms()).min().unwrap_or(0);
                let upper = active.iter().map(|t| t.last_ms()).max().unwrap_or(0);
                (lower, upper)
            }
        };

        for track in &active {
            events.push(PlaybackEvent::ClearLine {
                track_id: track.id.clone(),
            });
        }

        tracing::debug!(
            "Starting {:?} playback of {} track(s), bounds {}..{} ms, rate {}",
            options.mode,
            active.len(),
            lower,
            upper,
            options.playback_rate
        );

        self.state = PlaybackState::Running;
        self.mode = options.mode;
        self.playback_rate = sanitize_rate(options.playback_rate);
        self.lower_bound_ms = lower;
        self.upper_bound_ms = upper;
        self.first_tick_ms = None;
        self.last_virtual_ms = None;
        self.stop_requested = false;
        self.tracks = active;
        self.last_outcome = None;

        events
    }

    /// Requests cancellation. Cleanup happens on the next tick.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Running {
            self.stop_requested = true;
        }
    }

    /// Advances the virtual clock to the host timestamp `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Vec<PlaybackEvent> {
        if self.state != PlaybackState::Running {
            return Vec::new();
        }
        if self.stop_requested {
            return self.finish(RunOutcome::Stopped);
        }

        let first = *self.first_tick_ms.get_or_insert(now_ms);
        let elapsed = ((now_ms - first).max(0.0) * self.playback_rate).floor() as i64;

        if self.last_virtual_ms.is_some_and(|last| elapsed <= last) {
            return Vec::new();
        }
        self.last_virtual_ms = Some(elapsed);

        let step_ms = self.lower_bound_ms.saturating_add(elapsed);
        if step_ms > self.upper_bound_ms {
            return self.finish(RunOutcome::Completed);
        }

        let mut events = Vec::new();
        for track in self.tracks.iter_mut() {
            track.resolve(step_ms.saturating_add(track.offset_ms), &mut events);
        }
        events
    }

    /// Ends the run with `outcome`: every marker is removed, every line is
    /// restored to its full point sequence and the engine is idle again.
    fn finish(&mut self, outcome: RunOutcome) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        for track in self.tracks.iter_mut() {
            track.restore(&mut events);
        }
        events.push(match outcome {
            RunOutcome::Completed => PlaybackEvent::PlaybackCompleted,
            RunOutcome::Stopped => PlaybackEvent::PlaybackStopped,
        });

        tracing::debug!("Playback {:?} after {} track(s) restored", outcome, self.tracks.len());

        self.tracks.clear();
        self.stop_requested = false;
        self.first_tick_ms = None;
        self.last_outcome = Some(outcome);
        self.state = PlaybackState::Idle;
        events
    }
}

fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        1.0
    }
}

/// Source of frame timestamps. Stands in for the host's animation scheduler.
pub trait FrameScheduler {
    fn next_frame(&mut self) -> Option<f64>;
}

/// Evenly spaced frames with an upper limit on how many are produced.
#[derive(Debug, Clone)]
pub struct FixedIntervalScheduler {
    interval_ms: f64,
    next_ms: f64,
    remaining: usize,
}

impl FixedIntervalScheduler {
    pub fn new(interval_ms: f64, max_frames: usize) -> Self {
        Self {
            interval_ms: if interval_ms.is_finite() && interval_ms > 0.0 {
                interval_ms
            } else {
                16.0
            },
            next_ms: 0.0,
            remaining: max_frames,
        }
    }
}

impl FrameScheduler for FixedIntervalScheduler {
    fn next_frame(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let now = self.next_ms;
        self.next_ms += self.interval_ms;
        Some(now)
    }
}

/// Ticks `engine` from `scheduler` until the run ends. If the scheduler runs
/// dry first, the run is stopped and cleaned up on one extra tick.
pub fn drive(engine: &mut PlaybackEngine, scheduler: &mut dyn FrameScheduler) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut last_tick = 0.0;

    while engine.state() == PlaybackState::Running {
        let Some(now_ms) = scheduler.next_frame() else {
            engine.stop();
            let events = engine.tick(last_tick);
            frames.push(Frame {
                tick_ms: last_tick,
                virtual_ms: engine.virtual_time_ms(),
                events,
            });
            break;
        };
        last_tick = now_ms;

        let events = engine.tick(now_ms);
        if events.is_empty() {
            continue;
        }
        frames.push(Frame {
            tick_ms: now_ms,
            virtual_ms: engine.virtual_time_ms(),
            events,
        });
    }

    frames
}
