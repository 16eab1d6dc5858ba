use crate::config::Config;
use crate::pipeline::playback::TrackRef;
use crate::types::track::{Track, TrackId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    tracks: Arc<DashMap<TrackId, StoredTrack>>,
    next_seq: Arc<AtomicU64>,
}

struct StoredTrack {
    track: Arc<Track>,
    seq: u64,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            tracks: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn insert(&self, track: Track) -> TrackRef {
        let id = Uuid::new_v4().to_string();
        let track = Arc::new(track);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.tracks.insert(
            id.clone(),
            StoredTrack {
                track: Arc::clone(&track),
                seq,
                inserted_at: Instant::now(),
            },
        );
        TrackRef { id, track }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Track>> {
        self.tracks.get(id).map(|entry| Arc::clone(&entry.track))
    }

    /// All stored tracks, oldest insertion first.
    pub fn track_refs(&self) -> Vec<TrackRef> {
        let mut entries: Vec<(u64, TrackRef)> = self
            .tracks
            .iter()
            .map(|entry| {
                (
                    entry.seq,
                    TrackRef {
                        id: entry.key().clone(),
                        track: Arc::clone(&entry.track),
                    },
                )
            })
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, track_ref)| track_ref).collect()
    }

    /// The requested tracks, oldest insertion first regardless of the order
    /// the ids were given in. Fails with the first id that is not stored.
    pub fn track_refs_for(&self, ids: &[TrackId]) -> Result<Vec<TrackRef>, TrackId> {
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let entry = self.tracks.get(id).ok_or_else(|| id.clone())?;
            entries.push((
                entry.seq,
                TrackRef {
                    id: id.clone(),
                    track: Arc::clone(&entry.track),
                },
            ));
        }
        entries.sort_by_key(|(seq, _)| *seq);
        entries.dedup_by_key(|(seq, _)| *seq);
        Ok(entries.into_iter().map(|(_, track_ref)| track_ref).collect())
    }

    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.tracks.retain(|_, stored| {
            now.duration_since(stored.inserted_at) < ttl
        });
        tracing::info!("Track eviction complete. Current size: {}", self.tracks.len());
    }
}
