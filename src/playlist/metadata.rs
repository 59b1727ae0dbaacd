use crate::models::Track;
use std::collections::HashSet;

/// A track that passed the tempo filter, paired with the tempo that qualified it
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMatch {
    pub track: Track,
    pub tempo: f64,
}

/// Lowest and highest tempo among accepted tracks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoRange {
    pub min: f64,
    pub max: f64,
}

impl TempoRange {
    pub fn from_tempo(tempo: f64) -> Self {
        Self {
            min: tempo,
            max: tempo,
        }
    }

    /// Widen the range to cover `tempo`
    pub fn include(&mut self, tempo: f64) {
        self.min = self.min.min(tempo);
        self.max = self.max.max(tempo);
    }

    /// Playlist description, e.g. "118.00-121.00"
    pub fn description(&self) -> String {
        format!("{:.2}-{:.2}", self.min, self.max)
    }
}

/// Insertion-ordered tracks with unique ids. Only ever grows.
#[derive(Debug, Default)]
pub struct AccumulatedSet {
    entries: Vec<TempoMatch>,
    ids: HashSet<String>,
    range: Option<TempoRange>,
}

#[allow(dead_code)]
impl AccumulatedSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.ids.contains(track_id)
    }

    /// Append a match; returns false and leaves the set untouched if its id is already present
    pub fn push(&mut self, entry: TempoMatch) -> bool {
        if !self.ids.insert(entry.track.id.clone()) {
            return false;
        }
        match self.range.as_mut() {
            Some(range) => range.include(entry.tempo),
            None => self.range = Some(TempoRange::from_tempo(entry.tempo)),
        }
        self.entries.push(entry);
        true
    }

    /// `None` until the first track is accepted
    pub fn tempo_range(&self) -> Option<TempoRange> {
        self.range
    }

    pub fn entries(&self) -> &[TempoMatch] {
        &self.entries
    }

    pub fn tempos(&self) -> Vec<f64> {
        self.entries.iter().map(|entry| entry.tempo).collect()
    }

    pub fn into_entries(self) -> Vec<TempoMatch> {
        self.entries
    }
}

/// Tracks ready to be written as a playlist
#[derive(Debug, Clone)]
pub struct GeneratedPlaylist {
    pub tracks: Vec<TempoMatch>,
    pub tempo_range: TempoRange,
    pub iterations: usize,
}

impl GeneratedPlaylist {
    pub fn description(&self) -> String {
        self.tempo_range.description()
    }

    pub fn track_ids(&self) -> Vec<String> {
        self.tracks.iter().map(|entry| entry.track.id.clone()).collect()
    }
}
