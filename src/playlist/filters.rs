use super::{TargetCriteria, TempoMatch};
use crate::models::{TempoFeature, Track};

/// Tempo filtering using static helper functions
pub struct TempoFilter;

impl TempoFilter {
    /// Pair each track with the tempo at the same position in `features`.
    ///
    /// The feature list comes back in request order, so pairing is positional.
    /// A feature for a different id than its track is treated as missing, as is
    /// any track past the end of a short feature list.
    pub fn pair_features(
        tracks: Vec<Track>,
        features: Vec<Option<TempoFeature>>,
    ) -> Vec<(Track, Option<f64>)> {
        if tracks.len() != features.len() {
            log::warn!(
                "Received {} tempo features for {} tracks",
                features.len(),
                tracks.len()
            );
        }

        let mut features = features.into_iter();
        tracks
            .into_iter()
            .map(|track| {
                let tempo = match features.next().flatten() {
                    Some(feature) if feature.track_id == track.id => Some(feature.tempo),
                    Some(feature) => {
                        log::warn!(
                            "Tempo feature for '{}' arrived in the slot of '{}', ignoring it",
                            feature.track_id,
                            track.id
                        );
                        None
                    }
                    None => None,
                };
                (track, tempo)
            })
            .collect()
    }

    /// Check if a (possibly unknown) tempo falls within the target window
    pub fn matches_tempo(tempo: Option<f64>, criteria: &TargetCriteria) -> bool {
        tempo.is_some_and(|t| criteria.matches(t))
    }

    /// Keep the tracks whose tempo is within tolerance, in input order
    pub fn filter(
        tracks: Vec<Track>,
        features: Vec<Option<TempoFeature>>,
        criteria: &TargetCriteria,
    ) -> Vec<TempoMatch> {
        Self::pair_features(tracks, features)
            .into_iter()
            .filter_map(|(track, tempo)| {
                if Self::matches_tempo(tempo, criteria) {
                    tempo.map(|tempo| TempoMatch { track, tempo })
                } else {
                    None
                }
            })
            .collect()
    }
}
