use anyhow::Result;
use rand::Rng;
use rand::seq::SliceRandom;

use super::{CandidateSource, GeneratorSettings, SeedSource};
use crate::models::Track;

/// Seed selection for the recommendation engine
pub struct SeedSelection;

impl SeedSelection {
    /// Pick up to `settings.seed_count` seed tracks.
    ///
    /// Top tracks contribute their leading entries; liked songs are sampled
    /// at random without replacement. An empty result is returned as-is.
    pub fn select<S: CandidateSource + ?Sized, R: Rng + ?Sized>(
        source: &S,
        seed_source: &SeedSource,
        settings: &GeneratorSettings,
        rng: &mut R,
    ) -> Result<Vec<Track>> {
        match seed_source {
            SeedSource::TopTracks { time_range } => {
                let mut top_tracks =
                    source.fetch_top_tracks(settings.top_tracks_limit, *time_range)?;
                log::debug!(
                    "Fetched {} top tracks ({})",
                    top_tracks.len(),
                    time_range.as_str()
                );
                top_tracks.truncate(settings.seed_count);
                Ok(top_tracks)
            }
            SeedSource::LikedSongs { limit } => {
                let liked = source.fetch_liked_tracks(*limit)?;
                log::debug!("Fetched {} liked tracks", liked.len());
                Ok(Self::sample(liked, settings.seed_count, rng))
            }
        }
    }

    /// `min(count, tracks.len())` distinct tracks chosen uniformly at random
    pub fn sample<R: Rng + ?Sized>(tracks: Vec<Track>, count: usize, rng: &mut R) -> Vec<Track> {
        if tracks.len() <= count {
            return tracks;
        }
        tracks.choose_multiple(rng, count).cloned().collect()
    }

    pub fn seed_ids(seeds: &[Track]) -> Vec<String> {
        seeds.iter().map(|track| track.id.clone()).collect()
    }
}
