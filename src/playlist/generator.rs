use anyhow::Result;
use std::collections::HashSet;

use super::filters::TempoFilter;
use super::{
    AccumulatedSet, CandidateSource, GeneratedPlaylist, GeneratorSettings, TargetCriteria,
    TempoMatch,
};

/// Status after each loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub iteration: usize,
    pub batch_size: usize, // raw recommendations received this iteration
    pub matched: usize,    // of those, within tempo tolerance
    pub added: usize,      // of those, new to the playlist
    pub collected: usize,
    pub required: usize,
}

/// How a generation run ended
#[derive(Debug)]
pub enum GenerationOutcome {
    Ready(GeneratedPlaylist),
    /// Some tracks matched but fewer than the minimum
    InsufficientResults { collected: usize, required: usize },
    /// Nothing ever matched, so there is no tempo range to describe
    NoMatchingTracks,
}

/// State left by the accumulation loop
#[derive(Debug)]
pub struct Accumulation {
    pub tracks: AccumulatedSet,
    pub iterations: usize,
    pub exhausted: bool, // stopped because a batch came back short
}

impl Accumulation {
    pub fn into_outcome(self, required: usize) -> GenerationOutcome {
        let Some(tempo_range) = self.tracks.tempo_range() else {
            return GenerationOutcome::NoMatchingTracks;
        };
        if self.tracks.len() < required {
            return GenerationOutcome::InsufficientResults {
                collected: self.tracks.len(),
                required,
            };
        }
        GenerationOutcome::Ready(GeneratedPlaylist {
            tracks: self.tracks.into_entries(),
            tempo_range,
            iterations: self.iterations,
        })
    }
}

/// Drop candidates already collected and, when `exclude_owned` is set, those in `owned_ids`.
///
/// Duplicates inside `candidates` keep only their first occurrence.
pub fn dedup_candidates(
    candidates: Vec<TempoMatch>,
    accumulated: &AccumulatedSet,
    exclude_owned: bool,
    owned_ids: &HashSet<String>,
) -> Vec<TempoMatch> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| {
            let id = candidate.track.id.as_str();
            !accumulated.contains(id)
                && !(exclude_owned && owned_ids.contains(id))
                && seen.insert(id.to_string())
        })
        .collect()
}

/// Grows a tempo-matched track list from repeated recommendation batches
pub struct PlaylistGenerator {
    settings: GeneratorSettings,
}

impl PlaylistGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    /// Fetch, filter and deduplicate batches until `criteria.minimum_count`
    /// tracks are collected or a batch comes back smaller than requested.
    ///
    /// Seeds stay the same for every request. The short-batch check uses the
    /// raw batch size, before any filtering.
    pub fn accumulate<S, F>(
        &self,
        source: &S,
        seed_ids: &[String],
        criteria: &TargetCriteria,
        exclude_owned: bool,
        owned_ids: &HashSet<String>,
        mut on_progress: F,
    ) -> Result<Accumulation>
    where
        S: CandidateSource + ?Sized,
        F: FnMut(&Progress),
    {
        let batch_limit = self.settings.batch_size;
        let mut tracks = AccumulatedSet::default();
        let mut iterations = 0;
        let mut exhausted = false;

        while tracks.len() < criteria.minimum_count {
            iterations += 1;

            let batch = source.fetch_recommendations(seed_ids, batch_limit)?;
            let batch_size = batch.len();

            let matched = if batch.is_empty() {
                Vec::new()
            } else {
                let ids: Vec<String> = batch.iter().map(|track| track.id.clone()).collect();
                let features = source.fetch_tempo_features(&ids)?;
                TempoFilter::filter(batch, features, criteria)
            };
            let matched_count = matched.len();

            let fresh = dedup_candidates(matched, &tracks, exclude_owned, owned_ids);
            let added = fresh.len();
            for entry in fresh {
                tracks.push(entry);
            }

            log::debug!(
                "Iteration {iterations}: {batch_size} recommended, {matched_count} in tempo, {added} new"
            );
            on_progress(&Progress {
                iteration: iterations,
                batch_size,
                matched: matched_count,
                added,
                collected: tracks.len(),
                required: criteria.minimum_count,
            });

            if batch_size < batch_limit {
                log::info!(
                    "Recommendations exhausted after {iterations} iterations ({batch_size} < {batch_limit})"
                );
                exhausted = true;
                break;
            }
        }

        Ok(Accumulation {
            tracks,
            iterations,
            exhausted,
        })
    }

    /// Run the loop and classify the result
    pub fn generate<S, F>(
        &self,
        source: &S,
        seed_ids: &[String],
        criteria: &TargetCriteria,
        exclude_owned: bool,
        owned_ids: &HashSet<String>,
        on_progress: F,
    ) -> Result<GenerationOutcome>
    where
        S: CandidateSource + ?Sized,
        F: FnMut(&Progress),
    {
        let accumulation =
            self.accumulate(source, seed_ids, criteria, exclude_owned, owned_ids, on_progress)?;
        log::info!(
            "Collected {} tracks in {} iterations{}",
            accumulation.tracks.len(),
            accumulation.iterations,
            if accumulation.exhausted { " (recommendations exhausted)" } else { "" }
        );
        Ok(accumulation.into_outcome(criteria.minimum_count))
    }
}
