// End-to-end runs of the accumulation loop against mocked Spotify collaborators

use crate::models::{TempoFeature, Track};
use crate::playlist::{
    GenerationOutcome, GeneratorSettings, MockCandidateSource, PlaylistGenerator, Progress,
    TargetCriteria,
};
use std::collections::{HashMap, HashSet};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn batch(prefix: &str, count: usize) -> Vec<Track> {
        (0..count)
            .map(|i| Track::new(&format!("{prefix}{i}"), &format!("Song {prefix}{i}"), &["Test Artist"]))
            .collect()
    }

    /// Source whose recommendation calls return `batches` in order (then empty batches),
    /// with tempos looked up by id in `tempos`
    fn scripted_source(batches: Vec<Vec<Track>>, tempos: HashMap<String, f64>) -> MockCandidateSource {
        let mut source = MockCandidateSource::new();
        let mut remaining = batches.into_iter();
        source
            .expect_fetch_recommendations()
            .returning(move |_, _| Ok(remaining.next().unwrap_or_default()));
        source.expect_fetch_tempo_features().returning(move |ids| {
            Ok(ids
                .iter()
                .map(|id| {
                    tempos.get(id).map(|tempo| TempoFeature {
                        track_id: id.clone(),
                        tempo: *tempo,
                    })
                })
                .collect())
        });
        source
    }

    fn tempos(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(id, t)| (id.to_string(), *t)).collect()
    }

    fn seeds() -> Vec<String> {
        vec!["s1".to_string()]
    }

    fn generator() -> PlaylistGenerator {
        PlaylistGenerator::new(GeneratorSettings::default())
    }

    fn no_progress(_: &Progress) {}

    #[test]
    fn test_scenario_minimum_reached_in_first_batch() {
        let source = scripted_source(
            vec![batch("a", 100)],
            tempos(&[("a0", 118.0), ("a1", 119.0), ("a2", 121.0), ("a3", 125.0), ("a4", 130.0)]),
        );
        let criteria = TargetCriteria::new(120.0, 2.0, 3).unwrap();

        let accumulation = generator()
            .accumulate(&source, &seeds(), &criteria, false, &HashSet::new(), no_progress)
            .unwrap();
        assert_eq!(accumulation.iterations, 1);
        assert!(!accumulation.exhausted);
        assert_eq!(accumulation.tracks.tempos(), vec![118.0, 119.0, 121.0]);

        match accumulation.into_outcome(criteria.minimum_count) {
            GenerationOutcome::Ready(playlist) => {
                assert_eq!(playlist.track_ids(), vec!["a0", "a1", "a2"]);
                assert_eq!(playlist.description(), "118.00-121.00");
                assert_relative_eq!(playlist.tempo_range.min, 118.0);
                assert_relative_eq!(playlist.tempo_range.max, 121.0);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_scenario_short_second_batch_is_insufficient() {
        let mut second = batch("b", 39);
        second.push(Track::new("a0", "Song a0", &["Test Artist"])); // repeat from batch one
        let source = scripted_source(
            vec![batch("a", 100), second],
            tempos(&[("a0", 118.0), ("a1", 119.0), ("a2", 121.0), ("b5", 120.0), ("b9", 122.0)]),
        );
        let criteria = TargetCriteria::new(120.0, 2.0, 10).unwrap();

        let mut reports = Vec::new();
        let outcome = generator()
            .generate(&source, &seeds(), &criteria, false, &HashSet::new(), |p| {
                reports.push(*p)
            })
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].batch_size, 40);
        assert_eq!(reports[1].matched, 3);
        assert_eq!(reports[1].added, 2);
        match outcome {
            GenerationOutcome::InsufficientResults {
                collected,
                required,
            } => {
                assert_eq!(collected, 5);
                assert_eq!(required, 10);
            }
            other => panic!("expected InsufficientResults, got {other:?}"),
        }
    }

    #[test]
    fn test_scenario_no_features_means_no_matching_tracks() {
        let source = scripted_source(vec![batch("a", 100), batch("b", 100), batch("c", 12)], HashMap::new());
        let criteria = TargetCriteria::new(120.0, 10.0, 5).unwrap();

        let accumulation = generator()
            .accumulate(&source, &seeds(), &criteria, false, &HashSet::new(), no_progress)
            .unwrap();
        assert_eq!(accumulation.iterations, 3);
        assert!(accumulation.exhausted);
        assert!(matches!(
            accumulation.into_outcome(criteria.minimum_count),
            GenerationOutcome::NoMatchingTracks
        ));
    }

    #[test]
    fn test_short_batch_stops_after_one_iteration() {
        for minimum in [1, 50, 10_000] {
            let mut source = MockCandidateSource::new();
            source
                .expect_fetch_recommendations()
                .times(1)
                .returning(|_, limit| Ok(batch("a", limit - 1)));
            source
                .expect_fetch_tempo_features()
                .times(1)
                .returning(|ids| Ok(vec![None; ids.len()]));

            let criteria = TargetCriteria::new(100.0, 5.0, minimum).unwrap();
            let accumulation = generator()
                .accumulate(&source, &seeds(), &criteria, false, &HashSet::new(), no_progress)
                .unwrap();
            assert_eq!(accumulation.iterations, 1);
            assert!(accumulation.exhausted);
        }
    }

    #[test]
    fn test_empty_batch_skips_feature_lookup() {
        let mut source = MockCandidateSource::new();
        source
            .expect_fetch_recommendations()
            .withf(|seed_ids, _| seed_ids.is_empty())
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        source.expect_fetch_tempo_features().never();

        let criteria = TargetCriteria::new(120.0, 2.0, 10).unwrap();
        let outcome = generator()
            .generate(&source, &[], &criteria, false, &HashSet::new(), no_progress)
            .unwrap();
        assert!(matches!(outcome, GenerationOutcome::NoMatchingTracks));
    }

    #[test]
    fn test_zero_minimum_fetches_nothing() {
        let mut source = MockCandidateSource::new();
        source.expect_fetch_recommendations().never();
        source.expect_fetch_tempo_features().never();

        let criteria = TargetCriteria::new(120.0, 2.0, 0).unwrap();
        let accumulation = generator()
            .accumulate(&source, &seeds(), &criteria, false, &HashSet::new(), no_progress)
            .unwrap();
        assert_eq!(accumulation.iterations, 0);
        assert!(accumulation.tracks.is_empty());
    }

    #[test]
    fn test_seeds_and_batch_size_are_constant() {
        let mut source = MockCandidateSource::new();
        let mut call = 0;
        source
            .expect_fetch_recommendations()
            .withf(|seed_ids, limit| seed_ids == ["s1".to_string(), "s2".to_string()] && *limit == 25)
            .times(3)
            .returning(move |_, limit| {
                call += 1;
                let size = if call < 3 { limit } else { 5 };
                Ok(batch(&format!("r{call}-"), size))
            });
        source
            .expect_fetch_tempo_features()
            .returning(|ids| Ok(vec![None; ids.len()]));

        let settings = GeneratorSettings {
            batch_size: 25,
            ..GeneratorSettings::default()
        };
        let criteria = TargetCriteria::new(120.0, 2.0, 1).unwrap();
        let accumulation = PlaylistGenerator::new(settings)
            .accumulate(
                &source,
                &["s1".to_string(), "s2".to_string()],
                &criteria,
                false,
                &HashSet::new(),
                no_progress,
            )
            .unwrap();
        assert_eq!(accumulation.iterations, 3);
    }

    #[test]
    fn test_growth_is_monotonic_and_repeats_are_dropped() {
        // every batch repeats the previous one plus a few new matching tracks
        let batches: Vec<Vec<Track>> = (1..=4)
            .map(|round| {
                let mut b = batch("m", round * 3);
                b.extend(batch(&format!("x{round}-"), 100 - round * 3));
                b
            })
            .chain(std::iter::once(batch("m", 3)))
            .collect();
        let mut tempo_map = HashMap::new();
        for i in 0..12 {
            tempo_map.insert(format!("m{i}"), 115.0 + i as f64);
        }
        let source = scripted_source(batches, tempo_map);
        let criteria = TargetCriteria::new(120.0, 10.0, 100).unwrap();

        let mut collected = Vec::new();
        let accumulation = generator()
            .accumulate(&source, &seeds(), &criteria, false, &HashSet::new(), |p| {
                collected.push(p.collected)
            })
            .unwrap();

        assert_eq!(collected, vec![3, 6, 9, 12, 12]);
        assert!(collected.windows(2).all(|w| w[0] <= w[1]));
        let ids: HashSet<&str> = accumulation
            .tracks
            .entries()
            .iter()
            .map(|e| e.track.id.as_str())
            .collect();
        assert_eq!(ids.len(), accumulation.tracks.len());
        let range = accumulation.tracks.tempo_range().unwrap();
        assert_relative_eq!(range.min, 115.0);
        assert_relative_eq!(range.max, 126.0);
    }

    #[test]
    fn test_owned_tracks_are_excluded_when_requested() {
        let matching = tempos(&[("a0", 120.0), ("a1", 120.5), ("a2", 119.0), ("a3", 121.0)]);
        let owned: HashSet<String> = ["a1".to_string(), "a3".to_string()].into_iter().collect();
        let criteria = TargetCriteria::new(120.0, 2.0, 4).unwrap();

        let source = scripted_source(vec![batch("a", 100), batch("b", 10)], matching.clone());
        let excluded = generator()
            .accumulate(&source, &seeds(), &criteria, true, &owned, no_progress)
            .unwrap();
        let excluded_ids: Vec<&str> = excluded.tracks.entries().iter().map(|e| e.track.id.as_str()).collect();
        assert_eq!(excluded_ids, vec!["a0", "a2"]);
        assert!(excluded_ids.iter().all(|id| !owned.contains(*id)));

        let source = scripted_source(vec![batch("a", 100)], matching);
        let included = generator()
            .accumulate(&source, &seeds(), &criteria, false, &owned, no_progress)
            .unwrap();
        let included_ids: Vec<&str> = included.tracks.entries().iter().map(|e| e.track.id.as_str()).collect();
        assert_eq!(included_ids, vec!["a0", "a1", "a2", "a3"]);
    }

    #[test]
    fn test_upstream_failure_propagates() {
        let mut source = MockCandidateSource::new();
        source
            .expect_fetch_recommendations()
            .returning(|_, _| Err(anyhow::anyhow!("Spotify API returned 401: The access token expired")));

        let criteria = TargetCriteria::new(120.0, 2.0, 3).unwrap();
        let result = generator().generate(&source, &seeds(), &criteria, false, &HashSet::new(), no_progress);
        assert!(result.is_err());
    }
}
