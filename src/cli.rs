use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::io::{BufRead, Write};

use crate::playlist::{RunConfig, SeedSource, TargetCriteria, TimeRange};
use crate::prompt::Prompter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedChoice {
    /// Your most played tracks
    Top,
    /// Random picks from your liked songs
    Liked,
}

#[derive(Parser, Debug)]
#[command(name = "tempo-playlist")]
#[command(about = "Build a Spotify playlist of recommendations close to a target tempo")]
#[command(version)]
pub struct Args {
    /// Target tempo in beats per minute
    #[arg(short = 't', long = "tempo")]
    pub tempo: Option<f64>,

    /// Allowed +/- BPM around the target tempo
    #[arg(long = "tolerance")]
    pub tolerance: Option<f64>,

    /// Minimum number of tracks; no playlist is created below this
    #[arg(short = 'n', long = "min-tracks")]
    pub min_tracks: Option<usize>,

    /// Skip tracks already present in any of your playlists
    #[arg(long = "exclude-existing", conflicts_with = "keep_existing")]
    pub exclude_existing: bool,

    /// Allow tracks already present in your playlists
    #[arg(long = "keep-existing")]
    pub keep_existing: bool,

    /// Where recommendation seeds come from
    #[arg(short = 's', long = "seed-source", value_enum)]
    pub seed_source: Option<SeedChoice>,

    /// Listening history window for top-track seeds
    #[arg(long = "time-range", value_enum, default_value_t = TimeRange::LongTerm)]
    pub time_range: TimeRange,

    /// How many liked songs to sample seeds from
    #[arg(long = "liked-limit", default_value_t = 50)]
    pub liked_limit: usize,

    /// Playlist name (asked for after tracks are found if omitted)
    #[arg(long = "name")]
    pub name: Option<String>,

    /// Playlist description (defaults to the tempo range of the tracks)
    #[arg(long = "description")]
    pub description: Option<String>,

    /// Print the collected tracks instead of creating a playlist
    #[arg(short = 'd', long = "dry-run")]
    pub dry_run: bool,

    /// Quiet mode - reduce output verbosity
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Log progress details (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

fn parse_tempo(answer: &str) -> Result<f64, String> {
    match answer.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err("Please enter a positive number of beats per minute.".to_string()),
    }
}

fn parse_tolerance(answer: &str) -> Result<f64, String> {
    match answer.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err("Please enter a tolerance of zero or more.".to_string()),
    }
}

fn parse_count(answer: &str) -> Result<usize, String> {
    answer
        .parse::<usize>()
        .map_err(|_| "Please enter a whole number of tracks.".to_string())
}

/// Fill in everything the flags left out by asking on the console
pub fn build_run_config<R: BufRead, W: Write>(
    args: &Args,
    prompter: &mut Prompter<R, W>,
) -> Result<RunConfig> {
    let tempo = match args.tempo {
        Some(tempo) => tempo,
        None => prompter.ask_parsed("Enter desired tempo (bpm): ", parse_tempo)?,
    };
    let tolerance = match args.tolerance {
        Some(tolerance) => tolerance,
        None => prompter.ask_parsed(
            "Specify +- bpm tolerance (low tolerance may lead to a short playlist): ",
            parse_tolerance,
        )?,
    };
    let minimum_count = match args.min_tracks {
        Some(count) => count,
        None => prompter.ask_parsed("Minimum playlist length (no. of tracks): ", parse_count)?,
    };
    let criteria = TargetCriteria::new(tempo, tolerance, minimum_count)?;

    let exclude_owned = if args.exclude_existing {
        true
    } else if args.keep_existing {
        false
    } else {
        prompter.ask_yes_no(
            "Should the playlist exclude tracks already present in your other playlists? (y/n): ",
        )?
    };

    let seed_choice = match args.seed_source {
        Some(choice) => choice,
        None => {
            let index = prompter.ask_choice(
                "Seed playlist with (1) Top tracks or (2) Liked songs? Enter 1 or 2: ",
                &["1", "2"],
            )?;
            if index == 0 { SeedChoice::Top } else { SeedChoice::Liked }
        }
    };
    let seed_source = match seed_choice {
        SeedChoice::Top => SeedSource::TopTracks {
            time_range: args.time_range,
        },
        SeedChoice::Liked => SeedSource::LikedSongs {
            limit: args.liked_limit,
        },
    };

    let mut config = RunConfig::new(criteria, exclude_owned, seed_source);
    config.playlist_name = args.name.clone().filter(|name| !name.trim().is_empty());
    config.description = args.description.clone();
    config.dry_run = args.dry_run;
    Ok(config)
}

/// Name used when the user leaves the playlist name blank, e.g. "120 BPM 2024-05-01"
pub fn default_playlist_name(target_tempo: f64, date: NaiveDate) -> String {
    format!("{target_tempo} BPM {}", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["tempo-playlist"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_everything_from_prompts() {
        let mut p = prompter("120\n2\n25\ny\n2\n");
        let config = build_run_config(&args(&[]), &mut p).unwrap();

        assert_eq!(config.criteria, TargetCriteria::new(120.0, 2.0, 25).unwrap());
        assert!(config.exclude_owned);
        assert_eq!(config.seed_source, SeedSource::LikedSongs { limit: 50 });
        assert!(config.playlist_name.is_none());
        assert!(!config.dry_run);
    }

    #[test]
    fn test_everything_from_flags_asks_nothing() {
        let cli = args(&[
            "--tempo", "172.5", "--tolerance", "1.5", "-n", "40", "--keep-existing",
            "--seed-source", "top", "--time-range", "medium-term", "--name", "Drum & Bass",
            "--dry-run",
        ]);
        // no input at all: any prompt would fail on closed input
        let config = build_run_config(&cli, &mut prompter("")).unwrap();

        assert_eq!(config.criteria, TargetCriteria::new(172.5, 1.5, 40).unwrap());
        assert!(!config.exclude_owned);
        assert_eq!(
            config.seed_source,
            SeedSource::TopTracks {
                time_range: TimeRange::MediumTerm
            }
        );
        assert_eq!(config.playlist_name.as_deref(), Some("Drum & Bass"));
        assert!(config.dry_run);
    }

    #[test]
    fn test_invalid_prompt_answers_are_asked_again() {
        let mut p = prompter("zero\n0\n95\n-1\n3\nmany\n10\nn\n5\n1\n");
        let config = build_run_config(&args(&[]), &mut p).unwrap();

        assert_eq!(config.criteria, TargetCriteria::new(95.0, 3.0, 10).unwrap());
        assert!(!config.exclude_owned);
        assert_eq!(config.seed_source, SeedSource::default());
    }

    #[test]
    fn test_invalid_flag_value_is_an_error() {
        let cli = args(&["--tempo=-5", "--tolerance", "2", "-n", "3", "--keep-existing", "-s", "top"]);
        assert!(build_run_config(&cli, &mut prompter("")).is_err());
    }

    #[test]
    fn test_exclusion_flags_conflict() {
        let result = Args::try_parse_from(["tempo-playlist", "--exclude-existing", "--keep-existing"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_name() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(default_playlist_name(120.0, date), "120 BPM 2024-05-01");
        assert_eq!(default_playlist_name(87.5, date), "87.5 BPM 2024-05-01");
    }
}
