use anyhow::{Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Listening-history window used for top tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// Roughly the last four weeks
    ShortTerm,
    /// Roughly the last six months
    MediumTerm,
    /// Several years of history
    #[default]
    LongTerm,
}

impl TimeRange {
    /// Value of the `time_range` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

/// Where recommendation seeds come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SeedSource {
    TopTracks { time_range: TimeRange },
    LikedSongs { limit: usize },
}

impl Default for SeedSource {
    fn default() -> Self {
        SeedSource::TopTracks {
            time_range: TimeRange::default(),
        }
    }
}

/// Target tempo window and minimum playlist length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetCriteria {
    pub target_tempo: f64,    // beats per minute
    pub tolerance: f64,       // inclusive +/- band around target_tempo
    pub minimum_count: usize, // tracks required before a playlist is created
}

impl TargetCriteria {
    pub fn new(target_tempo: f64, tolerance: f64, minimum_count: usize) -> Result<Self> {
        if !target_tempo.is_finite() || target_tempo <= 0.0 {
            bail!("Target tempo must be a positive number, got {target_tempo}");
        }
        if !tolerance.is_finite() || tolerance < 0.0 {
            bail!("Tempo tolerance must be zero or positive, got {tolerance}");
        }
        Ok(Self {
            target_tempo,
            tolerance,
            minimum_count,
        })
    }

    /// A tempo matches iff |tempo - target| <= tolerance
    pub fn matches(&self, tempo: f64) -> bool {
        (tempo - self.target_tempo).abs() <= self.tolerance
    }
}

/// Tunables for seed selection and the recommendation loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub batch_size: usize,      // recommendations requested per iteration
    pub seed_count: usize,      // seeds passed to the recommendation engine
    pub top_tracks_limit: u32,  // top tracks fetched before taking seeds
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            batch_size: 100,
            seed_count: 5,
            top_tracks_limit: 50,
        }
    }
}

/// Everything a run needs, gathered once from flags and prompts
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub criteria: TargetCriteria,
    pub exclude_owned: bool,
    pub seed_source: SeedSource,
    pub settings: GeneratorSettings,
    pub playlist_name: Option<String>,
    pub description: Option<String>, // replaces the generated tempo range description
    pub dry_run: bool,
}

impl RunConfig {
    pub fn new(criteria: TargetCriteria, exclude_owned: bool, seed_source: SeedSource) -> Self {
        Self {
            criteria,
            exclude_owned,
            seed_source,
            settings: GeneratorSettings::default(),
            playlist_name: None,
            description: None,
            dry_run: false,
        }
    }
}
