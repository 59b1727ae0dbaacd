use anyhow::Result;

use super::TimeRange;
use crate::models::{TempoFeature, Track};

/// Supplies seeds, recommendations and tempo data.
///
/// Implemented by the HTTP client; mocked in tests.
#[cfg_attr(test, mockall::automock)]
pub trait CandidateSource {
    /// The user's most played tracks over `time_range`, best first
    fn fetch_top_tracks(&self, limit: u32, time_range: TimeRange) -> Result<Vec<Track>>;

    /// Saved tracks, newest first, paginated until `limit` or the end of the library
    fn fetch_liked_tracks(&self, limit: usize) -> Result<Vec<Track>>;

    /// At most `limit` recommendations for the seeds. A shorter batch means
    /// the engine has nothing more to offer for these seeds.
    fn fetch_recommendations(&self, seed_ids: &[String], limit: usize) -> Result<Vec<Track>>;

    /// One entry per requested id, in request order; `None` when the service has no analysis.
    fn fetch_tempo_features(&self, track_ids: &[String]) -> Result<Vec<Option<TempoFeature>>>;
}

/// Read access to the user's existing playlists
#[cfg_attr(test, mockall::automock)]
pub trait PlaylistLibrary {
    fn list_user_playlists(&self, user_id: &str) -> Result<Vec<String>>;

    fn list_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<String>>;
}

/// Write access for the finished playlist
#[cfg_attr(test, mockall::automock)]
pub trait PlaylistSink {
    fn create_playlist(&self, user_id: &str, name: &str, description: &str) -> Result<String>;

    /// Must not be called with an empty list; see [`super::sink::add_tracks`]
    fn append_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;
}
