use serde::{Deserialize, Serialize};

/// A track as the rest of the application sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>, // Display names, in credit order
}

impl Track {
    #[cfg(test)]
    pub fn new(id: &str, name: &str, artists: &[&str]) -> Self {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Comma separated artist credit, e.g. "Daft Punk, Pharrell Williams"
    pub fn artist_names(&self) -> String {
        self.artists.join(", ")
    }
}

/// URI form accepted by the playlist endpoints
pub fn track_uri(id: &str) -> String {
    format!("spotify:track:{id}")
}

/// Tempo of a single track, in beats per minute
#[derive(Debug, Clone, PartialEq)]
pub struct TempoFeature {
    pub track_id: String,
    pub tempo: f64,
}

/// Track object as returned by the Web API (full or simplified)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTrack {
    pub id: Option<String>, // null for local files
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiArtist {
    pub name: String,
}

impl ApiTrack {
    /// Convert into a domain track; tracks without an id cannot be added to playlists
    pub fn into_track(self) -> Option<Track> {
        let id = self.id?;
        Some(Track {
            id,
            name: self.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
        })
    }
}

/// Generic paging object used by list endpoints
#[derive(Debug, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next: Option<String>,
}

/// Item of `GET /me/tracks`
#[derive(Debug, Deserialize)]
pub struct SavedTrack {
    pub track: ApiTrack,
}

/// Item of `GET /playlists/{id}/tracks`
#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<PlaylistItemTrack>, // null when the track was removed from the catalogue
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItemTrack {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimplifiedPlaylist {
    pub id: String,
    pub name: String,
}

/// Response structure for `GET /recommendations`
#[derive(Debug, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<ApiTrack>,
}

/// Response structure for `GET /audio-features`
#[derive(Debug, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Vec<Option<ApiAudioFeatures>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiAudioFeatures {
    pub id: String,
    pub tempo: f64,
}

impl From<ApiAudioFeatures> for TempoFeature {
    fn from(features: ApiAudioFeatures) -> Self {
        TempoFeature {
            track_id: features.id,
            tempo: features.tempo,
        }
    }
}

/// Response structure for `GET /me`
#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

/// Response structure for `POST /users/{user_id}/playlists`
#[derive(Debug, Deserialize)]
pub struct CreatedPlaylist {
    pub id: String,
    pub name: String,
}

/// Error body the Web API sends alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}
