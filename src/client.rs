use crate::config::Config;
use crate::error::SpotifyError;
use crate::models::{
    ApiErrorBody, ApiTrack, AudioFeaturesResponse, CreatedPlaylist, CurrentUser, Paging,
    PlaylistItem, RecommendationsResponse, SavedTrack, SimplifiedPlaylist, TempoFeature, Track,
    track_uri,
};
use crate::playlist::{CandidateSource, PlaylistLibrary, PlaylistSink, TimeRange};
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::time::Duration;
use ureq::{Agent, AgentBuilder, Response};
use urlencoding::encode;

const MAX_ATTEMPTS: u32 = 3;
const MAX_RETRY_WAIT_SECS: u64 = 30;
const MAX_IDS_PER_REQUEST: usize = 100; // audio-features ids and playlist uris
const MAX_RECOMMENDATIONS: usize = 100;
const SAVED_TRACKS_PAGE: usize = 50;
const PLAYLISTS_PAGE: usize = 50;
const PLAYLIST_ITEMS_PAGE: usize = 100;

/// A blocking Spotify Web API client authenticated with a user bearer token
pub struct SpotifyClient {
    agent: Agent,
    base_url: String,
    bearer: String,
}

impl SpotifyClient {
    /// Create a new client with configuration from environment
    pub fn new(config: Config) -> Self {
        let agent = AgentBuilder::new().timeout(Duration::from_secs(30)).build();

        SpotifyClient {
            agent,
            base_url: config.api_base,
            bearer: format!("Bearer {}", config.access_token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Profile of the user the token belongs to
    pub fn current_user(&self) -> Result<CurrentUser> {
        Ok(self.get_json(&self.url("me"), &[])?)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SpotifyError> {
        log::debug!("GET {url} {query:?}");
        let response = self.execute(|| {
            let mut request = self.agent.get(url).set("Authorization", &self.bearer);
            for (key, value) in query {
                request = request.query(key, value);
            }
            request.call()
        })?;
        Self::parse(response)
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, SpotifyError> {
        log::debug!("POST {url}");
        let response = self.execute(|| {
            self.agent
                .post(url)
                .set("Authorization", &self.bearer)
                .send_json(body.clone())
        })?;
        Self::parse(response)
    }

    fn parse<T: DeserializeOwned>(response: Response) -> Result<T, SpotifyError> {
        response
            .into_json::<T>()
            .map_err(|e| SpotifyError::Parse(e.to_string()))
    }

    /// Send a request, retrying rate limits and gateway errors a few times
    fn execute<F>(&self, request: F) -> Result<Response, SpotifyError>
    where
        F: Fn() -> Result<Response, ureq::Error>,
    {
        let mut attempt = 1;
        loop {
            let err = match request() {
                Ok(response) => return Ok(response),
                Err(e) => Self::map_error(e),
            };

            if attempt >= MAX_ATTEMPTS || !err.is_retryable() {
                return Err(err);
            }

            let wait = match &err {
                SpotifyError::RateLimited { retry_after } => (*retry_after).min(MAX_RETRY_WAIT_SECS),
                _ => 2u64.pow(attempt),
            };
            log::warn!("{err}; retrying in {wait}s (attempt {attempt}/{MAX_ATTEMPTS})");
            std::thread::sleep(Duration::from_secs(wait));
            attempt += 1;
        }
    }

    fn map_error(err: ureq::Error) -> SpotifyError {
        match err {
            ureq::Error::Status(429, response) => {
                let retry_after = response
                    .header("Retry-After")
                    .and_then(|value| value.trim().parse().ok())
                    .unwrap_or(1);
                SpotifyError::RateLimited { retry_after }
            }
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                let message = match serde_json::from_str::<ApiErrorBody>(&body) {
                    Ok(parsed) => parsed.error.message,
                    Err(_) if body.trim().is_empty() => "no error details".to_string(),
                    Err(_) => body,
                };
                SpotifyError::Api { status, message }
            }
            ureq::Error::Transport(transport) => SpotifyError::Transport(transport.to_string()),
        }
    }

    /// Follow `next` links, stopping early once `limit` items are in hand
    fn collect_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        limit: Option<usize>,
    ) -> Result<Vec<T>, SpotifyError> {
        let mut items = Vec::new();
        let mut page: Paging<T> = self.get_json(url, query)?;
        let mut pages = 1;

        loop {
            let Paging {
                items: page_items,
                next,
            } = page;
            items.extend(page_items);

            let reached_limit = limit.is_some_and(|l| items.len() >= l);
            match next {
                Some(next_url) if !reached_limit => {
                    page = self.get_json(&next_url, &[])?;
                    pages += 1;
                }
                _ => break,
            }
        }

        log::debug!("Fetched {} items over {pages} pages from {url}", items.len());
        if let Some(l) = limit {
            items.truncate(l);
        }
        Ok(items)
    }
}

impl CandidateSource for SpotifyClient {
    fn fetch_top_tracks(&self, limit: u32, time_range: TimeRange) -> Result<Vec<Track>> {
        let page: Paging<ApiTrack> = self.get_json(
            &self.url("me/top/tracks"),
            &[
                ("limit", limit.to_string()),
                ("time_range", time_range.as_str().to_string()),
            ],
        )?;
        Ok(page.items.into_iter().filter_map(ApiTrack::into_track).collect())
    }

    fn fetch_liked_tracks(&self, limit: usize) -> Result<Vec<Track>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let saved: Vec<SavedTrack> = self.collect_pages(
            &self.url("me/tracks"),
            &[("limit", limit.min(SAVED_TRACKS_PAGE).to_string())],
            Some(limit),
        )?;
        Ok(saved
            .into_iter()
            .filter_map(|item| item.track.into_track())
            .collect())
    }

    fn fetch_recommendations(&self, seed_ids: &[String], limit: usize) -> Result<Vec<Track>> {
        // The endpoint requires at least one seed; no seeds means nothing to recommend
        if seed_ids.is_empty() {
            log::warn!("No seed tracks available, skipping recommendation request");
            return Ok(Vec::new());
        }

        let response: RecommendationsResponse = self.get_json(
            &self.url("recommendations"),
            &[
                ("seed_tracks", seed_ids.join(",")),
                ("limit", limit.min(MAX_RECOMMENDATIONS).to_string()),
            ],
        )?;
        Ok(response
            .tracks
            .into_iter()
            .filter_map(ApiTrack::into_track)
            .collect())
    }

    fn fetch_tempo_features(&self, track_ids: &[String]) -> Result<Vec<Option<TempoFeature>>> {
        let mut features = Vec::with_capacity(track_ids.len());

        for chunk in track_ids.chunks(MAX_IDS_PER_REQUEST) {
            let response: AudioFeaturesResponse = self
                .get_json(&self.url("audio-features"), &[("ids", chunk.join(","))])?;

            let mut chunk_features = response.audio_features;
            if chunk_features.len() != chunk.len() {
                log::warn!(
                    "Requested features for {} tracks, received {}",
                    chunk.len(),
                    chunk_features.len()
                );
            }
            // keep positions aligned with the request
            chunk_features.resize_with(chunk.len(), || None);
            features.extend(
                chunk_features
                    .into_iter()
                    .map(|feature| feature.map(TempoFeature::from)),
            );
        }

        Ok(features)
    }
}

impl PlaylistLibrary for SpotifyClient {
    fn list_user_playlists(&self, user_id: &str) -> Result<Vec<String>> {
        let playlists: Vec<SimplifiedPlaylist> = self.collect_pages(
            &self.url(&format!("users/{}/playlists", encode(user_id))),
            &[("limit", PLAYLISTS_PAGE.to_string())],
            None,
        )?;
        for playlist in &playlists {
            log::debug!("Found playlist '{}' ({})", playlist.name, playlist.id);
        }
        Ok(playlists.into_iter().map(|playlist| playlist.id).collect())
    }

    fn list_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<String>> {
        let items: Vec<PlaylistItem> = self.collect_pages(
            &self.url(&format!("playlists/{}/tracks", encode(playlist_id))),
            &[
                ("limit", PLAYLIST_ITEMS_PAGE.to_string()),
                ("fields", "items(track(id)),next".to_string()),
            ],
            None,
        )?;
        // local files and removed tracks have no id
        Ok(items
            .into_iter()
            .filter_map(|item| item.track.and_then(|track| track.id))
            .collect())
    }
}

impl PlaylistSink for SpotifyClient {
    fn create_playlist(&self, user_id: &str, name: &str, description: &str) -> Result<String> {
        let created: CreatedPlaylist = self.post_json(
            &self.url(&format!("users/{}/playlists", encode(user_id))),
            serde_json::json!({
                "name": name,
                "description": description,
                "public": true,
            }),
        )?;
        log::info!("Created playlist '{}' ({})", created.name, created.id);
        Ok(created.id)
    }

    fn append_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        let url = self.url(&format!("playlists/{}/tracks", encode(playlist_id)));
        for chunk in track_ids.chunks(MAX_IDS_PER_REQUEST) {
            let uris: Vec<String> = chunk.iter().map(|id| track_uri(id)).collect();
            let _snapshot: serde_json::Value =
                self.post_json(&url, serde_json::json!({ "uris": uris }))?;
            log::debug!("Appended {} tracks to {playlist_id}", chunk.len());
        }
        Ok(())
    }
}
