use anyhow::Result;

use crate::error::SpotifyError;

pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// Configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub api_base: String,
    pub access_token: String,
}

impl Config {
    /// Build from a variable lookup; `load_config` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Config, SpotifyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup("SPOTIFY_ACCESS_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                SpotifyError::Config(
                    "SPOTIFY_ACCESS_TOKEN is not set; export a user access token or add it to .env"
                        .to_string(),
                )
            })?;

        let api_base = lookup("SPOTIFY_API_BASE")
            .filter(|base| !base.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            api_base,
            access_token,
        })
    }
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    let config = Config::from_lookup(|key| std::env::var(key).ok())?;
    log::debug!("Using Spotify API at {}", config.api_base);
    Ok(config)
}
