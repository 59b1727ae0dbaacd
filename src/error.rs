use thiserror::Error;

/// Errors raised by the Spotify Web API client.
///
/// These are upstream failures: the playlist core never tries to recover from
/// them and they end the run at the process boundary.
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Non-success HTTP status, with the message from the API error body when present.
    #[error("Spotify API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Still rate limited after the client's retries ran out.
    #[error("Rate limited by Spotify API (retry after {retry_after}s)")]
    RateLimited { retry_after: u64 },

    /// Connection, DNS or TLS failure before any response arrived.
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// A response body that did not match the expected shape.
    #[error("Failed to parse Spotify response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpotifyError {
    /// Whether the request is worth repeating after a pause
    pub fn is_retryable(&self) -> bool {
        match self {
            SpotifyError::RateLimited { .. } => true,
            SpotifyError::Api { status, .. } => *status == 502 || *status == 503,
            _ => false,
        }
    }
}
