use anyhow::Result;

use super::PlaylistSink;

/// Append tracks unless there are none; returns how many were sent.
///
/// The remote append endpoint rejects an empty list, so the check happens here.
pub fn add_tracks<K: PlaylistSink + ?Sized>(
    sink: &K,
    playlist_id: &str,
    track_ids: &[String],
) -> Result<usize> {
    if track_ids.is_empty() {
        log::info!("No tracks to add to playlist {playlist_id}");
        return Ok(0);
    }
    sink.append_tracks(playlist_id, track_ids)?;
    Ok(track_ids.len())
}

/// Create a playlist and fill it; returns the new playlist id
pub fn publish_playlist<K: PlaylistSink + ?Sized>(
    sink: &K,
    user_id: &str,
    name: &str,
    description: &str,
    track_ids: &[String],
) -> Result<String> {
    let playlist_id = sink.create_playlist(user_id, name, description)?;
    log::debug!("Created playlist '{name}' with id {playlist_id}");
    add_tracks(sink, &playlist_id, track_ids)?;
    Ok(playlist_id)
}
