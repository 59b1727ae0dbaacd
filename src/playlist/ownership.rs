use anyhow::Result;
use std::collections::HashSet;

use super::PlaylistLibrary;

/// Track ids already present somewhere in the user's playlists
pub struct OwnershipFilter;

impl OwnershipFilter {
    /// Union of the track ids of every playlist the user has.
    ///
    /// Walks every playlist, so only call this when exclusion was asked for.
    pub fn collect_owned_ids<L: PlaylistLibrary + ?Sized>(
        library: &L,
        user_id: &str,
    ) -> Result<HashSet<String>> {
        let playlist_ids = library.list_user_playlists(user_id)?;
        log::info!("Scanning {} playlists for existing tracks", playlist_ids.len());

        let mut owned = HashSet::new();
        for playlist_id in &playlist_ids {
            let track_ids = library.list_playlist_tracks(playlist_id)?;
            log::debug!("Playlist {playlist_id}: {} tracks", track_ids.len());
            owned.extend(track_ids);
        }

        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::MockPlaylistLibrary;
    use mockall::predicate::eq;

    #[test]
    fn test_unions_tracks_across_playlists() {
        let mut library = MockPlaylistLibrary::new();
        library
            .expect_list_user_playlists()
            .with(eq("user-1"))
            .times(1)
            .returning(|_| Ok(vec!["p1".to_string(), "p2".to_string()]));
        library
            .expect_list_playlist_tracks()
            .with(eq("p1"))
            .returning(|_| Ok(vec!["a".to_string(), "b".to_string()]));
        library
            .expect_list_playlist_tracks()
            .with(eq("p2"))
            .returning(|_| Ok(vec!["b".to_string(), "c".to_string()]));

        let owned = OwnershipFilter::collect_owned_ids(&library, "user-1").unwrap();

        let expected: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(owned, expected);
    }

    #[test]
    fn test_no_playlists_means_nothing_owned() {
        let mut library = MockPlaylistLibrary::new();
        library
            .expect_list_user_playlists()
            .returning(|_| Ok(Vec::new()));
        library.expect_list_playlist_tracks().never();

        let owned = OwnershipFilter::collect_owned_ids(&library, "user-1").unwrap();
        assert!(owned.is_empty());
    }

    #[test]
    fn test_upstream_failure_propagates() {
        let mut library = MockPlaylistLibrary::new();
        library
            .expect_list_user_playlists()
            .returning(|_| Ok(vec!["p1".to_string()]));
        library
            .expect_list_playlist_tracks()
            .returning(|_| Err(anyhow::anyhow!("HTTP 500")));

        assert!(OwnershipFilter::collect_owned_ids(&library, "user-1").is_err());
    }
}
