//! Playlist lifecycle and membership.

use crate::authorization::ensure_owner;
use crate::error::{CoreError, Result};
use crate::projection::PlaylistView;
use crate::CatalogService;
use core_library::models::{NewPlaylist, Playlist, PlaylistId, SongId, UserId};
use core_library::repositories::{Page, PageRequest};
use core_library::LibraryError;
use tracing::info;

impl CatalogService {
    /// Create a playlist owned by `acting_user`.
    ///
    /// # Errors
    /// - `NotFound` if the acting user does not exist
    /// - `InvalidInput` if the name breaks the naming rule or is already taken
    pub async fn create_playlist(&self, acting_user: UserId, name: &str) -> Result<PlaylistView> {
        let owner = self.resolver.user(acting_user).await?;
        let new_playlist = NewPlaylist::new(name, owner.id, self.now())?;

        if self
            .repos
            .playlists
            .find_by_name(&new_playlist.name)
            .await?
            .is_some()
        {
            return Err(duplicate_name(&new_playlist.name));
        }

        let playlist = match self.repos.playlists.insert(&new_playlist).await {
            Ok(playlist) => playlist,
            Err(LibraryError::Conflict { .. }) => return Err(duplicate_name(&new_playlist.name)),
            Err(e) => return Err(e.into()),
        };

        info!(
            playlist_id = %playlist.id,
            user_id = %owner.id,
            name = %playlist.name,
            "Playlist created"
        );
        Ok(PlaylistView::new(&playlist, &owner, &[]))
    }

    pub async fn get_playlist(&self, playlist_id: PlaylistId) -> Result<PlaylistView> {
        let playlist = self.resolver.playlist(playlist_id).await?;
        self.playlist_view(&playlist).await
    }

    /// Page through all playlists by name. `page` is 0-based.
    pub async fn list_playlists(&self, page: u32, page_size: u32) -> Result<Page<PlaylistView>> {
        let request = PageRequest::new(page, page_size).validated()?;
        let (playlists, meta) = self.repos.playlists.query(request).await?.into_parts();

        let views = self.playlist_views(&playlists).await?;
        Ok(meta.with_items(views))
    }

    /// Delete a playlist owned by `acting_user` and return a confirmation
    /// naming it.
    pub async fn delete_playlist(
        &self,
        acting_user: UserId,
        playlist_id: PlaylistId,
    ) -> Result<String> {
        let user = self.resolver.user(acting_user).await?;
        let playlist = self.resolver.playlist(playlist_id).await?;
        ensure_owner(&playlist, user.id, "delete it")?;

        if !self.repos.playlists.delete(playlist.id).await? {
            return Err(CoreError::not_found("Playlist", playlist.id));
        }

        info!(playlist_id = %playlist.id, user_id = %user.id, "Playlist deleted");
        Ok(format!("{} was successfully deleted!", playlist.name))
    }

    /// Append a song to a playlist owned by `acting_user`.
    ///
    /// # Errors
    /// - `Forbidden` for anyone but the owner
    /// - `Conflict` if the song is already in the playlist
    pub async fn add_song_to_playlist(
        &self,
        acting_user: UserId,
        playlist_id: PlaylistId,
        song_id: SongId,
    ) -> Result<PlaylistView> {
        let playlist = self.resolver.playlist(playlist_id).await?;
        let song = self.resolver.song(song_id).await?;
        let user = self.resolver.user(acting_user).await?;
        ensure_owner(&playlist, user.id, "add songs to it")?;

        let members = self.repos.playlists.song_ids(playlist.id).await?;
        if members.contains(&song.id) {
            return Err(CoreError::conflict("Song is already in this playlist"));
        }

        self.repos
            .playlists
            .add_song(playlist.id, song.id, self.now())
            .await
            .map_err(|e| match e {
                LibraryError::Conflict { .. } => {
                    CoreError::conflict("Song is already in this playlist")
                }
                other => other.into(),
            })?;

        info!(playlist_id = %playlist.id, song_id = %song.id, "Song added to playlist");
        self.playlist_view(&playlist).await
    }

    /// Remove a song from a playlist owned by `acting_user`.
    ///
    /// # Errors
    /// - `Forbidden` for anyone but the owner
    /// - `Conflict` if the song is not in the playlist
    pub async fn remove_song_from_playlist(
        &self,
        acting_user: UserId,
        playlist_id: PlaylistId,
        song_id: SongId,
    ) -> Result<PlaylistView> {
        let playlist = self.resolver.playlist(playlist_id).await?;
        let song = self.resolver.song(song_id).await?;
        let user = self.resolver.user(acting_user).await?;
        ensure_owner(&playlist, user.id, "remove songs from it")?;

        let members = self.repos.playlists.song_ids(playlist.id).await?;
        if !members.contains(&song.id)
            || !self.repos.playlists.remove_song(playlist.id, song.id).await?
        {
            return Err(CoreError::conflict("Song is not in this playlist"));
        }

        info!(playlist_id = %playlist.id, song_id = %song.id, "Song removed from playlist");
        self.playlist_view(&playlist).await
    }

    /// Playlists whose name contains `fragment`, ignoring case.
    pub async fn search_playlists_by_name(&self, fragment: &str) -> Result<Vec<PlaylistView>> {
        let playlists = self.repos.playlists.search_by_name(fragment.trim()).await?;
        self.playlist_views(&playlists).await
    }

    /// Playlists whose owner's username contains `fragment`, ignoring case.
    pub async fn search_playlists_by_owner_username(
        &self,
        fragment: &str,
    ) -> Result<Vec<PlaylistView>> {
        let playlists = self
            .repos
            .playlists
            .search_by_owner_username(fragment.trim())
            .await?;
        self.playlist_views(&playlists).await
    }

    async fn playlist_views(&self, playlists: &[Playlist]) -> Result<Vec<PlaylistView>> {
        let mut views = Vec::with_capacity(playlists.len());
        for playlist in playlists {
            views.push(self.playlist_view(playlist).await?);
        }
        Ok(views)
    }

    async fn playlist_view(&self, playlist: &Playlist) -> Result<PlaylistView> {
        let owner = self.resolver.user(playlist.owner_id).await?;
        let songs = self.repos.playlists.songs(playlist.id).await?;
        Ok(PlaylistView::new(playlist, &owner, &songs))
    }
}

fn duplicate_name(name: &str) -> CoreError {
    CoreError::invalid_input("name", format!("A playlist named {:?} already exists", name))
}
