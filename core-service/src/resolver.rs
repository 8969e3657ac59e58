//! Id to entity resolution. The only place a missing user, song or playlist
//! is detected.

use crate::error::{CoreError, Result};
use core_library::models::{Playlist, PlaylistId, Song, SongId, User, UserId};
use core_library::repositories::{PlaylistRepository, SongRepository, UserRepository};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct IdentityResolver {
    users: Arc<dyn UserRepository>,
    songs: Arc<dyn SongRepository>,
    playlists: Arc<dyn PlaylistRepository>,
}

impl IdentityResolver {
    pub(crate) fn new(
        users: Arc<dyn UserRepository>,
        songs: Arc<dyn SongRepository>,
        playlists: Arc<dyn PlaylistRepository>,
    ) -> Self {
        Self {
            users,
            songs,
            playlists,
        }
    }

    pub(crate) async fn user(&self, id: UserId) -> Result<User> {
        debug!(user_id = %id, "Resolving user");
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id))
    }

    pub(crate) async fn user_by_username(&self, username: &str) -> Result<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| CoreError::not_found("User", username))
    }

    /// Resolves an optional acting user; an id that matches no account is
    /// treated like no id at all.
    pub(crate) async fn optional_user(&self, id: Option<UserId>) -> Result<Option<User>> {
        match id {
            Some(id) => Ok(self.users.find_by_id(id).await?),
            None => Ok(None),
        }
    }

    pub(crate) async fn song(&self, id: SongId) -> Result<Song> {
        debug!(song_id = %id, "Resolving song");
        self.songs
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Song", id))
    }

    pub(crate) async fn playlist(&self, id: PlaylistId) -> Result<Playlist> {
        debug!(playlist_id = %id, "Resolving playlist");
        self.playlists
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Playlist", id))
    }
}
