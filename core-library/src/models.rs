//! Domain models for the catalog
//!
//! Row-shaped entities with database mapping, plus the insert payloads used
//! by the repositories. Ids are SQLite rowids wrapped in newtypes so a song
//! id can never be passed where a playlist id is expected.

use crate::validation;
use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

// =============================================================================
// ID Types
// =============================================================================

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            sqlx::Type,
        )]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Unique identifier for a user
    UserId
);
row_id!(
    /// Unique identifier for a song
    SongId
);
row_id!(
    /// Unique identifier for a playlist
    PlaylistId
);
row_id!(
    /// Unique identifier for a comment
    CommentId
);

// =============================================================================
// User
// =============================================================================

/// A registered account. Credentials are stored but never leave this crate
/// in a projection.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
}

// =============================================================================
// Song
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub description: Option<String>,
    /// Upload time, unix seconds
    pub uploaded_at: i64,
    /// Blob store key of the audio file
    pub storage_key: String,
    pub listened_count: i64,
    pub uploader_id: UserId,
}

/// Insert payload for a freshly uploaded song. `listened_count` always
/// starts at zero.
#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub description: Option<String>,
    pub uploaded_at: i64,
    pub storage_key: String,
    pub uploader_id: UserId,
}

impl NewSong {
    pub fn validate(&self) -> Result<()> {
        validate_song_fields(&self.title, &self.artist, &self.genre)
    }
}

impl Song {
    pub fn validate(&self) -> Result<()> {
        validate_song_fields(&self.title, &self.artist, &self.genre)
    }
}

fn validate_song_fields(title: &str, artist: &str, genre: &str) -> Result<()> {
    validation::validate_title(title)?;
    validation::validate_artist(artist)?;
    validation::validate_genre(genre)
}

// =============================================================================
// Playlist
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub created_at: i64,
    pub owner_id: UserId,
}

#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub name: String,
    pub created_at: i64,
    pub owner_id: UserId,
}

impl NewPlaylist {
    /// Builds a playlist payload with the name trimmed and validated.
    pub fn new(name: &str, owner_id: UserId, created_at: i64) -> Result<Self> {
        validation::validate_playlist_name(name)?;
        Ok(Self {
            name: name.trim().to_string(),
            created_at,
            owner_id,
        })
    }
}

// =============================================================================
// Listened
// =============================================================================

/// Per-user play counter for one song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Listened {
    pub user_id: UserId,
    pub song_id: SongId,
    pub listened: i64,
}

// =============================================================================
// Comment
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub author_id: UserId,
    pub song_id: SongId,
    pub created_at: i64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: UserId,
    pub song_id: SongId,
    pub created_at: i64,
    pub text: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<()> {
        validation::validate_comment_text(&self.text)
    }
}
