//! Read models returned to callers.
//!
//! Users are always reduced to [`UserSummary`]; email, password hash and
//! relation sets never leave the service.

use bridge_traits::BlobStream;
use chrono::{DateTime, Utc};
use core_library::models::{Comment, CommentId, Playlist, PlaylistId, Song, SongId, User, UserId};
use core_library::query::RankedSongRow;
use serde::Serialize;
use std::fmt;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

pub(crate) fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongSummary {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub listened_count: i64,
}

impl From<&Song> for SongSummary {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id,
            title: song.title.clone(),
            artist: song.artist.clone(),
            genre: song.genre.clone(),
            description: song.description.clone(),
            uploaded_at: timestamp(song.uploaded_at),
            listened_count: song.listened_count,
        }
    }
}

/// Song with its uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongView {
    #[serde(flatten)]
    pub song: SongSummary,
    pub uploader: UserSummary,
}

/// Song with its reaction and comment counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongInfo {
    #[serde(flatten)]
    pub song: SongSummary,
    pub likes: i64,
    pub dislikes: i64,
    pub comments: i64,
}

impl From<RankedSongRow> for SongInfo {
    fn from(row: RankedSongRow) -> Self {
        Self {
            song: SongSummary::from(&row.song),
            likes: row.likes,
            dislikes: row.dislikes,
            comments: row.comments,
        }
    }
}

/// Entry of a filtered or top-N listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedSong {
    #[serde(flatten)]
    pub song: SongSummary,
    pub likes: i64,
    pub dislikes: i64,
    pub comments: i64,
}

impl From<RankedSongRow> for RankedSong {
    fn from(row: RankedSongRow) -> Self {
        Self {
            song: SongSummary::from(&row.song),
            likes: row.likes,
            dislikes: row.dislikes,
            comments: row.comments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistView {
    pub id: PlaylistId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub owner: UserSummary,
    pub songs: Vec<SongSummary>,
}

impl PlaylistView {
    pub(crate) fn new(playlist: &Playlist, owner: &User, songs: &[Song]) -> Self {
        Self {
            id: playlist.id,
            name: playlist.name.clone(),
            created_at: timestamp(playlist.created_at),
            owner: UserSummary::from(owner),
            songs: songs.iter().map(SongSummary::from).collect(),
        }
    }
}

/// Result of a like or dislike toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionOutcome {
    pub message: String,
    /// Size of the reaction set after the toggle
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub author: UserSummary,
    pub song_id: SongId,
    pub created_at: DateTime<Utc>,
    pub text: String,
}

impl CommentView {
    pub(crate) fn new(comment: &Comment, author: &User) -> Self {
        Self {
            id: comment.id,
            author: UserSummary::from(author),
            song_id: comment.song_id,
            created_at: timestamp(comment.created_at),
            text: comment.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongDeleted {
    pub message: String,
    pub song_id: SongId,
}

/// Audio of a song being played. Counters were committed before this was
/// opened.
pub struct PlaybackStream {
    pub song_id: SongId,
    pub content_type: String,
    pub size: Option<u64>,
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl PlaybackStream {
    pub(crate) fn new(song_id: SongId, blob: BlobStream) -> Self {
        Self {
            song_id,
            content_type: blob.content_type,
            size: blob.size,
            reader: blob.reader,
        }
    }

    pub fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        self.reader
    }

    /// Chunked byte stream for transports that write a body incrementally.
    pub fn into_stream(self) -> ReaderStream<Box<dyn AsyncRead + Send + Unpin>> {
        ReaderStream::new(self.reader)
    }
}

impl fmt::Debug for PlaybackStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackStream")
            .field("song_id", &self.song_id)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId(1),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: 0,
        }
    }

    fn song() -> Song {
        Song {
            id: SongId(9),
            title: "Tune".to_string(),
            artist: "Band".to_string(),
            genre: "Pop".to_string(),
            description: None,
            uploaded_at: 1_700_000_000,
            storage_key: "uploaded-songs/abc.mp3".to_string(),
            listened_count: 3,
            uploader_id: UserId(1),
        }
    }

    #[test]
    fn test_user_summary_strips_credentials() {
        let json = serde_json::to_value(UserSummary::from(&user())).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 1, "username": "alice" }));
    }

    #[test]
    fn test_song_view_hides_storage_key_and_flattens() {
        let view = SongView {
            song: SongSummary::from(&song()),
            uploader: UserSummary::from(&user()),
        };
        let json = serde_json::to_string(&view).unwrap();

        assert!(json.contains("\"title\":\"Tune\""));
        assert!(json.contains("\"uploader\":{\"id\":1,\"username\":\"alice\"}"));
        assert!(!json.contains("storage_key"));
        assert!(!json.contains("password"));
        assert!(!json.contains("email"));
    }

    #[test]
    fn test_playlist_view_reduces_members() {
        let playlist = Playlist {
            id: PlaylistId(2),
            name: "Mix".to_string(),
            created_at: 0,
            owner_id: UserId(1),
        };
        let view = PlaylistView::new(&playlist, &user(), &[song()]);

        assert_eq!(view.owner.username, "alice");
        assert_eq!(view.songs.len(), 1);
        assert_eq!(view.songs[0].listened_count, 3);
        assert_eq!(view.created_at, timestamp(0));
    }
}
