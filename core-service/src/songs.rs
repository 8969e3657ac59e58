//! Song lifecycle: upload, edit, delete, download and comments.

use crate::authorization::ensure_owner;
use crate::error::{CoreError, Result};
use crate::projection::{CommentView, SongDeleted, SongInfo, SongSummary, SongView, UserSummary};
use crate::requests::{EditSong, UploadSong};
use crate::CatalogService;
use bytes::Bytes;
use core_library::models::{NewComment, NewSong, Song, SongId, User, UserId};
use core_library::validation;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

const UPLOAD_PREFIX: &str = "uploaded-songs";
const UPLOAD_EXTENSION: &str = "mp3";
const UPLOAD_CONTENT_TYPE: &str = "audio/mpeg";

impl CatalogService {
    /// Store an mp3 and create its song record, uploaded by `acting_user`.
    ///
    /// The file type, size and metadata are all checked before anything is
    /// written. The blob is stored first and no database lock is held while
    /// it uploads; if the record then cannot be created the blob is removed.
    ///
    /// # Errors
    /// - `InvalidInput` for a non-mp3 file, an oversized file or bad metadata
    /// - `Storage` if the blob cannot be written
    pub async fn upload_song(&self, acting_user: UserId, upload: UploadSong) -> Result<SongView> {
        let uploader = self.resolver.user(acting_user).await?;

        let is_mp3 = Path::new(&upload.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(UPLOAD_EXTENSION));
        if !is_mp3 {
            return Err(CoreError::invalid_input("file", "Only mp3 files can be uploaded"));
        }

        let size = upload.data.len() as u64;
        if size > self.settings.max_upload_bytes {
            return Err(CoreError::invalid_input(
                "file",
                format!(
                    "File is {} bytes; the limit is {} bytes",
                    size, self.settings.max_upload_bytes
                ),
            ));
        }

        let new_song = NewSong {
            title: upload.title,
            artist: upload.artist,
            genre: upload.genre,
            description: upload.description,
            uploaded_at: self.now(),
            storage_key: format!("{}/{}.{}", UPLOAD_PREFIX, Uuid::new_v4(), UPLOAD_EXTENSION),
            uploader_id: uploader.id,
        };
        new_song.validate()?;

        self.blobs
            .put(&new_song.storage_key, upload.data, UPLOAD_CONTENT_TYPE)
            .await?;

        let song = match self.repos.songs.insert(&new_song).await {
            Ok(song) => song,
            Err(e) => {
                self.discard_blob(&new_song.storage_key).await;
                return Err(e.into());
            }
        };

        info!(
            song_id = %song.id,
            user_id = %uploader.id,
            size_bytes = size,
            "Song uploaded"
        );
        Ok(song_view(&song, &uploader))
    }

    /// Replace a song's title, artist, genre and description. Uploader only.
    pub async fn edit_song(
        &self,
        acting_user: UserId,
        song_id: SongId,
        edit: EditSong,
    ) -> Result<SongView> {
        let user = self.resolver.user(acting_user).await?;
        let mut song = self.resolver.song(song_id).await?;

        validation::validate_title(&edit.title)?;
        validation::validate_artist(&edit.artist)?;
        validation::validate_genre(&edit.genre)?;
        ensure_owner(&song, user.id, "edit it")?;

        song.title = edit.title;
        song.artist = edit.artist;
        song.genre = edit.genre;
        song.description = edit.description;
        self.repos.songs.update_metadata(&song).await?;

        info!(song_id = %song.id, user_id = %user.id, "Song edited");
        Ok(song_view(&song, &user))
    }

    /// Delete a song and its stored audio. Uploader only.
    ///
    /// The blob goes first, so a failed blob delete keeps the record.
    pub async fn delete_song(&self, acting_user: UserId, song_id: SongId) -> Result<SongDeleted> {
        let user = self.resolver.user(acting_user).await?;
        let song = self.resolver.song(song_id).await?;
        ensure_owner(&song, user.id, "delete it")?;

        self.blobs.delete(&song.storage_key).await?;
        let deleted = self.repos.songs.delete(song.id).await?;

        if !deleted {
            return Err(CoreError::not_found("Song", song.id));
        }

        info!(song_id = %song.id, user_id = %user.id, "Song deleted");
        Ok(SongDeleted {
            message: "Song deleted successfully!".to_string(),
            song_id: song.id,
        })
    }

    async fn discard_blob(&self, storage_key: &str) {
        if let Err(e) = self.blobs.delete(storage_key).await {
            warn!(
                error = %e,
                storage_key = %storage_key,
                "Failed to remove blob of rejected upload"
            );
        }
    }

    pub async fn get_song(&self, song_id: SongId) -> Result<SongView> {
        let song = self.resolver.song(song_id).await?;
        let uploader = self.resolver.user(song.uploader_id).await?;
        Ok(song_view(&song, &uploader))
    }

    /// Song with its like, dislike and comment counts.
    pub async fn get_song_info(&self, song_id: SongId) -> Result<SongInfo> {
        self.queries
            .ranked_song(song_id)
            .await?
            .map(SongInfo::from)
            .ok_or_else(|| CoreError::not_found("Song", song_id))
    }

    /// Full audio of a song.
    pub async fn download_song(&self, song_id: SongId) -> Result<Bytes> {
        let song = self.resolver.song(song_id).await?;
        self.blobs
            .get(&song.storage_key)
            .await
            .map_err(|e| CoreError::from_blob_read(e, &song.storage_key))
    }

    /// Comment on a song as `acting_user`.
    pub async fn add_comment(
        &self,
        acting_user: UserId,
        song_id: SongId,
        text: &str,
    ) -> Result<CommentView> {
        let author = self.resolver.user(acting_user).await?;
        let song = self.resolver.song(song_id).await?;

        let comment = self
            .repos
            .comments
            .insert(&NewComment {
                author_id: author.id,
                song_id: song.id,
                created_at: self.now(),
                text: text.to_string(),
            })
            .await?;

        info!(comment_id = %comment.id, song_id = %song.id, user_id = %author.id, "Comment added");
        Ok(CommentView::new(&comment, &author))
    }

    /// Comments on a song, oldest first.
    pub async fn list_comments(&self, song_id: SongId) -> Result<Vec<CommentView>> {
        let song = self.resolver.song(song_id).await?;
        let comments = self.repos.comments.list_for_song(song.id).await?;

        let author_ids: Vec<UserId> = comments.iter().map(|c| c.author_id).collect();
        let authors = self.users_by_id(&author_ids).await?;

        comments
            .iter()
            .map(|comment| {
                authors
                    .get(&comment.author_id)
                    .map(|author| CommentView::new(comment, author))
                    .ok_or_else(|| CoreError::not_found("User", comment.author_id))
            })
            .collect()
    }

    /// Attach uploader summaries to songs, loading each uploader once.
    pub(crate) async fn song_views(&self, songs: Vec<Song>) -> Result<Vec<SongView>> {
        let uploader_ids: Vec<UserId> = songs.iter().map(|s| s.uploader_id).collect();
        let uploaders = self.users_by_id(&uploader_ids).await?;

        songs
            .iter()
            .map(|song| {
                uploaders
                    .get(&song.uploader_id)
                    .map(|uploader| song_view(song, uploader))
                    .ok_or_else(|| CoreError::not_found("User", song.uploader_id))
            })
            .collect()
    }

    async fn users_by_id(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>> {
        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();

        let users = self.repos.users.find_many(&unique).await?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }
}

fn song_view(song: &Song, uploader: &User) -> SongView {
    SongView {
        song: SongSummary::from(song),
        uploader: UserSummary::from(uploader),
    }
}
