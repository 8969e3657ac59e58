//! Song repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::{NewSong, Song, SongId, UserId};
use crate::repositories::contains_pattern;
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Song repository interface for data access operations
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Find a song by its id
    async fn find_by_id(&self, id: SongId) -> Result<Option<Song>>;

    /// Insert a song with `listened_count = 0`
    ///
    /// # Errors
    /// - `InvalidInput` if title, artist or genre fail validation
    /// - `Conflict` if the storage key is already used
    async fn insert(&self, song: &NewSong) -> Result<Song>;

    /// Update title, artist, genre and description. Uploader, storage key,
    /// upload time and counters are never touched.
    ///
    /// # Errors
    /// `NotFound` if the song does not exist
    async fn update_metadata(&self, song: &Song) -> Result<()>;

    /// Delete a song; relation rows cascade.
    ///
    /// # Returns
    /// - `Ok(true)` if the song was deleted
    /// - `Ok(false)` if it did not exist
    async fn delete(&self, id: SongId) -> Result<bool>;

    /// Songs whose genre matches exactly, ignoring ASCII case
    async fn find_by_genre(&self, genre: &str) -> Result<Vec<Song>>;

    /// Songs uploaded by `uploader_id`
    async fn find_by_uploader(&self, uploader_id: UserId) -> Result<Vec<Song>>;

    /// Songs whose title contains `keyword`, ignoring ASCII case
    async fn search_by_title(&self, keyword: &str) -> Result<Vec<Song>>;

    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of SongRepository
pub struct SqliteSongRepository {
    pool: SqlitePool,
}

impl SqliteSongRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongRepository for SqliteSongRepository {
    async fn find_by_id(&self, id: SongId) -> Result<Option<Song>> {
        let song = query_as::<_, Song>("SELECT * FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(song)
    }

    async fn insert(&self, song: &NewSong) -> Result<Song> {
        song.validate()?;

        let stored = query_as::<_, Song>(
            r#"
            INSERT INTO songs (
                title, artist, genre, description, uploaded_at, storage_key,
                listened_count, uploader_id
            )
            VALUES (?, ?, ?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.genre)
        .bind(&song.description)
        .bind(song.uploaded_at)
        .bind(&song.storage_key)
        .bind(song.uploader_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn update_metadata(&self, song: &Song) -> Result<()> {
        song.validate()?;

        let result = query(
            r#"
            UPDATE songs
            SET title = ?, artist = ?, genre = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.genre)
        .bind(&song.description)
        .bind(song.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::not_found("Song", song.id));
        }

        Ok(())
    }

    async fn delete(&self, id: SongId) -> Result<bool> {
        let result = query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_genre(&self, genre: &str) -> Result<Vec<Song>> {
        let songs = query_as::<_, Song>(
            "SELECT * FROM songs WHERE genre = ? COLLATE NOCASE ORDER BY id ASC",
        )
        .bind(genre.trim())
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    async fn find_by_uploader(&self, uploader_id: UserId) -> Result<Vec<Song>> {
        let songs = query_as::<_, Song>("SELECT * FROM songs WHERE uploader_id = ? ORDER BY id ASC")
            .bind(uploader_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(songs)
    }

    async fn search_by_title(&self, keyword: &str) -> Result<Vec<Song>> {
        let songs = query_as::<_, Song>(
            "SELECT * FROM songs WHERE title LIKE ? ESCAPE '\\' ORDER BY id ASC",
        )
        .bind(contains_pattern(keyword))
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_as("SELECT COUNT(*) as count FROM songs")
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support;

    #[tokio::test]
    async fn test_insert_starts_with_zero_listens() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let repo = SqliteSongRepository::new(pool.clone());

        let song = repo
            .insert(&test_support::new_song("First Song", "Rock", alice.id, 10))
            .await
            .unwrap();

        assert_eq!(song.listened_count, 0);
        assert_eq!(song.uploader_id, alice.id);
        assert_eq!(repo.find_by_id(song.id).await.unwrap(), Some(song));
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_title() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let repo = SqliteSongRepository::new(pool.clone());

        let result = repo
            .insert(&test_support::new_song("", "Rock", alice.id, 10))
            .await;

        assert!(matches!(result, Err(LibraryError::InvalidInput { .. })));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_storage_key_conflicts() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let repo = SqliteSongRepository::new(pool.clone());
        let first = test_support::new_song("Twin", "Rock", alice.id, 10);
        repo.insert(&first).await.unwrap();

        let result = repo.insert(&first).await;

        assert!(matches!(result, Err(LibraryError::Conflict { .. })));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_and_reports_missing() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let song = test_support::song(&pool, "Gone Soon", "Rock", alice.id, 10).await;
        let repo = SqliteSongRepository::new(pool.clone());
        query("INSERT INTO song_likes (user_id, song_id, created_at) VALUES (?, ?, 0)")
            .bind(alice.id)
            .bind(song.id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(repo.delete(song.id).await.unwrap());
        assert!(repo.find_by_id(song.id).await.unwrap().is_none());
        let (likes,): (i64,) = query_as("SELECT COUNT(*) FROM song_likes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(likes, 0);

        assert!(!repo.delete(song.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_metadata_keeps_uploader_and_counters() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let repo = SqliteSongRepository::new(pool.clone());
        let mut song = test_support::song(&pool, "Old Title", "Rock", alice.id, 10).await;

        song.title = "New Title".to_string();
        song.description = Some("remastered".to_string());
        song.listened_count = 99;
        repo.update_metadata(&song).await.unwrap();

        let stored = repo.find_by_id(song.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "New Title");
        assert_eq!(stored.description.as_deref(), Some("remastered"));
        assert_eq!(stored.listened_count, 0);
        assert_eq!(stored.uploader_id, alice.id);

        song.id = SongId(404);
        assert!(matches!(
            repo.update_metadata(&song).await,
            Err(LibraryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_lookup_queries() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let bob = test_support::user(&pool, "bob").await;
        let repo = SqliteSongRepository::new(pool.clone());

        test_support::song(&pool, "Morning Rain", "Jazz", alice.id, 1).await;
        test_support::song(&pool, "rainy Night", "Rock", bob.id, 2).await;
        test_support::song(&pool, "Sunshine", "jazz", bob.id, 3).await;

        let jazz = repo.find_by_genre("JAZZ").await.unwrap();
        assert_eq!(jazz.len(), 2);

        let bobs = repo.find_by_uploader(bob.id).await.unwrap();
        assert_eq!(bobs.len(), 2);

        let rain: Vec<_> = repo
            .search_by_title("RAIN")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(rain, vec!["Morning Rain", "rainy Night"]);

        assert!(repo.search_by_title("100%").await.unwrap().is_empty());
    }
}
