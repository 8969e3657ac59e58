//! Playlist repository trait and implementation

use crate::error::Result;
use crate::models::{NewPlaylist, Playlist, PlaylistId, Song, SongId};
use crate::repositories::{contains_pattern, Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Playlist repository interface for data access operations
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Find a playlist by its id
    async fn find_by_id(&self, id: PlaylistId) -> Result<Option<Playlist>>;

    /// Find a playlist by its exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<Playlist>>;

    /// Insert a new playlist
    ///
    /// # Errors
    /// `Conflict` if the name is already taken
    async fn insert(&self, playlist: &NewPlaylist) -> Result<Playlist>;

    /// Delete a playlist and its membership rows
    ///
    /// # Returns
    /// - `Ok(true)` if playlist was deleted
    /// - `Ok(false)` if playlist was not found
    async fn delete(&self, id: PlaylistId) -> Result<bool>;

    /// Page through playlists ordered by name
    async fn query(&self, page_request: PageRequest) -> Result<Page<Playlist>>;

    /// Playlists whose name contains `fragment`, ignoring ASCII case
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Playlist>>;

    /// Playlists whose owner's username contains `fragment`, ignoring ASCII case
    async fn search_by_owner_username(&self, fragment: &str) -> Result<Vec<Playlist>>;

    /// Append a song at the end of the playlist
    ///
    /// # Errors
    /// `Conflict` if the song is already a member
    async fn add_song(&self, playlist_id: PlaylistId, song_id: SongId, added_at: i64) -> Result<()>;

    /// Remove a song from the playlist
    ///
    /// # Returns
    /// `Ok(false)` if the song was not a member
    async fn remove_song(&self, playlist_id: PlaylistId, song_id: SongId) -> Result<bool>;

    /// Member song ids in playlist order
    async fn song_ids(&self, playlist_id: PlaylistId) -> Result<Vec<SongId>>;

    /// Member songs in playlist order
    async fn songs(&self, playlist_id: PlaylistId) -> Result<Vec<Song>>;

    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of PlaylistRepository
pub struct SqlitePlaylistRepository {
    pool: SqlitePool,
}

impl SqlitePlaylistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistRepository for SqlitePlaylistRepository {
    async fn find_by_id(&self, id: PlaylistId) -> Result<Option<Playlist>> {
        let playlist = query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(playlist)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Playlist>> {
        let playlist = query_as::<_, Playlist>("SELECT * FROM playlists WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(playlist)
    }

    async fn insert(&self, playlist: &NewPlaylist) -> Result<Playlist> {
        let stored = query_as::<_, Playlist>(
            r#"
            INSERT INTO playlists (name, created_at, owner_id)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&playlist.name)
        .bind(playlist.created_at)
        .bind(playlist.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn delete(&self, id: PlaylistId) -> Result<bool> {
        // playlist_songs rows cascade
        let result = query("DELETE FROM playlists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query(&self, page_request: PageRequest) -> Result<Page<Playlist>> {
        let total = self.count().await?;

        let playlists = query_as::<_, Playlist>(
            "SELECT * FROM playlists ORDER BY name ASC, id ASC LIMIT ? OFFSET ?",
        )
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(playlists, total as u64, page_request))
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Playlist>> {
        let playlists = query_as::<_, Playlist>(
            "SELECT * FROM playlists WHERE name LIKE ? ESCAPE '\\' ORDER BY name ASC, id ASC",
        )
        .bind(contains_pattern(fragment))
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    async fn search_by_owner_username(&self, fragment: &str) -> Result<Vec<Playlist>> {
        let playlists = query_as::<_, Playlist>(
            r#"
            SELECT p.* FROM playlists p
            JOIN users u ON u.id = p.owner_id
            WHERE u.username LIKE ? ESCAPE '\'
            ORDER BY p.name ASC, p.id ASC
            "#,
        )
        .bind(contains_pattern(fragment))
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    async fn add_song(&self, playlist_id: PlaylistId, song_id: SongId, added_at: i64) -> Result<()> {
        // Single statement, so position and membership are decided atomically;
        // the primary key turns a duplicate into a Conflict.
        query(
            r#"
            INSERT INTO playlist_songs (playlist_id, song_id, position, added_at)
            SELECT ?, ?, COALESCE(MAX(position), -1) + 1, ?
            FROM playlist_songs WHERE playlist_id = ?
            "#,
        )
        .bind(playlist_id)
        .bind(song_id)
        .bind(added_at)
        .bind(playlist_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_song(&self, playlist_id: PlaylistId, song_id: SongId) -> Result<bool> {
        let result = query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
            .bind(playlist_id)
            .bind(song_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn song_ids(&self, playlist_id: PlaylistId) -> Result<Vec<SongId>> {
        let song_ids = query_as::<_, (SongId,)>(
            "SELECT song_id FROM playlist_songs WHERE playlist_id = ? ORDER BY position ASC",
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(|(id,)| id).collect())?;

        Ok(song_ids)
    }

    async fn songs(&self, playlist_id: PlaylistId) -> Result<Vec<Song>> {
        let songs = query_as::<_, Song>(
            r#"
            SELECT s.* FROM playlist_songs ps
            JOIN songs s ON s.id = ps.song_id
            WHERE ps.playlist_id = ?
            ORDER BY ps.position ASC
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_as("SELECT COUNT(*) as count FROM playlists")
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use crate::repositories::test_support;
    use crate::LibraryError;

    fn new_playlist(name: &str, owner_id: UserId) -> NewPlaylist {
        NewPlaylist::new(name, owner_id, 100).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_playlist() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let repo = SqlitePlaylistRepository::new(pool);

        let playlist = repo.insert(&new_playlist("Road Trip", alice.id)).await.unwrap();
        assert_eq!(playlist.owner_id, alice.id);
        assert_eq!(playlist.created_at, 100);

        assert_eq!(repo.find_by_id(playlist.id).await.unwrap(), Some(playlist.clone()));
        assert_eq!(repo.find_by_name("Road Trip").await.unwrap(), Some(playlist));
        assert!(repo.find_by_name("road trip").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let bob = test_support::user(&pool, "bob").await;
        let repo = SqlitePlaylistRepository::new(pool);

        repo.insert(&new_playlist("Chill", alice.id)).await.unwrap();
        let result = repo.insert(&new_playlist("Chill", bob.id)).await;

        assert!(matches!(result, Err(LibraryError::Conflict { .. })));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_membership_is_ordered_and_unique() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let first = test_support::song(&pool, "First", "Rock", alice.id, 1).await;
        let second = test_support::song(&pool, "Second", "Rock", alice.id, 2).await;
        let repo = SqlitePlaylistRepository::new(pool);
        let playlist = repo.insert(&new_playlist("Mix", alice.id)).await.unwrap();

        repo.add_song(playlist.id, second.id, 1).await.unwrap();
        repo.add_song(playlist.id, first.id, 2).await.unwrap();
        assert_eq!(repo.song_ids(playlist.id).await.unwrap(), vec![second.id, first.id]);

        let duplicate = repo.add_song(playlist.id, first.id, 3).await;
        assert!(matches!(duplicate, Err(LibraryError::Conflict { .. })));
        assert_eq!(repo.songs(playlist.id).await.unwrap().len(), 2);

        assert!(repo.remove_song(playlist.id, second.id).await.unwrap());
        assert!(!repo.remove_song(playlist.id, second.id).await.unwrap());
        assert_eq!(repo.song_ids(playlist.id).await.unwrap(), vec![first.id]);
    }

    #[tokio::test]
    async fn test_delete_cascades_membership() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let song = test_support::song(&pool, "Only", "Rock", alice.id, 1).await;
        let repo = SqlitePlaylistRepository::new(pool.clone());
        let playlist = repo.insert(&new_playlist("Temp", alice.id)).await.unwrap();
        repo.add_song(playlist.id, song.id, 1).await.unwrap();

        assert!(repo.delete(playlist.id).await.unwrap());
        assert!(!repo.delete(playlist.id).await.unwrap());

        let rows: (i64,) = query_as("SELECT COUNT(*) FROM playlist_songs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows.0, 0);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_partial_match() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let bob = test_support::user(&pool, "bobby").await;
        let repo = SqlitePlaylistRepository::new(pool);

        repo.insert(&new_playlist("Summer Hits", alice.id)).await.unwrap();
        repo.insert(&new_playlist("Winter Chill", bob.id)).await.unwrap();
        repo.insert(&new_playlist("Hits of Summer", bob.id)).await.unwrap();

        let names: Vec<_> = repo
            .search_by_name("SUMMER")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Hits of Summer", "Summer Hits"]);

        assert_eq!(repo.search_by_owner_username("BOB").await.unwrap().len(), 2);
        assert!(repo.search_by_name("autumn").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_pages_by_name() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let repo = SqlitePlaylistRepository::new(pool);
        for name in ["Charlie", "Alpha", "Bravo"] {
            repo.insert(&new_playlist(name, alice.id)).await.unwrap();
        }

        let page = repo.query(PageRequest::new(0, 2)).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Bravo"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
    }
}
