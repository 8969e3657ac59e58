//! Play counters: the song's aggregate `listened_count` and the per-user
//! `listened` table.

use crate::error::{LibraryError, Result};
use crate::models::{Listened, SongId, UserId};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Value a per-user listen record starts at on its first play. Later plays
/// add one. The asymmetry is kept for compatibility with existing counters.
pub const FIRST_PLAY_LISTEN_COUNT: i64 = 2;

/// Counters after a play was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayRecord {
    pub listened_count: i64,
    /// `None` for anonymous plays
    pub user_listens: Option<i64>,
}

#[async_trait]
pub trait ListenRepository: Send + Sync {
    async fn find(&self, user_id: UserId, song_id: SongId) -> Result<Option<Listened>>;

    /// Bump the song's aggregate counter and, when `user_id` is given, the
    /// caller's listen record, in one transaction.
    ///
    /// # Errors
    /// `NotFound` if the song does not exist
    async fn record_play(&self, song_id: SongId, user_id: Option<UserId>) -> Result<PlayRecord>;

    /// Number of per-user listen records for a song
    async fn listener_count(&self, song_id: SongId) -> Result<i64>;
}

pub struct SqliteListenRepository {
    pool: SqlitePool,
}

impl SqliteListenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListenRepository for SqliteListenRepository {
    async fn find(&self, user_id: UserId, song_id: SongId) -> Result<Option<Listened>> {
        let listened = query_as::<_, Listened>(
            "SELECT * FROM listened WHERE user_id = ? AND song_id = ?",
        )
        .bind(user_id)
        .bind(song_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listened)
    }

    async fn record_play(&self, song_id: SongId, user_id: Option<UserId>) -> Result<PlayRecord> {
        let mut tx = self.pool.begin().await?;

        let listened_count: Option<(i64,)> = query_as(
            "UPDATE songs SET listened_count = listened_count + 1 WHERE id = ? RETURNING listened_count",
        )
        .bind(song_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((listened_count,)) = listened_count else {
            tx.rollback().await?;
            return Err(LibraryError::not_found("Song", song_id));
        };

        let user_listens = match user_id {
            Some(user_id) => {
                query(
                    r#"
                    INSERT INTO listened (user_id, song_id, listened)
                    VALUES (?, ?, ?)
                    ON CONFLICT (user_id, song_id) DO UPDATE SET listened = listened + 1
                    "#,
                )
                .bind(user_id)
                .bind(song_id)
                .bind(FIRST_PLAY_LISTEN_COUNT)
                .execute(&mut *tx)
                .await?;

                let (listened,): (i64,) =
                    query_as("SELECT listened FROM listened WHERE user_id = ? AND song_id = ?")
                        .bind(user_id)
                        .bind(song_id)
                        .fetch_one(&mut *tx)
                        .await?;
                Some(listened)
            }
            None => None,
        };

        tx.commit().await?;

        Ok(PlayRecord {
            listened_count,
            user_listens,
        })
    }

    async fn listener_count(&self, song_id: SongId) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM listened WHERE song_id = ?")
            .bind(song_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support;

    #[tokio::test]
    async fn test_first_play_starts_at_two_then_increments() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let song = test_support::song(&pool, "Loop", "Pop", alice.id, 1).await;
        let repo = SqliteListenRepository::new(pool);

        let first = repo.record_play(song.id, Some(alice.id)).await.unwrap();
        assert_eq!(first.listened_count, 1);
        assert_eq!(first.user_listens, Some(FIRST_PLAY_LISTEN_COUNT));

        let second = repo.record_play(song.id, Some(alice.id)).await.unwrap();
        assert_eq!(second.listened_count, 2);
        assert_eq!(second.user_listens, Some(FIRST_PLAY_LISTEN_COUNT + 1));

        let record = repo.find(alice.id, song.id).await.unwrap().unwrap();
        assert_eq!(record.listened, FIRST_PLAY_LISTEN_COUNT + 1);
    }

    #[tokio::test]
    async fn test_anonymous_play_skips_user_record() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let song = test_support::song(&pool, "Loop", "Pop", alice.id, 1).await;
        let repo = SqliteListenRepository::new(pool);

        let record = repo.record_play(song.id, None).await.unwrap();
        assert_eq!(record, PlayRecord { listened_count: 1, user_listens: None });
        assert_eq!(repo.listener_count(song.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_play_of_missing_song_changes_nothing() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let repo = SqliteListenRepository::new(pool);

        let result = repo.record_play(SongId(77), Some(alice.id)).await;
        assert!(matches!(result, Err(LibraryError::NotFound { .. })));
        assert!(repo.find(alice.id, SongId(77)).await.unwrap().is_none());
    }
}
