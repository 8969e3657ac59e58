//! Like and dislike sets.
//!
//! Each reaction kind is a join table keyed by (user, song). Likes and
//! dislikes are independent sets; a user may hold both for the same song.

use crate::error::Result;
use crate::models::{Song, SongId, UserId};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl ReactionKind {
    fn table(self) -> &'static str {
        match self {
            ReactionKind::Like => "song_likes",
            ReactionKind::Dislike => "song_dislikes",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
        }
    }
}

/// Result of a single toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Whether the (user, song) pair is in the set after the toggle
    pub present: bool,
    /// Size of the song's set after the toggle
    pub count: i64,
}

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    async fn contains(&self, kind: ReactionKind, user_id: UserId, song_id: SongId) -> Result<bool>;

    /// Flip membership of (user, song) in the `kind` set and report the new
    /// state, atomically.
    async fn toggle(
        &self,
        kind: ReactionKind,
        user_id: UserId,
        song_id: SongId,
        at: i64,
    ) -> Result<ToggleOutcome>;

    /// Number of users holding `kind` for the song
    async fn count_for_song(&self, kind: ReactionKind, song_id: SongId) -> Result<i64>;

    /// Songs the user holds `kind` for, most recent reaction first
    async fn songs_for_user(&self, kind: ReactionKind, user_id: UserId) -> Result<Vec<Song>>;
}

pub struct SqliteReactionRepository {
    pool: SqlitePool,
}

impl SqliteReactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for SqliteReactionRepository {
    async fn contains(&self, kind: ReactionKind, user_id: UserId, song_id: SongId) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = ? AND song_id = ?)",
            kind.table()
        );
        let (exists,): (bool,) = query_as(&sql)
            .bind(user_id)
            .bind(song_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn toggle(
        &self,
        kind: ReactionKind,
        user_id: UserId,
        song_id: SongId,
        at: i64,
    ) -> Result<ToggleOutcome> {
        let table = kind.table();
        let mut tx = self.pool.begin().await?;

        let removed = query(&format!(
            "DELETE FROM {} WHERE user_id = ? AND song_id = ?",
            table
        ))
        .bind(user_id)
        .bind(song_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if !removed {
            query(&format!(
                "INSERT INTO {} (user_id, song_id, created_at) VALUES (?, ?, ?)",
                table
            ))
            .bind(user_id)
            .bind(song_id)
            .bind(at)
            .execute(&mut *tx)
            .await?;
        }

        let (count,): (i64,) =
            query_as(&format!("SELECT COUNT(*) FROM {} WHERE song_id = ?", table))
                .bind(song_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(ToggleOutcome {
            present: !removed,
            count,
        })
    }

    async fn count_for_song(&self, kind: ReactionKind, song_id: SongId) -> Result<i64> {
        let (count,): (i64,) = query_as(&format!(
            "SELECT COUNT(*) FROM {} WHERE song_id = ?",
            kind.table()
        ))
        .bind(song_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn songs_for_user(&self, kind: ReactionKind, user_id: UserId) -> Result<Vec<Song>> {
        let sql = format!(
            r#"
            SELECT s.* FROM {} r
            JOIN songs s ON s.id = r.song_id
            WHERE r.user_id = ?
            ORDER BY r.created_at DESC, s.id ASC
            "#,
            kind.table()
        );
        let songs = query_as::<_, Song>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support;

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let bob = test_support::user(&pool, "bob").await;
        let song = test_support::song(&pool, "Tune", "Pop", alice.id, 1).await;
        let repo = SqliteReactionRepository::new(pool);

        repo.toggle(ReactionKind::Like, bob.id, song.id, 5).await.unwrap();
        let before = repo.count_for_song(ReactionKind::Like, song.id).await.unwrap();

        let first = repo.toggle(ReactionKind::Like, alice.id, song.id, 6).await.unwrap();
        assert_eq!(first, ToggleOutcome { present: true, count: before + 1 });
        assert!(repo.contains(ReactionKind::Like, alice.id, song.id).await.unwrap());

        let second = repo.toggle(ReactionKind::Like, alice.id, song.id, 7).await.unwrap();
        assert_eq!(second, ToggleOutcome { present: false, count: before });
        assert!(!repo.contains(ReactionKind::Like, alice.id, song.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_like_and_dislike_are_independent() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let song = test_support::song(&pool, "Tune", "Pop", alice.id, 1).await;
        let repo = SqliteReactionRepository::new(pool);

        repo.toggle(ReactionKind::Like, alice.id, song.id, 1).await.unwrap();
        repo.toggle(ReactionKind::Dislike, alice.id, song.id, 2).await.unwrap();

        assert!(repo.contains(ReactionKind::Like, alice.id, song.id).await.unwrap());
        assert!(repo.contains(ReactionKind::Dislike, alice.id, song.id).await.unwrap());
        assert_eq!(repo.count_for_song(ReactionKind::Dislike, song.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_songs_for_user_most_recent_first() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let a = test_support::song(&pool, "Song A", "Pop", alice.id, 1).await;
        let b = test_support::song(&pool, "Song B", "Pop", alice.id, 2).await;
        let repo = SqliteReactionRepository::new(pool);

        repo.toggle(ReactionKind::Like, alice.id, a.id, 10).await.unwrap();
        repo.toggle(ReactionKind::Like, alice.id, b.id, 20).await.unwrap();

        let liked: Vec<_> = repo
            .songs_for_user(ReactionKind::Like, alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(liked, vec![b.id, a.id]);
        assert!(repo
            .songs_for_user(ReactionKind::Dislike, alice.id)
            .await
            .unwrap()
            .is_empty());
    }
}
