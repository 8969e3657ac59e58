//! Comment repository trait and implementation

use crate::error::Result;
use crate::models::{Comment, NewComment, SongId};
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a validated comment
    ///
    /// # Errors
    /// `InvalidInput` if the text is blank or longer than 500 characters
    async fn insert(&self, comment: &NewComment) -> Result<Comment>;

    /// Comments on a song in creation order
    async fn list_for_song(&self, song_id: SongId) -> Result<Vec<Comment>>;

    async fn count_for_song(&self, song_id: SongId) -> Result<i64>;
}

pub struct SqliteCommentRepository {
    pool: SqlitePool,
}

impl SqliteCommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn insert(&self, comment: &NewComment) -> Result<Comment> {
        comment.validate()?;

        let stored = query_as::<_, Comment>(
            r#"
            INSERT INTO comments (author_id, song_id, created_at, text)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(comment.author_id)
        .bind(comment.song_id)
        .bind(comment.created_at)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn list_for_song(&self, song_id: SongId) -> Result<Vec<Comment>> {
        let comments = query_as::<_, Comment>(
            "SELECT * FROM comments WHERE song_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(song_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn count_for_song(&self, song_id: SongId) -> Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM comments WHERE song_id = ?")
            .bind(song_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
