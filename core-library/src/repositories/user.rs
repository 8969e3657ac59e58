//! User repository trait and implementation

use crate::error::Result;
use crate::models::{NewUser, User, UserId};
use async_trait::async_trait;
use sqlx::{query_as, QueryBuilder, Sqlite, SqlitePool};

/// User repository interface. Accounts are created by the identity
/// collaborator; the catalog only reads them, apart from test fixtures and
/// host bootstrapping.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Find a user by exact username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Load every user whose id is in `ids`, in ascending id order.
    /// Unknown ids are skipped.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>>;

    /// Insert a new user and return the stored row
    ///
    /// # Errors
    /// `Conflict` if the username or email is already taken
    async fn insert(&self, user: &NewUser) -> Result<User>;

    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM users WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id ASC");

        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn insert(&self, user: &NewUser) -> Result<User> {
        let stored = query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_as("SELECT COUNT(*) as count FROM users")
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
    use crate::LibraryError;

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let pool = test_support::pool().await;
        let repo = SqliteUserRepository::new(pool.clone());

        let alice = test_support::user(&pool, "alice").await;
        assert_eq!(alice.username, "alice");

        let by_id = repo.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(by_id, alice);

        let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, alice.id);

        assert!(repo.find_by_username("bob").await.unwrap().is_none());
        assert!(repo.find_by_id(UserId(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let pool = test_support::pool().await;
        let repo = SqliteUserRepository::new(pool.clone());
        test_support::user(&pool, "alice").await;

        let result = repo
            .insert(&NewUser {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                password_hash: "x".to_string(),
                created_at: 0,
            })
            .await;

        assert!(matches!(result, Err(LibraryError::Conflict { .. })));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_many_skips_unknown_ids() {
        let pool = test_support::pool().await;
        let repo = SqliteUserRepository::new(pool.clone());
        let alice = test_support::user(&pool, "alice").await;
        let bob = test_support::user(&pool, "bob").await;

        let users = repo
            .find_many(&[bob.id, UserId(404), alice.id])
            .await
            .unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);

        assert!(repo.find_many(&[]).await.unwrap().is_empty());
    }
}
