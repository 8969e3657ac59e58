//! Catalog service façade and bootstrap helpers.
//!
//! [`CatalogService`] is the single entry point hosts call. Every operation
//! takes primitive or request-shaped input plus the acting user's id (already
//! authenticated by the host) and returns a read model from [`projection`]
//! or a [`CoreError`].
//!
//! Desktop hosts enable the `desktop-shims` feature and call
//! [`CatalogService::bootstrap`], which opens the database and wires the
//! filesystem blob store. Other hosts inject their own collaborators through
//! [`CatalogConfig`] or [`CatalogService::new`].

pub mod authorization;
pub mod error;
pub mod projection;
pub mod requests;

mod playlists;
mod reactions;
mod resolver;
mod search;
mod songs;

pub use authorization::{is_owner, Owned};
pub use error::{CoreError, Result};
pub use projection::{
    CommentView, PlaybackStream, PlaylistView, RankedSong, ReactionOutcome, SongDeleted, SongInfo,
    SongSummary, SongView, UserSummary,
};
pub use requests::{EditSong, SongFilterRequest, UploadSong};

pub use core_library::models::{CommentId, PlaylistId, SongId, UserId};
pub use core_library::repositories::Page;
pub use core_runtime::config::CatalogConfig;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::LocalBlobStore;

use bridge_traits::{BlobStore, Clock};
use core_library::db::{create_pool, DatabaseConfig};
use core_library::query::SongQueryService;
use core_library::repositories::{
    CommentRepository, ListenRepository, PlaylistRepository, ReactionRepository, SongRepository,
    SqliteCommentRepository, SqliteListenRepository, SqlitePlaylistRepository,
    SqliteReactionRepository, SqliteSongRepository, SqliteUserRepository, UserRepository,
};
use core_runtime::config::DEFAULT_SONGS_PER_PAGE;
use resolver::IdentityResolver;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// Aggregated handle to the persistence collaborators.
#[derive(Clone)]
pub struct CatalogRepositories {
    pub users: Arc<dyn UserRepository>,
    pub songs: Arc<dyn SongRepository>,
    pub playlists: Arc<dyn PlaylistRepository>,
    pub reactions: Arc<dyn ReactionRepository>,
    pub listens: Arc<dyn ListenRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl CatalogRepositories {
    /// SQLite-backed repositories sharing one pool.
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            users: Arc::new(SqliteUserRepository::new(pool.clone())),
            songs: Arc::new(SqliteSongRepository::new(pool.clone())),
            playlists: Arc::new(SqlitePlaylistRepository::new(pool.clone())),
            reactions: Arc::new(SqliteReactionRepository::new(pool.clone())),
            listens: Arc::new(SqliteListenRepository::new(pool.clone())),
            comments: Arc::new(SqliteCommentRepository::new(pool)),
        }
    }
}

/// Limits applied by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    pub max_upload_bytes: u64,
    pub songs_per_page: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: core_runtime::config::DEFAULT_MAX_UPLOAD_BYTES,
            songs_per_page: DEFAULT_SONGS_PER_PAGE,
        }
    }
}

impl From<&CatalogConfig> for CatalogSettings {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            songs_per_page: config.songs_per_page,
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CatalogService {
    repos: CatalogRepositories,
    queries: SongQueryService,
    resolver: IdentityResolver,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    settings: CatalogSettings,
}

impl CatalogService {
    /// Create a service from explicit collaborators.
    pub fn new(
        repos: CatalogRepositories,
        queries: SongQueryService,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        settings: CatalogSettings,
    ) -> Self {
        let resolver = IdentityResolver::new(
            Arc::clone(&repos.users),
            Arc::clone(&repos.songs),
            Arc::clone(&repos.playlists),
        );

        Self {
            repos,
            queries,
            resolver,
            blobs,
            clock,
            settings,
        }
    }

    /// Create a service over an already migrated pool.
    pub fn from_pool(
        pool: SqlitePool,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        settings: CatalogSettings,
    ) -> Self {
        Self::new(
            CatalogRepositories::sqlite(pool.clone()),
            SongQueryService::new(pool),
            blobs,
            clock,
            settings,
        )
    }

    /// Open the database described by `config`, apply migrations and wire
    /// the configured collaborators.
    pub async fn bootstrap(config: CatalogConfig) -> Result<Self> {
        config.validate()?;

        let pool = create_pool(
            DatabaseConfig::new(&config.database_path).max_connections(config.max_connections),
        )
        .await
        .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;

        info!(
            database_path = %config.database_path.display(),
            songs_per_page = config.songs_per_page,
            "Catalog service ready"
        );

        let settings = CatalogSettings::from(&config);
        Ok(Self::from_pool(
            pool,
            config.blob_store,
            config.clock,
            settings,
        ))
    }

    /// Persistence collaborators in use, for hosts that manage accounts.
    pub fn repositories(&self) -> &CatalogRepositories {
        &self.repos
    }

    pub fn settings(&self) -> CatalogSettings {
        self.settings
    }

    fn now(&self) -> i64 {
        self.clock.unix_timestamp()
    }
}
