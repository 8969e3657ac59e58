//! # Repository Pattern Implementation
//!
//! Repository traits and their SQLite implementations.
//!
//! ## Architecture
//!
//! - Traits define the interface for each repository and are object safe, so
//!   the service layer holds them as `Arc<dyn ...>`
//! - SQLite implementations use sqlx for async database access
//! - Operations touching more than one row run inside a single transaction
//!
//! ## Available Repositories
//!
//! - `UserRepository` - accounts (credentials stay inside this crate)
//! - `SongRepository` - songs, with blob-coupled insert and delete
//! - `PlaylistRepository` - playlists and their membership set
//! - `ReactionRepository` - like and dislike sets
//! - `ListenRepository` - aggregate and per-user play counters
//! - `CommentRepository` - song comments

pub mod comment;
pub mod listen;
pub mod pagination;
pub mod playlist;
pub mod reaction;
pub mod song;
pub mod user;

pub use comment::{CommentRepository, SqliteCommentRepository};
pub use listen::{ListenRepository, PlayRecord, SqliteListenRepository, FIRST_PLAY_LISTEN_COUNT};
pub use pagination::{Page, PageMeta, PageRequest, MAX_PAGE_SIZE};
pub use playlist::{PlaylistRepository, SqlitePlaylistRepository};
pub use reaction::{ReactionKind, ReactionRepository, SqliteReactionRepository, ToggleOutcome};
pub use song::{SongRepository, SqliteSongRepository};
pub use user::{SqliteUserRepository, UserRepository};

/// Escapes `%`, `_` and `\` so user text matches literally inside a
/// `LIKE ... ESCAPE '\'` pattern, and wraps it for substring matching.
pub(crate) fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
