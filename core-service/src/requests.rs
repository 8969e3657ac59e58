//! Request payloads accepted by the catalog service.

use bytes::Bytes;
use serde::Deserialize;

/// A song upload. `file_name` is only used to check the extension.
#[derive(Debug, Clone)]
pub struct UploadSong {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub description: Option<String>,
    pub file_name: String,
    pub data: Bytes,
}

/// Replacement metadata for an existing song.
#[derive(Debug, Clone, Deserialize)]
pub struct EditSong {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub description: Option<String>,
}

/// Raw parameters of a filtered song listing, as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongFilterRequest {
    /// Required title fragment
    pub title: Option<String>,
    /// `likes` (default), `dislikes`, `upload_date`, `listened` or `comments`
    pub filter_by: Option<String>,
    /// `asc` (default) or `desc`
    pub order_by: Option<String>,
    /// 1-based page; 0 means the first page
    #[serde(default)]
    pub page: u32,
}
