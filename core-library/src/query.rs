//! Ranked and sorted song queries.
//!
//! Caller-supplied sort keys are parsed into closed enums, and each variant
//! maps to a fixed ORDER BY fragment. Free text never reaches the SQL
//! string. Every ordering ends with `s.id ASC` so equal ranks page
//! deterministically.

use crate::error::{LibraryError, Result};
use crate::models::{Song, SongId, UserId};
use crate::repositories::{contains_pattern, Page, PageRequest};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Aggregate a filtered listing is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RankMetric {
    #[default]
    Likes,
    Dislikes,
    UploadDate,
    Listened,
    Comments,
}

impl RankMetric {
    fn sort_expr(self) -> &'static str {
        match self {
            RankMetric::Likes => "likes",
            RankMetric::Dislikes => "dislikes",
            RankMetric::UploadDate => "s.uploaded_at",
            RankMetric::Listened => "s.listened_count",
            RankMetric::Comments => "comments",
        }
    }
}

impl FromStr for RankMetric {
    type Err = LibraryError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "likes" => Ok(RankMetric::Likes),
            "dislikes" => Ok(RankMetric::Dislikes),
            "upload_date" => Ok(RankMetric::UploadDate),
            "listened" => Ok(RankMetric::Listened),
            "comments" => Ok(RankMetric::Comments),
            other => Err(LibraryError::invalid_input(
                "filter_by",
                format!(
                    "unknown filter {:?}; expected likes, dislikes, upload_date, listened or comments",
                    other
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `asc` in any case is ascending; anything else is descending.
    pub fn lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = LibraryError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(LibraryError::invalid_input(
                "order_by",
                format!("unknown order {:?}; expected asc or desc", other),
            )),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

/// Stored column a generic song listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SongSortField {
    #[default]
    Id,
    Title,
    Artist,
    Genre,
    UploadDate,
    Listened,
}

impl SongSortField {
    fn column(self) -> &'static str {
        match self {
            SongSortField::Id => "s.id",
            SongSortField::Title => "s.title COLLATE NOCASE",
            SongSortField::Artist => "s.artist COLLATE NOCASE",
            SongSortField::Genre => "s.genre COLLATE NOCASE",
            SongSortField::UploadDate => "s.uploaded_at",
            SongSortField::Listened => "s.listened_count",
        }
    }
}

impl FromStr for SongSortField {
    type Err = LibraryError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(SongSortField::Id),
            "title" => Ok(SongSortField::Title),
            "artist" => Ok(SongSortField::Artist),
            "genre" => Ok(SongSortField::Genre),
            "upload_date" | "uploaded_at" => Ok(SongSortField::UploadDate),
            "listened" => Ok(SongSortField::Listened),
            other => Err(LibraryError::invalid_input(
                "sort_by",
                format!("unknown sort field {:?}", other),
            )),
        }
    }
}

/// Title-filtered ranked listing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongFilter {
    /// Substring the title must contain; empty matches every song
    pub title: String,
    pub metric: RankMetric,
    pub direction: SortDirection,
}

/// A song with its derived reaction and comment counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSongRow {
    pub song: Song,
    pub likes: i64,
    pub dislikes: i64,
    pub comments: i64,
}

impl<'r> FromRow<'r, SqliteRow> for RankedSongRow {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        Ok(Self {
            song: Song::from_row(row)?,
            likes: row.try_get("likes")?,
            dislikes: row.try_get("dislikes")?,
            comments: row.try_get("comments")?,
        })
    }
}

const RANKED_SELECT: &str = "SELECT s.*, \
    (SELECT COUNT(*) FROM song_likes l WHERE l.song_id = s.id) AS likes, \
    (SELECT COUNT(*) FROM song_dislikes d WHERE d.song_id = s.id) AS dislikes, \
    (SELECT COUNT(*) FROM comments c WHERE c.song_id = s.id) AS comments \
    FROM songs s";

const TOP_GENRE_BY_LISTENS: &str = "s.genre = (\
    SELECT genre FROM songs \
    GROUP BY genre \
    ORDER BY SUM(listened_count) DESC, genre ASC \
    LIMIT 1)";

const TOP_GENRE_BY_USER_LIKES: &str = "s.genre = (\
    SELECT liked.genre FROM song_likes ul \
    JOIN songs liked ON liked.id = ul.song_id \
    WHERE ul.user_id = ? \
    GROUP BY liked.genre \
    ORDER BY COUNT(*) DESC, liked.genre ASC \
    LIMIT 1)";

/// Read-only query service over the song catalog.
#[derive(Clone)]
pub struct SongQueryService {
    pool: SqlitePool,
}

impl SongQueryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Songs whose title contains `filter.title`, ranked by `filter.metric`.
    pub async fn filter_songs(
        &self,
        filter: &SongFilter,
        page_request: PageRequest,
    ) -> Result<Page<RankedSongRow>> {
        debug!(
            title = %filter.title,
            metric = ?filter.metric,
            direction = %filter.direction,
            page = page_request.page,
            "Filtering songs"
        );

        let spec = SongQuerySpec::ranked(
            Some("s.title LIKE ? ESCAPE '\\'"),
            vec![BindValue::Text(contains_pattern(&filter.title))],
            format!("{} {}", filter.metric.sort_expr(), filter.direction.sql()),
        );
        self.fetch_page(spec, page_request).await
    }

    /// Every song, most played first.
    pub async fn top_listened(&self, page_request: PageRequest) -> Result<Page<RankedSongRow>> {
        let spec = SongQuerySpec::ranked(None, Vec::new(), "s.listened_count DESC".to_string());
        self.fetch_page(spec, page_request).await
    }

    /// Songs of the genre with the most total listens, most played first.
    pub async fn top_genre(&self, page_request: PageRequest) -> Result<Page<RankedSongRow>> {
        let spec = SongQuerySpec::ranked(
            Some(TOP_GENRE_BY_LISTENS),
            Vec::new(),
            "s.listened_count DESC".to_string(),
        );
        self.fetch_page(spec, page_request).await
    }

    /// Songs of the genre `user_id` liked most, most liked first. Empty when
    /// the user has no likes.
    pub async fn top_genre_for_user(
        &self,
        user_id: UserId,
        page_request: PageRequest,
    ) -> Result<Page<RankedSongRow>> {
        let spec = SongQuerySpec::ranked(
            Some(TOP_GENRE_BY_USER_LIKES),
            vec![BindValue::I64(user_id.value())],
            "likes DESC".to_string(),
        );
        self.fetch_page(spec, page_request).await
    }

    /// One song with its derived counts.
    pub async fn ranked_song(&self, song_id: SongId) -> Result<Option<RankedSongRow>> {
        let sql = format!("{} WHERE s.id = ?", RANKED_SELECT);
        let row = sqlx::query_as::<_, RankedSongRow>(&sql)
            .bind(song_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Generic sorted listing. With a keyword, only songs whose title, artist
    /// or genre contains it are listed.
    pub async fn list_songs(
        &self,
        keyword: Option<&str>,
        sort_by: SongSortField,
        direction: SortDirection,
        page_request: PageRequest,
    ) -> Result<Page<Song>> {
        let (condition, binds) = match keyword {
            Some(keyword) => {
                let pattern = contains_pattern(keyword.trim());
                (
                    Some(
                        "(s.title LIKE ? ESCAPE '\\' OR s.artist LIKE ? ESCAPE '\\' OR s.genre LIKE ? ESCAPE '\\')",
                    ),
                    vec![
                        BindValue::Text(pattern.clone()),
                        BindValue::Text(pattern.clone()),
                        BindValue::Text(pattern),
                    ],
                )
            }
            None => (None, Vec::new()),
        };

        let spec = SongQuerySpec::build(
            "SELECT s.* FROM songs s",
            condition,
            binds,
            format!("{} {}", sort_by.column(), direction.sql()),
        );
        self.fetch_page(spec, page_request).await
    }

    async fn fetch_page<T>(&self, spec: SongQuerySpec, page_request: PageRequest) -> Result<Page<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut count_query = sqlx::query_as::<_, (i64,)>(&spec.count_sql);
        for bind in &spec.binds {
            count_query = match bind {
                BindValue::Text(value) => count_query.bind(value.as_str()),
                BindValue::I64(value) => count_query.bind(*value),
            };
        }
        let (total,) = count_query.fetch_one(&self.pool).await?;

        let paginated_sql = format!("{} LIMIT ? OFFSET ?", spec.select_sql);
        let mut select_query = sqlx::query_as::<_, T>(&paginated_sql);
        for bind in &spec.binds {
            select_query = match bind {
                BindValue::Text(value) => select_query.bind(value.as_str()),
                BindValue::I64(value) => select_query.bind(*value),
            };
        }
        let items = select_query
            .bind(page_request.limit())
            .bind(page_request.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total.max(0) as u64, page_request))
    }
}

#[derive(Debug, Clone)]
struct SongQuerySpec {
    select_sql: String,
    count_sql: String,
    binds: Vec<BindValue>,
}

impl SongQuerySpec {
    fn ranked(condition: Option<&str>, binds: Vec<BindValue>, order: String) -> Self {
        Self::build(RANKED_SELECT, condition, binds, order)
    }

    fn build(select: &str, condition: Option<&str>, binds: Vec<BindValue>, order: String) -> Self {
        let mut select_sql = String::from(select);
        let mut count_sql = String::from("SELECT COUNT(*) AS count FROM songs s");

        if let Some(condition) = condition {
            select_sql.push_str(" WHERE ");
            select_sql.push_str(condition);
            count_sql.push_str(" WHERE ");
            count_sql.push_str(condition);
        }

        select_sql.push_str(" ORDER BY ");
        select_sql.push_str(&order);
        select_sql.push_str(", s.id ASC");

        Self {
            select_sql,
            count_sql,
            binds,
        }
    }
}

#[derive(Debug, Clone)]
enum BindValue {
    Text(String),
    I64(i64),
}
