//! Song lookups, filtered listings and ranked top-N queries.

use crate::error::{CoreError, Result};
use crate::projection::{RankedSong, SongSummary, SongView};
use crate::requests::SongFilterRequest;
use crate::CatalogService;
use core_library::models::{Song, UserId};
use core_library::query::{RankMetric, SongFilter, SongSortField, SortDirection};
use core_library::repositories::{Page, PageRequest, ReactionKind};
use tracing::debug;

impl CatalogService {
    /// Songs of exactly this genre, ignoring case.
    ///
    /// # Errors
    /// `NotFound` when no song has the genre
    pub async fn search_by_genre(&self, genre: &str) -> Result<Vec<SongSummary>> {
        let songs = self.repos.songs.find_by_genre(genre).await?;
        non_empty(songs, "genre", genre)
    }

    /// Songs whose title contains `keyword`, ignoring case. An empty result
    /// is not an error.
    pub async fn search_by_title(&self, keyword: &str) -> Result<Vec<SongSummary>> {
        let songs = self.repos.songs.search_by_title(keyword.trim()).await?;
        Ok(songs.iter().map(SongSummary::from).collect())
    }

    /// Songs uploaded by `user_id`.
    ///
    /// # Errors
    /// `NotFound` if the user does not exist or has uploaded nothing
    pub async fn search_by_uploader(&self, user_id: UserId) -> Result<Vec<SongSummary>> {
        let uploader = self.resolver.user(user_id).await?;
        let songs = self.repos.songs.find_by_uploader(uploader.id).await?;
        non_empty(songs, "uploader", &uploader.username)
    }

    /// Songs liked by the user named `username`, most recent like first.
    ///
    /// # Errors
    /// `NotFound` if the user does not exist or has liked nothing
    pub async fn search_liked_songs_by_user(&self, username: &str) -> Result<Vec<SongSummary>> {
        let user = self.resolver.user_by_username(username.trim()).await?;
        let songs = self
            .repos
            .reactions
            .songs_for_user(ReactionKind::Like, user.id)
            .await?;
        non_empty(songs, "liked by", &user.username)
    }

    /// Title-filtered listing ranked by a derived metric.
    ///
    /// `filter_by` defaults to `likes` and `order_by` to `asc`; both are
    /// matched case-insensitively. Page 0 is treated as page 1.
    ///
    /// # Errors
    /// `InvalidInput` if the title is missing or either key is unknown
    pub async fn filter_songs(&self, request: SongFilterRequest) -> Result<Page<RankedSong>> {
        let title = request
            .title
            .ok_or_else(|| CoreError::invalid_input("title", "A title to filter by is required"))?;
        let metric = match request.filter_by.as_deref() {
            Some(value) => value.parse::<RankMetric>()?,
            None => RankMetric::Likes,
        };
        let direction = match request.order_by.as_deref() {
            Some(value) => value.parse::<SortDirection>()?,
            None => SortDirection::Asc,
        };

        let filter = SongFilter {
            title: title.trim().to_string(),
            metric,
            direction,
        };
        let page = self
            .queries
            .filter_songs(&filter, self.ranked_page(request.page))
            .await?;
        Ok(page.map(RankedSong::from))
    }

    /// Songs of the most listened genre, most played first.
    pub async fn top_genre_songs(&self, page: u32) -> Result<Page<RankedSong>> {
        let page = self.queries.top_genre(self.ranked_page(page)).await?;
        Ok(page.map(RankedSong::from))
    }

    /// Songs of the genre `user_id` liked most, most liked first. Empty when
    /// the user has liked nothing.
    pub async fn top_genre_songs_for_user(
        &self,
        user_id: UserId,
        page: u32,
    ) -> Result<Page<RankedSong>> {
        let user = self.resolver.user(user_id).await?;
        let page = self
            .queries
            .top_genre_for_user(user.id, self.ranked_page(page))
            .await?;
        Ok(page.map(RankedSong::from))
    }

    /// All songs, most played first.
    pub async fn top_listened(&self, page: u32) -> Result<Page<RankedSong>> {
        let page = self.queries.top_listened(self.ranked_page(page)).await?;
        Ok(page.map(RankedSong::from))
    }

    /// All songs sorted ascending by `sort_by`. `offset` is the 0-based page.
    ///
    /// # Errors
    /// `InvalidInput` for an unknown sort field or a page size outside 1..=100
    pub async fn sort_songs_with_pagination(
        &self,
        offset: u32,
        page_size: u32,
        sort_by: &str,
    ) -> Result<Page<SongView>> {
        let sort_by = sort_by.parse::<SongSortField>()?;
        self.list_song_views(None, offset, page_size, sort_by, SortDirection::Asc)
            .await
    }

    /// Songs whose title, artist or genre contains `keyword`, sorted by
    /// `sort_by`. `direction` is ascending for `asc` in any case and
    /// descending otherwise.
    pub async fn search_songs(
        &self,
        keyword: &str,
        offset: u32,
        page_size: u32,
        sort_by: &str,
        direction: &str,
    ) -> Result<Page<SongView>> {
        let sort_by = sort_by.parse::<SongSortField>()?;
        let direction = SortDirection::lenient(direction);
        self.list_song_views(Some(keyword), offset, page_size, sort_by, direction)
            .await
    }

    async fn list_song_views(
        &self,
        keyword: Option<&str>,
        offset: u32,
        page_size: u32,
        sort_by: SongSortField,
        direction: SortDirection,
    ) -> Result<Page<SongView>> {
        let request = PageRequest::new(offset, page_size).validated()?;
        debug!(?keyword, ?sort_by, %direction, page = offset, page_size, "Listing songs");

        let (songs, meta) = self
            .queries
            .list_songs(keyword, sort_by, direction, request)
            .await?
            .into_parts();
        let views = self.song_views(songs).await?;
        Ok(meta.with_items(views))
    }

    fn ranked_page(&self, page: u32) -> PageRequest {
        PageRequest::from_one_based(page, self.settings.songs_per_page)
    }
}

fn non_empty(songs: Vec<Song>, criterion: &str, value: &str) -> Result<Vec<SongSummary>> {
    if songs.is_empty() {
        return Err(CoreError::not_found("Song", format!("{} {:?}", criterion, value)));
    }
    Ok(songs.iter().map(SongSummary::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn test_filter_by_dislikes_descending() {
        let service = test_support::service(test_support::permissive_blobs()).await;
        let alice = test_support::user(&service, "alice").await;
        let mut voters = Vec::new();
        for name in ["v1", "v2", "v3", "v4", "v5"] {
            voters.push(test_support::user(&service, name).await);
        }
        // "Song 0".."Song 5" get 0..5 dislikes; "Other" never matches
        let mut ids = Vec::new();
        for n in 0..6 {
            let view = test_support::song(&service, &alice, &format!("Song {}", n), "Pop").await;
            for voter in voters.iter().take(n) {
                service.dislike_song(voter.id, view.song.id).await.unwrap();
            }
            ids.push(view.song.id);
        }
        test_support::song(&service, &alice, "Other", "Pop").await;

        let page = service
            .filter_songs(SongFilterRequest {
                title: Some("song".to_string()),
                filter_by: Some("dislikes".to_string()),
                order_by: Some("desc".to_string()),
                page: 1,
            })
            .await
            .unwrap();

        assert_eq!(page.total, 6);
        assert_eq!(page.items.len(), 5);
        let counts: Vec<_> = page.items.iter().map(|s| s.dislikes).collect();
        assert_eq!(counts, vec![5, 4, 3, 2, 1]);

        let second = service
            .filter_songs(SongFilterRequest {
                title: Some("song".to_string()),
                filter_by: Some("dislikes".to_string()),
                order_by: Some("desc".to_string()),
                page: 2,
            })
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].song.id, ids[0]);
    }

    #[tokio::test]
    async fn test_filter_rejects_unknown_keys_and_missing_title() {
        let service = test_support::service(test_support::permissive_blobs()).await;

        let missing_title = service.filter_songs(SongFilterRequest::default()).await;
        assert!(matches!(missing_title, Err(CoreError::InvalidInput { ref field, .. }) if field == "title"));

        let bad_metric = service
            .filter_songs(SongFilterRequest {
                title: Some("x".to_string()),
                filter_by: Some("popularity".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(bad_metric, Err(CoreError::InvalidInput { ref field, .. }) if field == "filter_by"));

        let bad_direction = service
            .filter_songs(SongFilterRequest {
                title: Some("x".to_string()),
                order_by: Some("sideways".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(bad_direction, Err(CoreError::InvalidInput { ref field, .. }) if field == "order_by"));
    }

    #[tokio::test]
    async fn test_lookups_by_genre_uploader_and_likes() {
        let service = test_support::service(test_support::permissive_blobs()).await;
        let alice = test_support::user(&service, "alice").await;
        let bob = test_support::user(&service, "bob").await;
        let jazz = test_support::song(&service, &alice, "Blue Note", "Jazz").await;
        test_support::song(&service, &alice, "Loud", "Rock").await;

        let by_genre = service.search_by_genre("jazz").await.unwrap();
        assert_eq!(by_genre.len(), 1);
        assert_eq!(by_genre[0].id, jazz.song.id);
        assert!(matches!(
            service.search_by_genre("Polka").await,
            Err(CoreError::NotFound { .. })
        ));

        assert_eq!(service.search_by_uploader(alice.id).await.unwrap().len(), 2);
        assert!(matches!(
            service.search_by_uploader(bob.id).await,
            Err(CoreError::NotFound { .. })
        ));

        assert!(service.search_liked_songs_by_user("bob").await.is_err());
        service.like_song(bob.id, jazz.song.id).await.unwrap();
        let liked = service.search_liked_songs_by_user("bob").await.unwrap();
        assert_eq!(liked[0].title, "Blue Note");

        assert!(service.search_by_title("nothing here").await.unwrap().is_empty());
        assert_eq!(service.search_by_title("LOU").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_top_genre_and_top_listened() {
        let service = test_support::service(test_support::streaming_blobs()).await;
        let alice = test_support::user(&service, "alice").await;
        let bob = test_support::user(&service, "bob").await;
        let rock = test_support::song(&service, &alice, "Riff", "Rock").await;
        let pop = test_support::song(&service, &alice, "Hook", "Pop").await;
        for _ in 0..3 {
            service.play_song(rock.song.id, None).await.unwrap();
        }
        service.play_song(pop.song.id, None).await.unwrap();
        service.like_song(bob.id, pop.song.id).await.unwrap();

        let top = service.top_genre_songs(1).await.unwrap();
        assert_eq!(top.items.len(), 1);
        assert_eq!(top.items[0].song.genre, "Rock");

        let for_bob = service.top_genre_songs_for_user(bob.id, 1).await.unwrap();
        assert_eq!(for_bob.items[0].song.genre, "Pop");
        let for_alice = service.top_genre_songs_for_user(alice.id, 1).await.unwrap();
        assert!(for_alice.items.is_empty());

        let listened = service.top_listened(0).await.unwrap();
        let order: Vec<_> = listened.items.iter().map(|s| s.song.id).collect();
        assert_eq!(order, vec![rock.song.id, pop.song.id]);
    }

    #[tokio::test]
    async fn test_sort_and_search_with_pagination() {
        let service = test_support::service(test_support::permissive_blobs()).await;
        let alice = test_support::user(&service, "alice").await;
        test_support::song(&service, &alice, "Charlie", "Pop").await;
        test_support::song(&service, &alice, "alpha", "Rock").await;
        test_support::song(&service, &alice, "Bravo", "Pop").await;

        let sorted = service.sort_songs_with_pagination(0, 2, "title").await.unwrap();
        let titles: Vec<_> = sorted.items.iter().map(|s| s.song.title.as_str()).collect();
        assert_eq!(titles, vec!["alpha", "Bravo"]);
        assert!(sorted.has_next());

        let found = service.search_songs("pop", 0, 10, "title", "DESC").await.unwrap();
        let titles: Vec<_> = found.items.iter().map(|s| s.song.title.as_str()).collect();
        assert_eq!(titles, vec!["Charlie", "Bravo"]);
        assert_eq!(found.items[0].uploader.username, "alice");

        assert!(matches!(
            service.sort_songs_with_pagination(0, 2, "mood").await,
            Err(CoreError::InvalidInput { .. })
        ));
        assert!(service.search_songs("pop", 0, 101, "title", "asc").await.is_err());
    }
}
