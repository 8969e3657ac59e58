//! Like and dislike toggles and play tracking.

use crate::error::{CoreError, Result};
use crate::projection::{PlaybackStream, ReactionOutcome};
use crate::CatalogService;
use core_library::models::{SongId, UserId};
use core_library::repositories::ReactionKind;
use tracing::{debug, info};

impl CatalogService {
    /// Flip `acting_user`'s like on a song. Calling twice restores the
    /// previous state.
    pub async fn like_song(&self, acting_user: UserId, song_id: SongId) -> Result<ReactionOutcome> {
        self.toggle_reaction(ReactionKind::Like, acting_user, song_id)
            .await
    }

    /// Flip `acting_user`'s dislike on a song. Independent of likes.
    pub async fn dislike_song(
        &self,
        acting_user: UserId,
        song_id: SongId,
    ) -> Result<ReactionOutcome> {
        self.toggle_reaction(ReactionKind::Dislike, acting_user, song_id)
            .await
    }

    async fn toggle_reaction(
        &self,
        kind: ReactionKind,
        acting_user: UserId,
        song_id: SongId,
    ) -> Result<ReactionOutcome> {
        let song = self.resolver.song(song_id).await?;
        let user = self.resolver.user(acting_user).await?;

        let outcome = self
            .repos
            .reactions
            .toggle(kind, user.id, song.id, self.now())
            .await?;

        let verb = if outcome.present { "accepted" } else { "removed" };
        info!(
            song_id = %song.id,
            user_id = %user.id,
            reaction = kind.as_str(),
            present = outcome.present,
            count = outcome.count,
            "Reaction toggled"
        );

        Ok(ReactionOutcome {
            message: format!("Your {} was successfully {}!", kind.as_str(), verb),
            count: outcome.count,
        })
    }

    /// Record a play and open the song's audio.
    ///
    /// The aggregate counter always increases; a resolvable `acting_user`
    /// also gets their listen record bumped. Counters are committed before
    /// the audio is opened, so they stay incremented even when the file is
    /// missing.
    ///
    /// # Errors
    /// - `NotFound` if the song or its audio file does not exist
    /// - `Storage` if the blob store fails
    pub async fn play_song(
        &self,
        song_id: SongId,
        acting_user: Option<UserId>,
    ) -> Result<PlaybackStream> {
        let song = self.resolver.song(song_id).await?;
        let listener = self.resolver.optional_user(acting_user).await?;
        if acting_user.is_some() && listener.is_none() {
            debug!(song_id = %song.id, "Unknown listener, recording anonymous play");
        }

        let record = self
            .repos
            .listens
            .record_play(song.id, listener.as_ref().map(|user| user.id))
            .await?;
        info!(
            song_id = %song.id,
            listened_count = record.listened_count,
            user_listens = ?record.user_listens,
            "Play recorded"
        );

        let blob = self
            .blobs
            .open_read_stream(&song.storage_key)
            .await
            .map_err(|e| CoreError::from_blob_read(e, &song.storage_key))?;

        Ok(PlaybackStream::new(song.id, blob))
    }
}
