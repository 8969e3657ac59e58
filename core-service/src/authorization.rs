//! Ownership checks shared by every song and playlist mutation.

use crate::error::{CoreError, Result};
use core_library::models::{Playlist, Song, UserId};
use tracing::warn;

/// An entity with a single, immutable owner.
pub trait Owned {
    const KIND: &'static str;

    fn owner_id(&self) -> UserId;

    fn entity_id(&self) -> i64;
}

impl Owned for Song {
    const KIND: &'static str = "Song";

    fn owner_id(&self) -> UserId {
        self.uploader_id
    }

    fn entity_id(&self) -> i64 {
        self.id.value()
    }
}

impl Owned for Playlist {
    const KIND: &'static str = "Playlist";

    fn owner_id(&self) -> UserId {
        self.owner_id
    }

    fn entity_id(&self) -> i64 {
        self.id.value()
    }
}

pub fn is_owner<E: Owned>(entity: &E, acting_user: UserId) -> bool {
    entity.owner_id() == acting_user
}

/// `Forbidden` unless `acting_user` owns `entity`.
pub(crate) fn ensure_owner<E: Owned>(entity: &E, acting_user: UserId, action: &str) -> Result<()> {
    if is_owner(entity, acting_user) {
        return Ok(());
    }

    warn!(
        entity = E::KIND,
        entity_id = entity.entity_id(),
        user_id = %acting_user,
        action,
        "Rejected mutation by non-owner"
    );
    Err(CoreError::Forbidden(format!(
        "Only the owner of this {} can {}",
        E::KIND.to_lowercase(),
        action
    )))
}
