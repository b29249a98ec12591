//! Owner scoping shared by the read and write paths.
//!
//! Reads only ever surface entities owned by the requester, and writes always
//! stamp the requester as owner regardless of what the payload claims.

use crate::error::{CoreError, Result};
use crate::model::{Attribute, EntityId, OwnerId, Recipe};

/// An entity that belongs to exactly one owner.
pub trait Owned {
    /// Singular name used in not-found messages
    const KIND: &'static str;

    fn id(&self) -> EntityId;
    fn owner(&self) -> OwnerId;

    fn is_owned_by(&self, owner: OwnerId) -> bool {
        self.owner() == owner
    }
}

impl Owned for Recipe {
    const KIND: &'static str = "Recipe";

    fn id(&self) -> EntityId {
        self.id
    }

    fn owner(&self) -> OwnerId {
        self.owner
    }
}

impl Owned for Attribute {
    const KIND: &'static str = "Attribute";

    fn id(&self) -> EntityId {
        self.id
    }

    fn owner(&self) -> OwnerId {
        self.owner
    }
}

/// Keep only the entities owned by `owner`.
pub fn scope_to_owner<T: Owned>(
    entities: impl IntoIterator<Item = T>,
    owner: OwnerId,
) -> impl Iterator<Item = T> {
    entities.into_iter().filter(move |e| e.is_owned_by(owner))
}

/// Resolve a detail-level lookup.
///
/// A missing entity and an entity owned by someone else are indistinguishable
/// to the caller: both are `NotFound`.
pub fn require_owned<T: Owned>(found: Option<T>, id: EntityId, owner: OwnerId) -> Result<T> {
    match found {
        Some(entity) if entity.is_owned_by(owner) => Ok(entity),
        Some(entity) => {
            tracing::debug!(
                kind = T::KIND,
                id = id,
                owner = %owner,
                actual_owner = %entity.owner(),
                "Rejected access to entity owned by another user"
            );
            Err(CoreError::NotFound { kind: T::KIND, id })
        }
        None => Err(CoreError::NotFound { kind: T::KIND, id }),
    }
}

/// Pick the owner to persist for a write.
///
/// The authenticated owner always wins; a differing value claimed by the
/// payload is logged and discarded.
pub fn stamp_owner(claimed: Option<OwnerId>, authenticated: OwnerId) -> OwnerId {
    if let Some(claimed) = claimed.filter(|c| *c != authenticated) {
        tracing::warn!(
            claimed = %claimed,
            owner = %authenticated,
            "Ignoring owner supplied in payload"
        );
    }
    authenticated
}
