use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label shown when an actor id is present but matches nobody we know.
pub const GENERIC_ACTOR_LABEL: &str = "Shared user";

/// Named delegate allowed to record entries on the owner's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedUser {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Who performed an action, as stored on the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    pub created_by_shared_user_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    /// Field written by older records instead of `created_by_shared_user_id`.
    pub shared_user_id: Option<Uuid>,
}

impl ActorRef {
    pub fn is_empty(&self) -> bool {
        self.created_by_shared_user_id.is_none()
            && self.user_id.is_none()
            && self.shared_user_id.is_none()
    }
}

impl Owner {
    /// Profile name, else the local part of the e-mail address.
    pub fn display_name(&self) -> Option<String> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if let Some(name) = name {
            return Some(name.to_string());
        }
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .map(str::trim)
            .filter(|local| !local.is_empty())
            .map(str::to_string)
    }
}

/// Resolves the label to show next to an entry.
///
/// Returns `None` only when the entry carries no actor id at all, in which
/// case the caller shows no badge. Deactivated shared users still resolve so
/// that historical entries keep their attribution.
pub fn resolve_display_name(
    actor: &ActorRef,
    owner: &Owner,
    shared_users: &[SharedUser],
) -> Option<String> {
    let find = |id: Uuid| shared_users.iter().find(|s| s.id == id);

    if let Some(shared) = actor.created_by_shared_user_id.and_then(find) {
        return Some(shared.name.clone());
    }

    if actor.user_id == Some(owner.id) {
        return Some(
            owner
                .display_name()
                .unwrap_or_else(|| GENERIC_ACTOR_LABEL.to_string()),
        );
    }

    if let Some(shared) = actor
        .shared_user_id
        .and_then(find)
        .or_else(|| actor.user_id.and_then(find))
    {
        return Some(shared.name.clone());
    }

    if actor.is_empty() {
        None
    } else {
        Some(GENERIC_ACTOR_LABEL.to_string())
    }
}
