use access::{ActorRef, Owner, SharedUser, resolve_display_name};
use common::error::{AppError, Res};
use db::models::shared_user::SharedUserRow;
use sqlx::PgPool;
use uuid::Uuid;

/// The owner and every delegate ever registered on the account, used to
/// label entries.
pub struct Family {
    pub owner: Owner,
    pub shared_users: Vec<SharedUser>,
}

impl Family {
    pub fn label(&self, actor: &ActorRef) -> Option<String> {
        resolve_display_name(actor, &self.owner, &self.shared_users)
    }
}

pub async fn load_family(pool: &PgPool, user_id: Uuid) -> Res<Family> {
    let owner = db::user::get_user_by_id(pool, user_id).await?;
    let shared_users = db::shared_user::get_by_owner(pool, user_id).await?;
    Ok(Family {
        owner: owner.as_owner(),
        shared_users: shared_users.iter().map(SharedUser::from).collect(),
    })
}

/// New entries may only be attributed to an active delegate of the caller.
pub async fn ensure_active_delegate(
    pool: &PgPool,
    owner_user_id: Uuid,
    shared_user_id: Option<Uuid>,
) -> Res<()> {
    let Some(id) = shared_user_id else {
        return Ok(());
    };
    let row = db::shared_user::get_owned(pool, owner_user_id, id).await?;
    check_delegate(row.as_ref()).map_err(|msg| AppError::BadRequest(msg.to_string()))
}

fn check_delegate(row: Option<&SharedUserRow>) -> Result<(), &'static str> {
    match row {
        Some(row) if row.active => Ok(()),
        Some(_) => Err("Shared user is deactivated"),
        None => Err("Unknown shared user"),
    }
}
