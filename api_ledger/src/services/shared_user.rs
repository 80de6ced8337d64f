use common::error::{AppError, Res};
use db::{dtos::shared_user::SharedUserCreateRequest, models::shared_user::SharedUserRow};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::shared_user::SharedUserBody;

pub async fn list(pool: &PgPool, owner_user_id: Uuid) -> Res<Vec<SharedUserRow>> {
    db::shared_user::get_by_owner(pool, owner_user_id).await
}

pub async fn create(pool: &PgPool, owner_user_id: Uuid, body: &SharedUserBody) -> Res<SharedUserRow> {
    let name = body
        .clean_name()
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;
    let row = db::shared_user::insert(
        pool,
        SharedUserCreateRequest {
            owner_user_id,
            name,
        },
    )
    .await?;
    log::info!("User {} added shared user {}", owner_user_id, row.id);
    Ok(row)
}

pub async fn rename(
    pool: &PgPool,
    owner_user_id: Uuid,
    id: Uuid,
    body: &SharedUserBody,
) -> Res<SharedUserRow> {
    let name = body
        .clean_name()
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;
    db::shared_user::rename(pool, owner_user_id, id, &name).await
}

/// Deactivated delegates can no longer record entries, but keep their name on
/// the entries they already made.
pub async fn deactivate(pool: &PgPool, owner_user_id: Uuid, id: Uuid) -> Res<SharedUserRow> {
    let row = db::shared_user::deactivate(pool, owner_user_id, id).await?;
    log::info!("User {} deactivated shared user {}", owner_user_id, id);
    Ok(row)
}
