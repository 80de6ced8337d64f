use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::shared_user::SharedUserCreateRequest, models::shared_user::SharedUserRow};

/// All shared users of an owner, deactivated ones included.
pub async fn get_by_owner<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    owner_user_id: Uuid,
) -> Res<Vec<SharedUserRow>> {
    sqlx::query_as::<_, SharedUserRow>(
        "SELECT * FROM shared_users WHERE owner_user_id = $1 ORDER BY created_at",
    )
    .bind(owner_user_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_owned<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    owner_user_id: Uuid,
    id: Uuid,
) -> Res<Option<SharedUserRow>> {
    sqlx::query_as::<_, SharedUserRow>(
        "SELECT * FROM shared_users WHERE id = $1 AND owner_user_id = $2",
    )
    .bind(id)
    .bind(owner_user_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SharedUserCreateRequest,
) -> Res<SharedUserRow> {
    sqlx::query_as::<_, SharedUserRow>(
        "INSERT INTO shared_users (owner_user_id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(data.owner_user_id)
    .bind(data.name)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn rename<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    owner_user_id: Uuid,
    id: Uuid,
    name: &str,
) -> Res<SharedUserRow> {
    sqlx::query_as::<_, SharedUserRow>(
        "UPDATE shared_users SET name = $1 WHERE id = $2 AND owner_user_id = $3 RETURNING *",
    )
    .bind(name)
    .bind(id)
    .bind(owner_user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Soft delete: the row stays so past entries keep their attribution.
pub async fn deactivate<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    owner_user_id: Uuid,
    id: Uuid,
) -> Res<SharedUserRow> {
    sqlx::query_as::<_, SharedUserRow>(
        "UPDATE shared_users SET active = FALSE WHERE id = $1 AND owner_user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(owner_user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
