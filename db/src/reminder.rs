use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::reminder::ReminderCreateRequest, models::reminder::ReminderRow};

pub async fn get_by_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    include_done: bool,
) -> Res<Vec<ReminderRow>> {
    sqlx::query_as::<_, ReminderRow>(
        r#"
        SELECT * FROM reminders
        WHERE user_id = $1 AND ($2 OR NOT done)
        ORDER BY due_at
        "#,
    )
    .bind(user_id)
    .bind(include_done)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: ReminderCreateRequest,
) -> Res<ReminderRow> {
    sqlx::query_as::<_, ReminderRow>(
        r#"
        INSERT INTO reminders (user_id, title, due_at, created_by_shared_user_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(data.title)
    .bind(data.due_at)
    .bind(data.created_by_shared_user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn mark_done<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    id: Uuid,
) -> Res<ReminderRow> {
    sqlx::query_as::<_, ReminderRow>(
        "UPDATE reminders SET done = TRUE WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn delete<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    id: Uuid,
) -> Res<bool> {
    let result = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
