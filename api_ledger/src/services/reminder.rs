use common::error::{AppError, Res};
use db::models::reminder::ReminderRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::reminder::{ReminderCreateBody, ReminderResponse},
    services::family::{Family, ensure_active_delegate, load_family},
};

fn respond(family: &Family, reminder: ReminderRow) -> ReminderResponse {
    ReminderResponse {
        created_by: family.label(&reminder.actor()),
        reminder,
    }
}

pub async fn list(pool: &PgPool, user_id: Uuid, include_done: bool) -> Res<Vec<ReminderResponse>> {
    let rows = db::reminder::get_by_user(pool, user_id, include_done).await?;
    let family = load_family(pool, user_id).await?;
    Ok(rows.into_iter().map(|row| respond(&family, row)).collect())
}

pub async fn create(pool: &PgPool, user_id: Uuid, body: ReminderCreateBody) -> Res<ReminderResponse> {
    ensure_active_delegate(pool, user_id, body.created_by_shared_user_id).await?;
    let req = body
        .into_request(user_id)
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;
    let row = db::reminder::insert(pool, req).await?;
    let family = load_family(pool, user_id).await?;
    Ok(respond(&family, row))
}

pub async fn mark_done(pool: &PgPool, user_id: Uuid, id: Uuid) -> Res<ReminderResponse> {
    let row = db::reminder::mark_done(pool, user_id, id).await?;
    let family = load_family(pool, user_id).await?;
    Ok(respond(&family, row))
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Res<()> {
    if !db::reminder::delete(pool, user_id, id).await? {
        return Err(AppError::NotFound(format!("Reminder {}", id)));
    }
    Ok(())
}
