use std::sync::Arc;

use actix_web::{Responder, delete, get, post, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::reminder::{ReminderCreateBody, ReminderQuery},
    services,
};

/// Lists reminders by due date. Done ones only with `?include_done=true`.
#[get("")]
pub async fn get_reminders(
    claims: web::ReqData<JwtClaims>,
    query: web::Query<ReminderQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let reminders = services::reminder::list(pg_pool, claims.user_id, query.include_done).await?;
    Success::ok(reminders)
}

/// Creates a reminder.
///
/// # Input
/// - `title`, `due_at` (`YYYY-MM-DDTHH:MM:SS`), optional `created_by_shared_user_id`
///
/// # Output
/// - Success: 201 with the reminder and its `created_by` label
/// - Error: 400 for a blank title or an unknown/deactivated shared user
#[post("")]
pub async fn post_reminder(
    claims: web::ReqData<JwtClaims>,
    body: web::Json<ReminderCreateBody>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let reminder = services::reminder::create(pg_pool, claims.user_id, body.into_inner()).await?;
    Success::created(reminder)
}

#[post("/{id}/done")]
pub async fn post_done(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let reminder = services::reminder::mark_done(pg_pool, claims.user_id, path.into_inner()).await?;
    Success::ok(reminder)
}

#[delete("/{id}")]
pub async fn delete_reminder(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    services::reminder::delete(pg_pool, claims.user_id, path.into_inner()).await?;
    Success::no_content()
}
