use std::sync::Arc;

use actix_web::{Responder, get, post, put, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{dtos::shared_user::SharedUserBody, services};

/// Lists the caller's shared users, deactivated ones included.
#[get("")]
pub async fn get_shared_users(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let shared_users = services::shared_user::list(pg_pool, claims.user_id).await?;
    Success::ok(shared_users)
}

/// Registers a named delegate who can record entries on the caller's account.
///
/// # Input
/// - `name`: 1 to 60 characters
///
/// # Output
/// - Success: 201 with the shared user
/// - Error: 400 for a blank or overlong name
///
/// # Frontend Example
/// ```javascript
/// await fetch('/api/dashboard/ledger/shared-users', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${localStorage.getItem('authToken')}`
///   },
///   body: JSON.stringify({ name: 'Ana' })
/// });
/// ```
#[post("")]
pub async fn post_shared_user(
    claims: web::ReqData<JwtClaims>,
    body: web::Json<SharedUserBody>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let shared_user = services::shared_user::create(pg_pool, claims.user_id, &body).await?;
    Success::created(shared_user)
}

#[put("/{id}")]
pub async fn put_shared_user(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    body: web::Json<SharedUserBody>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let shared_user =
        services::shared_user::rename(pg_pool, claims.user_id, path.into_inner(), &body).await?;
    Success::ok(shared_user)
}

/// Deactivates a shared user. Past entries keep their attribution.
#[post("/{id}/deactivate")]
pub async fn post_deactivate(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let shared_user =
        services::shared_user::deactivate(pg_pool, claims.user_id, path.into_inner()).await?;
    Success::ok(shared_user)
}
