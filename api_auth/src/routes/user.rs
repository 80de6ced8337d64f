use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;

use crate::services;

/// Returns the authenticated user's profile.
///
/// # Output
/// - Success: the user object
/// - Error: 401 without a valid token, 404 if the user no longer exists
#[get("/me")]
pub async fn get_me(claims: web::ReqData<JwtClaims>, pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let user = services::user::get_user_by_id(pg_pool, claims.user_id).await?;
    Success::ok(user)
}
