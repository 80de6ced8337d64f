use actix_web::{Responder, get, post, web};
use common::env_config::Config;
use common::error::{AppError, Res};
use common::http::Success;
use common::jwt::{self, ClaimsSpec};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::dtos::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::services;

/// Registers a new user with email and password authentication.
///
/// The account stays unverified until the confirmation link is followed;
/// the trial window opens at that point, not here.
///
/// # Input
/// - `req`: JSON payload with `email`, `password`, `first_name`, `last_name`
///
/// # Output
/// - Success: 201 with the created user
/// - Error: 400 if the payload is invalid or the email already exists
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/auth/register', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({
///     email: 'user@example.com',
///     password: 'securepassword',
///     first_name: 'John',
///     last_name: 'Doe'
///   })
/// });
/// ```
#[post("/register")]
pub async fn post_register(
    req: web::Json<RegisterRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    req.validate()
        .map_err(|msg| AppError::BadRequest(msg.to_string()))?;

    let email = req.email.trim().to_lowercase();
    if services::user::exists_user_by_email(pg_pool, &email).await? {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }
    let user = services::user::create_user_with_credentials(pg_pool, &req.into_inner()).await?;
    Success::created(user)
}

/// Confirms the email address and starts the 7-day trial.
///
/// # Output
/// - Success: user, whether a trial was started by this call, and the
///   resulting access state
/// - Error: 404 for unknown tokens
#[get("/confirm/{token}")]
pub async fn get_confirm(path: web::Path<Uuid>, pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let response = services::user::confirm_email(pg_pool, path.into_inner()).await?;
    Success::ok(response)
}

/// Authenticates a user with email and password.
///
/// # Output
/// - Success: `{ token, user }`
/// - Error: 401 for invalid credentials, 403 while the email is unconfirmed
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/auth/login', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ email: 'user@example.com', password: 'securepassword' })
/// });
/// if (response.ok) {
///   const { token } = await response.json();
///   localStorage.setItem('authToken', token);
/// }
/// ```
#[post("/login")]
pub async fn post_login(
    login_data: web::Json<LoginRequest>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let user = services::auth::authenticate_user(pg_pool, &login_data.into_inner()).await?;
    let token = jwt::generate_jwt(
        ClaimsSpec {
            user_id: user.id,
            email: user.email.clone(),
        },
        &config.jwt_config,
    )?;
    Success::ok(AuthResponse { token, user })
}
