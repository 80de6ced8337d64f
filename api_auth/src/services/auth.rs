use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use common::error::{AppError, Res};
use db::models::user::User;
use sqlx::PgPool;

use crate::dtos::auth::LoginRequest;

/// Authenticates existing user.
/// Unknown e-mail and wrong password both answer 401; an unconfirmed
/// account answers 403.
pub async fn authenticate_user(pool: &PgPool, login_data: &LoginRequest) -> Res<User> {
    let email = login_data.email.trim().to_lowercase();
    let (user, credentials) =
        db::user::get_user_with_password_hash(pool, &email)
            .await
            .map_err(|e| match e {
                AppError::Database(sqlx::Error::RowNotFound) => {
                    AppError::Unauthorized("Invalid credentials".to_string())
                }
                other => other,
            })?;

    let parsed_hash = PasswordHash::new(&credentials.password_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is unreadable: {}", e)))?;
    let is_valid = Argon2::default()
        .verify_password(login_data.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !is_valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }
    if !user.verified {
        return Err(AppError::Forbidden("Email address not confirmed".to_string()));
    }
    Ok(user)
}
