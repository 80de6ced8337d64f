use access::{SubscriptionRecord, resolve_access_for};
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, password_hash::PasswordHasher};
use chrono::Utc;
use common::error::{AppError, Res};
use db::dtos::user::UserCreateRequest;
use db::models::user::{AuthCredentials, User};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::auth::{ConfirmResponse, RegisterRequest};

pub async fn exists_user_by_email(pool: &PgPool, email: &str) -> Res<bool> {
    db::user::exists_user_by_email(pool, email).await
}
pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Res<User> {
    db::user::get_user_by_id(pool, user_id).await
}

/// Inserts user record, credentials and a pending e-mail confirmation.
pub async fn create_user_with_credentials(pool: &PgPool, req: &RegisterRequest) -> Res<User> {
    // hash before opening the transaction
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    let mut tx = pool.begin().await?;

    let user = db::user::insert_user(
        &mut *tx,
        UserCreateRequest {
            email: req.email.trim().to_lowercase(),
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
        },
    )
    .await?;

    db::user::insert_user_with_credentials(
        &mut *tx,
        AuthCredentials {
            user_id: user.id,
            password_hash,
        },
    )
    .await?;

    let confirmation = db::user::insert_confirmation(&mut *tx, user.id).await?;

    tx.commit().await?;

    // mail delivery lives outside this service
    log::info!(
        "Registered user {} (confirmation token {})",
        user.id,
        confirmation.token
    );
    Ok(user)
}

/// Confirms the e-mail address behind `token` and opens the trial window.
/// Confirming twice is harmless: the trial is only granted once.
pub async fn confirm_email(pool: &PgPool, token: Uuid) -> Res<ConfirmResponse> {
    let mut tx = pool.begin().await?;

    let confirmation = db::user::consume_confirmation(&mut *tx, token)
        .await?
        .ok_or_else(|| AppError::NotFound("Unknown confirmation token".to_string()))?;

    let user = db::user::mark_verified(&mut *tx, confirmation.user_id).await?;

    let now = Utc::now();
    let trial = SubscriptionRecord::start_trial(user.id, now);
    let trial_started = db::subscription::insert_trial(&mut *tx, &trial).await?;

    let record = db::subscription::get_by_user_id(&mut *tx, user.id).await?;

    tx.commit().await?;

    if trial_started {
        log::info!("Trial started for user {} until {:?}", user.id, trial.trial_end);
    }

    Ok(ConfirmResponse {
        user,
        trial_started,
        access: resolve_access_for(record.as_ref(), now),
    })
}
