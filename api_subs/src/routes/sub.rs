use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use chrono::Utc;
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
    jwt::JwtClaims,
};
use sqlx::PgPool;

use crate::{
    dtos::sub::{SubscriptionCreateRequest, SubscriptionPlansResponse, SubscriptionResponse},
    services,
};

/// Returns the caller's effective access state.
///
/// # Output
/// - Success: `{ access: { access_level, days_remaining, is_trial_active }, cancel_pending, subscription }`
/// - Error: 401 without a valid token
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/sub/status', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('authToken')}` }
/// });
/// const { access } = await response.json();
/// if (access.access_level === 'none') showPaywall();
/// ```
#[get("/status")]
pub async fn get_status(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let status = services::sub::get_access_status(pg_pool, claims.user_id, Utc::now()).await?;
    Success::ok(status)
}

/// Lists the recurring plans offered for premium access.
///
/// # Output
/// - Success: `{ plans: [{ id, name, description, price, currency, interval, metadata }] }`
/// - Error: 502 if the payment provider cannot be reached
#[get("/plans")]
pub async fn get_plans(client: web::Data<stripe::Client>) -> Res<impl Responder> {
    let plans = services::sub::get_subscription_plans(&client).await?;
    Success::ok(SubscriptionPlansResponse { plans })
}

/// Creates a checkout session for premium access.
///
/// The payment customer is created on first use. Access changes only once
/// the provider confirms the payment through the webhook.
///
/// # Input
/// - `price_id`: optional, defaults to the configured premium price
/// - `success_url`, `cancel_url`: where checkout redirects afterwards
///
/// # Output
/// - Success: `{ url }` of the hosted checkout page
/// - Error: 400 without a price, 502 on provider errors
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/sub/subscribe', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${localStorage.getItem('authToken')}`
///   },
///   body: JSON.stringify({
///     success_url: 'https://app.example.com/billing/success',
///     cancel_url: 'https://app.example.com/billing'
///   })
/// });
/// const { url } = await response.json();
/// window.location.href = url;
/// ```
#[post("/subscribe")]
pub async fn post_subscribe(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<SubscriptionCreateRequest>,
    config: web::Data<Arc<Config>>,
    client: web::Data<stripe::Client>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let req = req.into_inner();
    let price_id = req
        .price_id
        .unwrap_or_else(|| config.billing.premium_price_id.clone());

    let user = db::user::get_user_by_id(pg_pool, claims.user_id).await?;
    let customer_id = services::sub::ensure_customer(&client, pg_pool, &user).await?;
    let session = services::sub::create_subscription_session(
        &client,
        customer_id,
        user.id,
        &price_id,
        &req.success_url,
        &req.cancel_url,
    )
    .await?;

    let url = session
        .url
        .ok_or_else(|| AppError::Internal("Checkout session without URL".to_string()))?;
    Success::ok(SubscriptionResponse { url })
}

/// Stops renewal of the paid subscription. Premium access continues until
/// the end of the current paid period.
///
/// # Output
/// - Success: the updated subscription record
/// - Error: 400 without an active paid subscription or when already cancelled
#[post("/cancel")]
pub async fn post_cancel(
    claims: web::ReqData<JwtClaims>,
    client: web::Data<stripe::Client>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let record =
        services::sub::cancel_subscription(&client, pg_pool, claims.user_id, Utc::now()).await?;
    Success::ok(record)
}

/// Withdraws a pending cancellation.
///
/// # Output
/// - Success: the updated subscription record
/// - Error: 400 when nothing is pending
#[post("/resume")]
pub async fn post_resume(
    claims: web::ReqData<JwtClaims>,
    client: web::Data<stripe::Client>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &pool;
    let record = services::sub::resume_subscription(&client, pg_pool, claims.user_id).await?;
    Success::ok(record)
}
