use std::sync::Arc;

use actix_web::{HttpRequest, Responder, post, web};
use chrono::Utc;
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
};
use sqlx::PgPool;

use crate::services;

/// Handles payment provider webhook events.
///
/// # Input
/// - `payload`: raw event body, verified against the `stripe-signature` header
///
/// # Output
/// - Success: 200 once the event is applied or deliberately ignored
/// - Error: 400 for a missing or invalid signature
///
/// # Note
/// Called by the provider, never by the frontend. Register
/// `https://yourapp.com/api/pay/webhook` for the events
/// `checkout.session.completed`, `customer.subscription.created`,
/// `customer.subscription.updated`, `customer.subscription.deleted` and
/// `invoice.payment_failed`, and set the signing secret as
/// STRIPE_WEBHOOK_SECRET.
#[post("/webhook")]
pub async fn post_webhook(
    payload: String,
    req: HttpRequest,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let signature = match req.headers().get("stripe-signature") {
        Some(signature) => signature.to_str().unwrap_or(""),
        None => return Err(AppError::BadRequest("Stripe signature missing".to_string())),
    };

    let event = services::pay::construct_event(
        &payload,
        signature,
        &config.billing.stripe_webhook_secret,
    )?;
    let pg_pool: &PgPool = &pool;
    services::pay::process_webhook_event(pg_pool, event, Utc::now()).await?;

    Success::ok("Webhook processed successfully")
}
