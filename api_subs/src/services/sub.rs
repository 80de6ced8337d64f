use access::{BillingEvent, SubscriptionRecord, resolve_access_for};
use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use db::models::user::User;
use sqlx::PgPool;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession, CustomerId, ListPrices,
    Price,
};
use uuid::Uuid;

use crate::{
    dtos::sub::AccessStatusResponse, models::sub::SubscriptionPlan,
    services::pay::apply_billing_events,
};

/// Gets the recurring prices offered for the premium tier.
pub async fn get_subscription_plans(client: &Client) -> Res<Vec<SubscriptionPlan>> {
    let params = ListPrices {
        active: Some(true),
        limit: Some(100),
        expand: &["data.product"],
        ..Default::default()
    };

    let prices = Price::list(client, &params).await.map_err(AppError::from)?;

    let plans = prices
        .data
        .into_iter()
        .filter_map(|price| {
            // Only include subscription prices
            if price.type_ != Some(stripe::PriceType::Recurring) {
                return None;
            }

            let recurring = price.recurring?;
            let product_obj = price.product.as_ref().and_then(|p| p.as_object())?;

            Some(SubscriptionPlan {
                id: price.id.to_string(),
                name: product_obj.name.clone().unwrap_or_default(),
                description: product_obj.description.clone().unwrap_or_default(),
                price: price.unit_amount.unwrap_or(0),
                currency: price.currency.unwrap_or_default().to_string(),
                interval: recurring.interval.to_string(),
                metadata: product_obj
                    .metadata
                    .as_ref()
                    .and_then(|map| serde_json::to_value(map).ok()),
            })
        })
        .collect();

    Ok(plans)
}

/// Effective access of a user at `now`, alongside the raw record.
pub async fn get_access_status(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Res<AccessStatusResponse> {
    let record = db::subscription::get_by_user_id(pool, user_id).await?;
    let access = resolve_access_for(record.as_ref(), now);
    Ok(AccessStatusResponse {
        access,
        cancel_pending: record
            .as_ref()
            .is_some_and(|r| r.subscribed && r.cancelled_at.is_some()),
        trial_used: record.as_ref().is_some_and(SubscriptionRecord::has_trial),
        subscription: record,
    })
}

/// Returns the user's payment customer id, creating the customer on first use.
pub async fn ensure_customer(client: &Client, pool: &PgPool, user: &User) -> Res<CustomerId> {
    let customer_id = match &user.payment_customer_id {
        Some(id) => id.clone(),
        None => {
            let customer = common::stripe::create_customer(
                client,
                &user.email,
                &user.full_name(),
                &user.id.to_string(),
            )
            .await?;
            db::user::set_payment_customer_id(pool, user.id, customer.id.as_str()).await?;
            log::info!("Created payment customer {} for user {}", customer.id, user.id);
            customer.id.to_string()
        }
    };

    customer_id
        .parse::<CustomerId>()
        .map_err(|e| AppError::Internal(format!("Invalid customer ID: {}", e)))
}

/// Creates a checkout session for the premium subscription.
pub async fn create_subscription_session(
    client: &Client,
    customer_id: CustomerId,
    user_id: Uuid,
    price_id: &str,
    success_url: &str,
    cancel_url: &str,
) -> Res<CheckoutSession> {
    if price_id.is_empty() {
        return Err(AppError::BadRequest("No price selected".to_string()));
    }
    let user_ref = user_id.to_string();
    let params = CreateCheckoutSession {
        line_items: Some(vec![stripe::CreateCheckoutSessionLineItems {
            price: Some(price_id.to_string()),
            quantity: Some(1),
            ..Default::default()
        }]),
        mode: Some(CheckoutSessionMode::Subscription),
        success_url: Some(success_url),
        cancel_url: Some(cancel_url),
        customer: Some(customer_id),
        client_reference_id: Some(user_ref.as_str()),
        ..Default::default()
    };
    CheckoutSession::create(client, params)
        .await
        .map_err(AppError::from)
}

/// The one cancellation path: stop renewal at the provider, then record the
/// request locally. Access continues until the paid period ends.
pub async fn cancel_subscription(
    client: &Client,
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Res<SubscriptionRecord> {
    let record = active_paid_record(pool, user_id).await?;
    if record.cancelled_at.is_some() {
        return Err(AppError::BadRequest(
            "Cancellation already requested".to_string(),
        ));
    }

    set_renewal(client, &record, false).await?;
    let event = BillingEvent::CancellationRequested {
        subscription_id: record.payment_subscription_id.clone(),
        at: now,
    };
    let record = apply_billing_events(pool, user_id, &[event]).await?;

    log::info!("User {} cancelled their subscription", user_id);
    Ok(record)
}

/// Withdraws a pending cancellation.
pub async fn resume_subscription(
    client: &Client,
    pool: &PgPool,
    user_id: Uuid,
) -> Res<SubscriptionRecord> {
    let record = active_paid_record(pool, user_id).await?;
    if record.cancelled_at.is_none() {
        return Err(AppError::BadRequest("No pending cancellation".to_string()));
    }

    set_renewal(client, &record, true).await?;
    let event = BillingEvent::Resumed {
        subscription_id: record.payment_subscription_id.clone(),
    };
    let record = apply_billing_events(pool, user_id, &[event]).await?;

    log::info!("User {} resumed their subscription", user_id);
    Ok(record)
}

async fn active_paid_record(pool: &PgPool, user_id: Uuid) -> Res<SubscriptionRecord> {
    db::subscription::get_by_user_id(pool, user_id)
        .await?
        .filter(|r| r.subscribed && r.payment_subscription_id.is_some())
        .ok_or_else(|| AppError::BadRequest("No active paid subscription".to_string()))
}

/// Sets whether the provider renews the subscription at period end.
async fn set_renewal(client: &Client, record: &SubscriptionRecord, renew: bool) -> Res<()> {
    let sub_id = record
        .payment_subscription_id
        .as_deref()
        .unwrap_or_default()
        .parse::<stripe::SubscriptionId>()
        .map_err(|e| AppError::Internal(format!("Invalid subscription ID: {}", e)))?;

    // Stripe models renewal as the opposite flag
    stripe::Subscription::update(
        client,
        &sub_id,
        stripe::UpdateSubscription {
            cancel_at_period_end: Some(!renew),
            ..Default::default()
        },
    )
    .await
    .map_err(AppError::from)?;
    Ok(())
}
