use access::{BillingEvent, SubscriptionRecord};
use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::PgPool;
use stripe::{Event, EventObject, EventType, Subscription, SubscriptionStatus, Webhook};
use uuid::Uuid;

/// Creates an event for the webhook based on the request payload and signature.
/// Requires a webhook secret key.
pub fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<Event> {
    match Webhook::construct_event(payload, signature, webhook_secret) {
        Ok(event) => Ok(event),
        Err(e) => {
            log::error!("Error constructing webhook event: {}", e);
            Err(AppError::BadRequest(format!("Webhook Error: {}", e)))
        }
    }
}

/// Where a provider subscription stands, as far as access is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStatus {
    Paying,
    /// First payment still outstanding.
    Pending,
    Ended,
}

impl From<&SubscriptionStatus> for SnapshotStatus {
    fn from(status: &SubscriptionStatus) -> Self {
        match status {
            // past_due keeps access while the provider retries the charge
            SubscriptionStatus::Active
            | SubscriptionStatus::Trialing
            | SubscriptionStatus::PastDue => SnapshotStatus::Paying,
            SubscriptionStatus::Incomplete | SubscriptionStatus::Paused => SnapshotStatus::Pending,
            _ => SnapshotStatus::Ended,
        }
    }
}

/// Provider subscription reduced to the fields the record mirrors.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionSnapshot {
    pub subscription_id: String,
    pub status: SnapshotStatus,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl From<&Subscription> for SubscriptionSnapshot {
    fn from(sub: &Subscription) -> Self {
        SubscriptionSnapshot {
            subscription_id: sub.id.to_string(),
            status: SnapshotStatus::from(&sub.status),
            period_start: from_unix(sub.current_period_start),
            period_end: from_unix(sub.current_period_end),
            cancel_at_period_end: sub.cancel_at_period_end,
            canceled_at: sub.canceled_at.and_then(from_unix),
            ended_at: sub.ended_at.and_then(from_unix),
        }
    }
}

fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

impl SubscriptionSnapshot {
    /// Billing events that bring a record in line with this snapshot.
    pub fn billing_events(&self, now: DateTime<Utc>) -> Vec<BillingEvent> {
        match self.status {
            SnapshotStatus::Pending => vec![],
            SnapshotStatus::Ended => vec![BillingEvent::SubscriptionEnded {
                subscription_id: Some(self.subscription_id.clone()),
                at: self.ended_at.or(self.canceled_at).unwrap_or(now),
            }],
            SnapshotStatus::Paying => {
                let paid = BillingEvent::PaymentSucceeded {
                    subscription_id: Some(self.subscription_id.clone()),
                    period_start: self.period_start,
                    period_end: self.period_end,
                };
                let renewal = if self.cancel_at_period_end {
                    BillingEvent::CancellationRequested {
                        subscription_id: Some(self.subscription_id.clone()),
                        at: self.canceled_at.unwrap_or(now),
                    }
                } else {
                    BillingEvent::Resumed {
                        subscription_id: Some(self.subscription_id.clone()),
                    }
                };
                vec![paid, renewal]
            }
        }
    }
}

/// Customer id and billing events carried by a webhook event. `None` for
/// events that do not affect access.
pub fn billing_events_for(event: &Event, now: DateTime<Utc>) -> Option<(String, Vec<BillingEvent>)> {
    match (&event.type_, &event.data.object) {
        (EventType::CheckoutSessionCompleted, EventObject::CheckoutSession(session)) => {
            let customer_id = session.customer.as_ref()?.id().to_string();
            let events = match session.subscription.as_ref()? {
                stripe::Expandable::Object(sub) => {
                    SubscriptionSnapshot::from(sub.as_ref()).billing_events(now)
                }
                // The subscription events that follow carry the period
                stripe::Expandable::Id(id) => vec![BillingEvent::PaymentSucceeded {
                    subscription_id: Some(id.to_string()),
                    period_start: None,
                    period_end: None,
                }],
            };
            Some((customer_id, events))
        }
        (
            EventType::CustomerSubscriptionCreated
            | EventType::CustomerSubscriptionUpdated
            | EventType::CustomerSubscriptionDeleted,
            EventObject::Subscription(sub),
        ) => {
            let customer_id = sub.customer.id().to_string();
            Some((customer_id, SubscriptionSnapshot::from(sub).billing_events(now)))
        }
        (EventType::InvoicePaymentFailed, EventObject::Invoice(invoice)) => {
            log::warn!(
                "Invoice {} payment failed for customer {:?}",
                invoice.id,
                invoice.customer.as_ref().map(|c| c.id())
            );
            None
        }
        _ => None,
    }
}

/// Processes the webhook event.
///
/// Events for customers we do not know are acknowledged and dropped so the
/// provider does not keep retrying them.
pub async fn process_webhook_event(pool: &PgPool, event: Event, now: DateTime<Utc>) -> Res<()> {
    log::info!("Processing webhook event: {}", event.type_);

    let Some((customer_id, events)) = billing_events_for(&event, now) else {
        log::info!("Unhandled event type: {}", event.type_);
        return Ok(());
    };
    if events.is_empty() {
        return Ok(());
    }

    let Some(user) = db::user::get_user_by_payment_customer_id(pool, &customer_id).await? else {
        log::warn!("Webhook event {} for unknown customer {}", event.id, customer_id);
        return Ok(());
    };

    let record = apply_billing_events(pool, user.id, &events).await?;

    log::info!(
        "Billing state for user {} updated: subscribed={}, end={:?}",
        user.id,
        record.subscribed,
        record.subscription_end
    );
    Ok(())
}

/// Applies billing events to the user's record while holding its row lock,
/// so webhook deliveries and user actions for one user never interleave.
pub async fn apply_billing_events(
    pool: &PgPool,
    user_id: Uuid,
    events: &[BillingEvent],
) -> Res<SubscriptionRecord> {
    let mut tx = pool.begin().await?;
    let mut record = db::subscription::get_by_user_id_for_update(&mut *tx, user_id).await?;

    for event in events {
        if record.apply(event) {
            log::debug!("Applied {} to user {}", event.name(), user_id);
        } else {
            log::info!(
                "Ignored {} for replaced subscription {:?} of user {}",
                event.name(),
                event.subscription_id(),
                user_id
            );
        }
    }

    db::subscription::save_billing_state(&mut *tx, &record).await?;
    tx.commit().await?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use access::{AccessLevel, resolve_access};
    use chrono::{Duration, TimeZone};
    use serde_json::{Value, json};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn snapshot(status: SnapshotStatus) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            subscription_id: "sub_123".to_string(),
            status,
            period_start: Some(now() - Duration::days(2)),
            period_end: Some(now() + Duration::days(28)),
            cancel_at_period_end: false,
            canceled_at: None,
            ended_at: None,
        }
    }

    fn apply_all(record: &mut SubscriptionRecord, events: &[BillingEvent]) {
        for event in events {
            record.apply(event);
        }
    }

    #[test]
    fn provider_statuses_map_to_access() {
        assert_eq!(SnapshotStatus::from(&SubscriptionStatus::Active), SnapshotStatus::Paying);
        assert_eq!(SnapshotStatus::from(&SubscriptionStatus::PastDue), SnapshotStatus::Paying);
        assert_eq!(SnapshotStatus::from(&SubscriptionStatus::Incomplete), SnapshotStatus::Pending);
        assert_eq!(SnapshotStatus::from(&SubscriptionStatus::Canceled), SnapshotStatus::Ended);
        assert_eq!(SnapshotStatus::from(&SubscriptionStatus::Unpaid), SnapshotStatus::Ended);
    }

    #[test]
    fn paying_snapshot_grants_premium_and_keeps_trial() {
        let user_id = Uuid::new_v4();
        let mut record = SubscriptionRecord::start_trial(user_id, now() - Duration::days(3));
        let trial_end = record.trial_end;

        apply_all(&mut record, &snapshot(SnapshotStatus::Paying).billing_events(now()));

        assert!(record.subscribed);
        assert_eq!(record.payment_subscription_id.as_deref(), Some("sub_123"));
        assert_eq!(record.trial_end, trial_end);
        let state = resolve_access(&record, now());
        assert_eq!(state.access_level, AccessLevel::Premium);
        assert_eq!(state.days_remaining, 28);
    }

    #[test]
    fn cancel_at_period_end_keeps_access_until_period_end() {
        let mut record = SubscriptionRecord::empty(Uuid::new_v4());
        let mut snap = snapshot(SnapshotStatus::Paying);
        snap.cancel_at_period_end = true;
        snap.canceled_at = Some(now() - Duration::hours(1));

        apply_all(&mut record, &snap.billing_events(now()));

        assert_eq!(record.cancelled_at, snap.canceled_at);
        assert_eq!(resolve_access(&record, now()).access_level, AccessLevel::Premium);
        assert_eq!(
            resolve_access(&record, now() + Duration::days(29)).access_level,
            AccessLevel::None
        );
    }

    #[test]
    fn withdrawn_cancellation_clears_the_marker() {
        let mut record = SubscriptionRecord::empty(Uuid::new_v4());
        record.cancelled_at = Some(now() - Duration::days(1));

        apply_all(&mut record, &snapshot(SnapshotStatus::Paying).billing_events(now()));

        assert_eq!(record.cancelled_at, None);
    }

    #[test]
    fn ended_snapshot_revokes_premium() {
        let mut record = SubscriptionRecord::empty(Uuid::new_v4());
        apply_all(&mut record, &snapshot(SnapshotStatus::Paying).billing_events(now()));

        let mut ended = snapshot(SnapshotStatus::Ended);
        ended.ended_at = Some(now());
        apply_all(&mut record, &ended.billing_events(now()));

        assert!(!record.subscribed);
        assert_eq!(record.subscription_end, Some(now()));
        assert_eq!(resolve_access(&record, now()).access_level, AccessLevel::None);
    }

    #[test]
    fn pending_snapshot_changes_nothing() {
        assert!(snapshot(SnapshotStatus::Pending).billing_events(now()).is_empty());
    }

    #[test]
    fn ended_snapshot_of_a_replaced_subscription_keeps_premium() {
        let mut record = SubscriptionRecord::empty(Uuid::new_v4());
        let mut current = snapshot(SnapshotStatus::Paying);
        current.subscription_id = "sub_456".to_string();
        apply_all(&mut record, &current.billing_events(now()));

        let mut stale = snapshot(SnapshotStatus::Ended);
        stale.ended_at = Some(now());
        apply_all(&mut record, &stale.billing_events(now()));

        assert!(record.subscribed);
        assert_eq!(record.payment_subscription_id.as_deref(), Some("sub_456"));
        assert_eq!(resolve_access(&record, now()).access_level, AccessLevel::Premium);
    }

    fn ts(at: DateTime<Utc>) -> i64 {
        at.timestamp()
    }

    fn event(type_: &str, object: Value) -> Event {
        serde_json::from_value(json!({
            "id": "evt_1PqX",
            "object": "event",
            "created": ts(now()),
            "data": { "object": object, "previous_attributes": {} },
            "livemode": false,
            "pending_webhooks": 1,
            "request": null,
            "type": type_,
        }))
        .unwrap()
    }

    fn subscription(status: &str, cancel_at_period_end: bool) -> Value {
        let start = now() - Duration::days(2);
        json!({
            "id": "sub_123",
            "object": "subscription",
            "application": null,
            "application_fee_percent": null,
            "automatic_tax": { "enabled": false, "liability": null },
            "billing_cycle_anchor": ts(start),
            "billing_cycle_anchor_config": null,
            "billing_thresholds": null,
            "cancel_at": null,
            "cancel_at_period_end": cancel_at_period_end,
            "canceled_at": null,
            "cancellation_details": { "comment": null, "feedback": null, "reason": null },
            "collection_method": "charge_automatically",
            "created": ts(start),
            "currency": "usd",
            "current_period_end": ts(now() + Duration::days(28)),
            "current_period_start": ts(start),
            "customer": "cus_9s6XKzkNRiz8i3",
            "days_until_due": null,
            "default_payment_method": null,
            "default_source": null,
            "default_tax_rates": [],
            "description": null,
            "discount": null,
            "discounts": [],
            "ended_at": null,
            "invoice_settings": { "account_tax_ids": null, "issuer": { "type": "self" } },
            "items": {
                "object": "list",
                "data": [],
                "has_more": false,
                "total_count": 0,
                "url": "/v1/subscription_items?subscription=sub_123"
            },
            "latest_invoice": null,
            "livemode": false,
            "metadata": {},
            "next_pending_invoice_item_invoice": null,
            "on_behalf_of": null,
            "pause_collection": null,
            "payment_settings": null,
            "pending_invoice_item_interval": null,
            "pending_setup_intent": null,
            "pending_update": null,
            "schedule": null,
            "start_date": ts(start),
            "status": status,
            "test_clock": null,
            "transfer_data": null,
            "trial_end": null,
            "trial_settings": null,
            "trial_start": null
        })
    }

    fn checkout_session(customer: Value, subscription: Value) -> Value {
        json!({
            "id": "cs_test_a1b2c3",
            "object": "checkout.session",
            "after_expiration": null,
            "allow_promotion_codes": null,
            "amount_subtotal": 999,
            "amount_total": 999,
            "automatic_tax": { "enabled": false, "liability": null, "status": null },
            "billing_address_collection": null,
            "cancel_url": "https://app.example.com/billing",
            "client_reference_id": null,
            "client_secret": null,
            "consent": null,
            "consent_collection": null,
            "created": ts(now()),
            "currency": "usd",
            "currency_conversion": null,
            "custom_fields": [],
            "custom_text": {
                "after_submit": null,
                "shipping_address": null,
                "submit": null,
                "terms_of_service_acceptance": null
            },
            "customer": customer,
            "customer_creation": null,
            "customer_details": null,
            "customer_email": null,
            "expires_at": ts(now() + Duration::days(1)),
            "invoice": null,
            "invoice_creation": null,
            "livemode": false,
            "locale": null,
            "metadata": {},
            "mode": "subscription",
            "payment_intent": null,
            "payment_link": null,
            "payment_method_collection": "always",
            "payment_method_configuration_details": null,
            "payment_method_options": null,
            "payment_method_types": ["card"],
            "payment_status": "paid",
            "phone_number_collection": { "enabled": false },
            "recovered_from": null,
            "setup_intent": null,
            "shipping_address_collection": null,
            "shipping_cost": null,
            "shipping_details": null,
            "shipping_options": [],
            "status": "complete",
            "submit_type": null,
            "subscription": subscription,
            "success_url": "https://app.example.com/billing/success",
            "total_details": { "amount_discount": 0, "amount_shipping": 0, "amount_tax": 0 },
            "ui_mode": "hosted",
            "url": null
        })
    }

    fn failed_invoice() -> Value {
        json!({
            "id": "in_1PqXfailed",
            "object": "invoice",
            "account_country": "US",
            "account_name": null,
            "account_tax_ids": null,
            "amount_due": 999,
            "amount_paid": 0,
            "amount_remaining": 999,
            "amount_shipping": 0,
            "application": null,
            "application_fee_amount": null,
            "attempt_count": 1,
            "attempted": true,
            "auto_advance": true,
            "automatic_tax": { "enabled": false, "liability": null, "status": null },
            "billing_reason": "subscription_cycle",
            "charge": null,
            "collection_method": "charge_automatically",
            "created": ts(now()),
            "currency": "usd",
            "custom_fields": null,
            "customer": "cus_9s6XKzkNRiz8i3",
            "customer_address": null,
            "customer_email": "ana@example.com",
            "customer_name": null,
            "customer_phone": null,
            "customer_shipping": null,
            "customer_tax_exempt": "none",
            "customer_tax_ids": [],
            "default_payment_method": null,
            "default_source": null,
            "default_tax_rates": [],
            "description": null,
            "discount": null,
            "discounts": [],
            "due_date": null,
            "effective_at": ts(now()),
            "ending_balance": 0,
            "footer": null,
            "from_invoice": null,
            "hosted_invoice_url": null,
            "invoice_pdf": null,
            "issuer": { "type": "self" },
            "last_finalization_error": null,
            "latest_revision": null,
            "lines": {
                "object": "list",
                "data": [],
                "has_more": false,
                "total_count": 0,
                "url": "/v1/invoices/in_1PqXfailed/lines"
            },
            "livemode": false,
            "metadata": {},
            "next_payment_attempt": null,
            "number": null,
            "on_behalf_of": null,
            "paid": false,
            "paid_out_of_band": false,
            "payment_intent": null,
            "payment_settings": {
                "default_mandate": null,
                "payment_method_options": null,
                "payment_method_types": null
            },
            "period_end": ts(now()),
            "period_start": ts(now() - Duration::days(30)),
            "post_payment_credit_notes_amount": 0,
            "pre_payment_credit_notes_amount": 0,
            "quote": null,
            "receipt_number": null,
            "rendering": null,
            "shipping_cost": null,
            "shipping_details": null,
            "starting_balance": 0,
            "statement_descriptor": null,
            "status": "open",
            "status_transitions": {
                "finalized_at": ts(now()),
                "marked_uncollectible_at": null,
                "paid_at": null,
                "voided_at": null
            },
            "subscription": "sub_123",
            "subtotal": 999,
            "subtotal_excluding_tax": 999,
            "tax": null,
            "test_clock": null,
            "total": 999,
            "total_discount_amounts": [],
            "total_excluding_tax": 999,
            "total_tax_amounts": [],
            "transfer_data": null,
            "webhooks_delivered_at": ts(now())
        })
    }

    #[test]
    fn checkout_with_subscription_id_records_payment_without_period() {
        let event = event(
            "checkout.session.completed",
            checkout_session(json!("cus_9s6XKzkNRiz8i3"), json!("sub_123")),
        );

        let (customer_id, events) = billing_events_for(&event, now()).unwrap();

        assert_eq!(customer_id, "cus_9s6XKzkNRiz8i3");
        assert_eq!(
            events,
            vec![BillingEvent::PaymentSucceeded {
                subscription_id: Some("sub_123".to_string()),
                period_start: None,
                period_end: None,
            }]
        );
    }

    #[test]
    fn checkout_with_expanded_subscription_uses_its_period() {
        let event = event(
            "checkout.session.completed",
            checkout_session(json!("cus_9s6XKzkNRiz8i3"), subscription("active", false)),
        );

        let (customer_id, events) = billing_events_for(&event, now()).unwrap();

        assert_eq!(customer_id, "cus_9s6XKzkNRiz8i3");
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            BillingEvent::PaymentSucceeded {
                subscription_id: Some("sub_123".to_string()),
                period_start: Some(now() - Duration::days(2)),
                period_end: Some(now() + Duration::days(28)),
            }
        );
        assert_eq!(
            events[1],
            BillingEvent::Resumed {
                subscription_id: Some("sub_123".to_string()),
            }
        );
    }

    #[test]
    fn checkout_without_customer_or_subscription_is_ignored() {
        let no_customer = event(
            "checkout.session.completed",
            checkout_session(Value::Null, json!("sub_123")),
        );
        assert!(billing_events_for(&no_customer, now()).is_none());

        let no_subscription = event(
            "checkout.session.completed",
            checkout_session(json!("cus_9s6XKzkNRiz8i3"), Value::Null),
        );
        assert!(billing_events_for(&no_subscription, now()).is_none());
    }

    #[test]
    fn subscription_events_carry_the_customer_id() {
        let updated = event(
            "customer.subscription.updated",
            subscription("active", true),
        );
        let (customer_id, events) = billing_events_for(&updated, now()).unwrap();
        assert_eq!(customer_id, "cus_9s6XKzkNRiz8i3");
        assert_eq!(
            events[1],
            BillingEvent::CancellationRequested {
                subscription_id: Some("sub_123".to_string()),
                at: now(),
            }
        );

        let mut ended = subscription("canceled", false);
        ended["ended_at"] = json!(ts(now()));
        let deleted = event("customer.subscription.deleted", ended);
        let (customer_id, events) = billing_events_for(&deleted, now()).unwrap();
        assert_eq!(customer_id, "cus_9s6XKzkNRiz8i3");
        assert_eq!(
            events,
            vec![BillingEvent::SubscriptionEnded {
                subscription_id: Some("sub_123".to_string()),
                at: now(),
            }]
        );
    }

    #[test]
    fn failed_invoice_payment_is_ignored() {
        let event = event("invoice.payment_failed", failed_invoice());
        assert!(billing_events_for(&event, now()).is_none());
    }
}
