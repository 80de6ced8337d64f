use access::{SubscriptionRecord, SubscriptionTier};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SubscriptionRow {
    pub user_id: Uuid,
    pub trial_start: Option<DateTime<Utc>>,
    pub trial_end: Option<DateTime<Utc>>,
    pub subscription_start: Option<DateTime<Utc>>,
    pub subscription_end: Option<DateTime<Utc>>,
    pub subscribed: bool,
    pub subscription_tier: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub payment_subscription_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for SubscriptionRecord {
    fn from(row: SubscriptionRow) -> Self {
        SubscriptionRecord {
            user_id: row.user_id,
            trial_start: row.trial_start,
            trial_end: row.trial_end,
            subscription_start: row.subscription_start,
            subscription_end: row.subscription_end,
            subscribed: row.subscribed,
            subscription_tier: row
                .subscription_tier
                .as_deref()
                .and_then(SubscriptionTier::parse),
            cancelled_at: row.cancelled_at,
            payment_subscription_id: row.payment_subscription_id,
        }
    }
}
