use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{SubscriptionRecord, SubscriptionTier};

/// Provider-neutral billing callback, mirrored into a [`SubscriptionRecord`].
///
/// Events other than a payment name the subscription they concern; when the
/// record tracks a different subscription they are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BillingEvent {
    /// A paid period started or renewed.
    PaymentSucceeded {
        subscription_id: Option<String>,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
    },
    /// The user asked to stop renewing; access runs until the period ends.
    CancellationRequested {
        subscription_id: Option<String>,
        at: DateTime<Utc>,
    },
    /// A pending cancellation was withdrawn.
    Resumed { subscription_id: Option<String> },
    /// The provider terminated the subscription.
    SubscriptionEnded {
        subscription_id: Option<String>,
        at: DateTime<Utc>,
    },
}

impl BillingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BillingEvent::PaymentSucceeded { .. } => "payment_succeeded",
            BillingEvent::CancellationRequested { .. } => "cancellation_requested",
            BillingEvent::Resumed { .. } => "resumed",
            BillingEvent::SubscriptionEnded { .. } => "subscription_ended",
        }
    }

    pub fn subscription_id(&self) -> Option<&str> {
        match self {
            BillingEvent::PaymentSucceeded { subscription_id, .. }
            | BillingEvent::CancellationRequested { subscription_id, .. }
            | BillingEvent::Resumed { subscription_id }
            | BillingEvent::SubscriptionEnded { subscription_id, .. } => {
                subscription_id.as_deref()
            }
        }
    }
}

impl SubscriptionRecord {
    /// Applies a billing event and returns whether it changed anything it
    /// governs. Trial fields are never written here.
    pub fn apply(&mut self, event: &BillingEvent) -> bool {
        if let BillingEvent::PaymentSucceeded {
            subscription_id,
            period_start,
            period_end,
        } = event
        {
            self.subscribed = true;
            self.subscription_tier = Some(SubscriptionTier::Premium);
            if subscription_id.is_some() {
                self.payment_subscription_id = subscription_id.clone();
            }
            if period_start.is_some() {
                self.subscription_start = *period_start;
            }
            if period_end.is_some() {
                self.subscription_end = *period_end;
            }
            return true;
        }

        if !self.tracks(event.subscription_id()) {
            return false;
        }

        match event {
            BillingEvent::CancellationRequested { at, .. } => {
                self.cancelled_at = Some(*at);
            }
            BillingEvent::Resumed { .. } => {
                self.cancelled_at = None;
            }
            BillingEvent::SubscriptionEnded { at, .. } => {
                self.subscribed = false;
                self.subscription_tier = None;
                self.subscription_end = Some(match self.subscription_end {
                    Some(end) if end < *at => end,
                    _ => *at,
                });
                self.cancelled_at.get_or_insert(*at);
            }
            BillingEvent::PaymentSucceeded { .. } => {}
        }
        true
    }

    /// An event without an id, or a record without one, is always ours.
    fn tracks(&self, subscription_id: Option<&str>) -> bool {
        match (subscription_id, self.payment_subscription_id.as_deref()) {
            (Some(event_id), Some(current)) => event_id == current,
            _ => true,
        }
    }
}
