use access::{AccessState, SubscriptionRecord};
use serde::{Deserialize, Serialize};

use crate::models::sub::SubscriptionPlan;

#[derive(Debug, Deserialize)]
pub struct SubscriptionCreateRequest {
    /// Falls back to the configured premium price.
    pub price_id: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AccessStatusResponse {
    pub access: AccessState,
    pub cancel_pending: bool,
    /// A trial can only be granted once per user.
    pub trial_used: bool,
    pub subscription: Option<SubscriptionRecord>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionPlansResponse {
    pub plans: Vec<SubscriptionPlan>,
}
