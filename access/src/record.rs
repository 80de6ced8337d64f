use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Length of the trial window granted on sign-up confirmation.
pub const TRIAL_LENGTH_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionTier {
    Trial,
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Trial => "Trial",
            SubscriptionTier::Premium => "Premium",
        }
    }

    /// Unknown labels are dropped rather than rejected.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Trial" => Some(SubscriptionTier::Trial),
            "Premium" => Some(SubscriptionTier::Premium),
            _ => None,
        }
    }
}

/// Per-user subscription state, one row per user.
///
/// Timestamps decoded from JSON go through a lenient decoder: a value that
/// cannot be read as a timestamp becomes `None`, which the resolver treats as
/// "not active".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub user_id: Uuid,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub trial_start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub trial_end: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub subscription_start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub subscription_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subscribed: bool,
    #[serde(default, deserialize_with = "lenient_tier")]
    pub subscription_tier: Option<SubscriptionTier>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_subscription_id: Option<String>,
}

impl SubscriptionRecord {
    /// Record for a user that never had a trial nor a paid term.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            trial_start: None,
            trial_end: None,
            subscription_start: None,
            subscription_end: None,
            subscribed: false,
            subscription_tier: None,
            cancelled_at: None,
            payment_subscription_id: None,
        }
    }

    /// Fresh record with the trial window opened at `now`.
    pub fn start_trial(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            trial_start: Some(now),
            trial_end: Some(now + Duration::days(TRIAL_LENGTH_DAYS)),
            subscription_tier: Some(SubscriptionTier::Trial),
            ..Self::empty(user_id)
        }
    }

    pub fn has_trial(&self) -> bool {
        self.trial_start.is_some() || self.trial_end.is_some()
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_timestamp))
}

fn lenient_tier<'de, D>(deserializer: D) -> Result<Option<SubscriptionTier>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(SubscriptionTier::parse))
}

/// Accepts RFC 3339 strings, naive `YYYY-MM-DD HH:MM:SS` strings (read as UTC)
/// and unix seconds.
pub fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        serde_json::Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}
