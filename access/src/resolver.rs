use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::SubscriptionRecord;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Effective access level, the externally visible status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    None,
    Trial,
    Premium,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::None => "none",
            AccessLevel::Trial => "trial",
            AccessLevel::Premium => "premium",
        }
    }

    pub fn has_access(&self) -> bool {
        !matches!(self, AccessLevel::None)
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessState {
    pub access_level: AccessLevel,
    pub days_remaining: i64,
    pub is_trial_active: bool,
}

impl AccessState {
    pub const NONE: AccessState = AccessState {
        access_level: AccessLevel::None,
        days_remaining: 0,
        is_trial_active: false,
    };
}

/// Derives the effective access state of `record` at `now`.
///
/// Paid access wins over an active trial. Under `premium` the remaining days
/// count towards the later of `subscription_end` and a still running
/// `trial_end`, since access lasts until both are over (0 when the paid term
/// is open-ended). Under `trial` they count towards `trial_end`.
pub fn resolve_access(record: &SubscriptionRecord, now: DateTime<Utc>) -> AccessState {
    let is_trial_active = record.trial_end.is_some_and(|end| now < end);
    let has_paid_access =
        record.subscribed && record.subscription_end.is_none_or(|end| now < end);

    if has_paid_access {
        let access_end = match (record.subscription_end, record.trial_end) {
            (Some(paid), Some(trial)) if is_trial_active => Some(paid.max(trial)),
            (paid, _) => paid,
        };
        AccessState {
            access_level: AccessLevel::Premium,
            days_remaining: access_end.map_or(0, |end| days_until(end, now)),
            is_trial_active,
        }
    } else if is_trial_active {
        AccessState {
            access_level: AccessLevel::Trial,
            days_remaining: record.trial_end.map_or(0, |end| days_until(end, now)),
            is_trial_active,
        }
    } else {
        AccessState::NONE
    }
}

/// Same as [`resolve_access`], a user without any record has no access.
pub fn resolve_access_for(record: Option<&SubscriptionRecord>, now: DateTime<Utc>) -> AccessState {
    record.map_or(AccessState::NONE, |r| resolve_access(r, now))
}

/// Whole days left until `end`, rounded up. Never negative.
fn days_until(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (end - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}
