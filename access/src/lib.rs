//! Pure domain logic for premium access and delegate attribution.
//!
//! Nothing in this crate performs I/O: callers fetch records first and hand
//! them in, together with the current timestamp.

pub mod attribution;
pub mod billing;
pub mod record;
pub mod resolver;

pub use attribution::{ActorRef, Owner, SharedUser, resolve_display_name};
pub use billing::BillingEvent;
pub use record::{SubscriptionRecord, SubscriptionTier, TRIAL_LENGTH_DAYS};
pub use resolver::{AccessLevel, AccessState, resolve_access, resolve_access_for};
