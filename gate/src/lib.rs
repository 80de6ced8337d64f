use middleware::{global::GlobalLimiter, premium::PremiumGate};

pub mod middleware {
    pub mod global;
    pub mod premium;
}

pub fn global_middleware(permits_per_second: u32) -> GlobalLimiter {
    GlobalLimiter::new(permits_per_second)
}

/// Lets through callers whose access level is `trial` or `premium`.
pub fn premium_middleware() -> PremiumGate {
    PremiumGate::new()
}
