// ABOUTME: Subscription expiry classification used by the request gate
// ABOUTME: Active / Grace / Expired over (now, expiry, grace period)

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use procura_core::constants::{
    DEFAULT_GRACE_PERIOD_DAYS, DEFAULT_PAYWALL_PERCENT, DEFAULT_TRIAL_DAYS,
};

/// Subscription knobs, threaded in explicitly so the gate and variant
/// helpers stay pure and testable.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionConfig {
    pub grace_period_days: i64,
    pub paywall_percent: u8,
    pub trial_days: i64,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            grace_period_days: DEFAULT_GRACE_PERIOD_DAYS,
            paywall_percent: DEFAULT_PAYWALL_PERCENT,
            trial_days: DEFAULT_TRIAL_DAYS,
        }
    }
}

impl SubscriptionConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::days(self.grace_period_days.max(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Inside the paid (or trial) window
    Active,
    /// Past expiry but within the grace period; requests pass with a warning
    Grace,
    /// Past expiry and grace; requests are rejected
    Expired,
}

/// Classify a request instant against a buyer's subscription expiry.
/// Boundaries are inclusive: `now == expiry` is Active and
/// `now == expiry + grace` is still Grace.
pub fn classify(
    now: DateTime<Utc>,
    expiry: DateTime<Utc>,
    grace: Duration,
) -> SubscriptionStatus {
    if now <= expiry {
        SubscriptionStatus::Active
    } else if now <= expiry + grace {
        SubscriptionStatus::Grace
    } else {
        SubscriptionStatus::Expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grace() -> Duration {
        Duration::days(3)
    }

    #[test]
    fn test_one_second_before_expiry_is_active() {
        let expiry = Utc::now();
        let now = expiry - Duration::seconds(1);
        assert_eq!(classify(now, expiry, grace()), SubscriptionStatus::Active);
    }

    #[test]
    fn test_expiry_instant_is_active() {
        let expiry = Utc::now();
        assert_eq!(classify(expiry, expiry, grace()), SubscriptionStatus::Active);
    }

    #[test]
    fn test_half_way_through_grace() {
        let expiry = Utc::now();
        let now = expiry + Duration::hours(36);
        assert_eq!(classify(now, expiry, grace()), SubscriptionStatus::Grace);
    }

    #[test]
    fn test_one_second_past_grace_is_expired() {
        let expiry = Utc::now();
        let now = expiry + grace() + Duration::seconds(1);
        assert_eq!(classify(now, expiry, grace()), SubscriptionStatus::Expired);
    }

    #[test]
    fn test_grace_boundary_is_inclusive() {
        let expiry = Utc::now();
        let now = expiry + grace();
        assert_eq!(classify(now, expiry, grace()), SubscriptionStatus::Grace);
    }

    #[test]
    fn test_negative_grace_days_clamp_to_zero() {
        let config = SubscriptionConfig {
            grace_period_days: -5,
            ..Default::default()
        };
        assert_eq!(config.grace_period(), Duration::zero());
    }
}
