// ABOUTME: Deterministic A/B bucketing for onboarding variants
// ABOUTME: sha256 of the identifier, last four digest bytes mod 100

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use procura_core::constants::DEFAULT_TRIAL_DAYS;
use procura_core::types::OnboardingVariant;

/// Pick the onboarding variant for a stable identifier. Pure: the same
/// identifier and percentage always map to the same variant.
pub fn pick_variant(identifier: &str, paywall_percent: u8) -> OnboardingVariant {
    let percent = paywall_percent.min(100);
    if percent == 0 {
        return OnboardingVariant::TrialFirst;
    }
    if percent >= 100 {
        return OnboardingVariant::PaywallFirst;
    }

    let digest = Sha256::digest(identifier.as_bytes());
    let tail: [u8; 4] = digest[digest.len() - 4..]
        .try_into()
        .expect("sha256 digest is 32 bytes");
    let bucket = u32::from_be_bytes(tail) % 100;

    if bucket < u32::from(percent) {
        OnboardingVariant::PaywallFirst
    } else {
        OnboardingVariant::TrialFirst
    }
}

/// Subscription expiry granted at signup. Paywall-first accounts are gated
/// immediately; trial-first accounts get the configured trial window.
pub fn initial_expiry(
    variant: OnboardingVariant,
    now: DateTime<Utc>,
    trial_days: i64,
) -> DateTime<Utc> {
    match variant {
        OnboardingVariant::PaywallFirst => now,
        OnboardingVariant::TrialFirst => {
            let days = if trial_days > 0 {
                trial_days
            } else {
                DEFAULT_TRIAL_DAYS
            };
            now + Duration::days(days)
        }
    }
}
