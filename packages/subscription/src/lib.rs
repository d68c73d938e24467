// ABOUTME: Subscription gating and A/B onboarding variant assignment
// ABOUTME: Pure functions over an explicit config object, no ambient state

pub mod gate;
pub mod variant;

pub use gate::{classify, SubscriptionConfig, SubscriptionStatus};
pub use variant::{initial_expiry, pick_variant};
