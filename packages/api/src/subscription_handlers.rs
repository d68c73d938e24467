// ABOUTME: HTTP request handlers for subscription status and health
// ABOUTME: Gate-exempt status endpoint used by the client's renewal prompts

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use procura_core::types::OnboardingVariant;
use procura_subscription::{classify, SubscriptionStatus};

use crate::auth::CurrentBuyer;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SubscriptionStatusPayload {
    pub is_active: bool,
    pub in_grace: bool,
    pub subscription_expired: bool,
    pub variant: OnboardingVariant,
    pub expiry: DateTime<Utc>,
}

pub async fn subscription_status(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
) -> Result<Json<ApiResponse<SubscriptionStatusPayload>>, AppError> {
    let status = classify(
        Utc::now(),
        buyer.subscription_expiry,
        state.subscription.grace_period(),
    );

    Ok(Json(ApiResponse::success(SubscriptionStatusPayload {
        is_active: status == SubscriptionStatus::Active,
        in_grace: status == SubscriptionStatus::Grace,
        subscription_expired: status == SubscriptionStatus::Expired,
        variant: buyer.onboarding_variant,
        expiry: buyer.subscription_expiry,
    })))
}

pub async fn health() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(serde_json::json!({"status": "ok"})))
}
