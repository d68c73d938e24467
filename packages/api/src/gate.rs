// ABOUTME: Subscription gate middleware
// ABOUTME: Blocks expired buyers, warns buyers in grace, bypasses staff

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, info};

use procura_subscription::{classify, SubscriptionStatus};

use crate::auth::{is_public, Identity};
use crate::error::AppError;
use crate::state::AppState;

/// Response header attached while a buyer is inside the grace period
pub const SUBSCRIPTION_WARNING_HEADER: &str = "X-Subscription-Warning";

/// Authenticated paths that must stay reachable after expiry, so the client
/// can show account state and renewal prompts.
pub const GATE_EXEMPT_PATHS: &[&str] = &["/api/subscription-status", "/api/auth/user-details"];

fn is_gate_exempt(path: &str) -> bool {
    GATE_EXEMPT_PATHS
        .iter()
        .any(|&exempt| path.starts_with(exempt))
}

/// Subscription gate. Runs after the auth middleware; relies on the
/// [`Identity`] extension it stores.
pub async fn subscription_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    if is_public(&path) || is_gate_exempt(&path) {
        return Ok(next.run(request).await);
    }

    let Some(identity) = request.extensions().get::<Identity>().cloned() else {
        return Err(AppError::Unauthorized {
            message: "Authentication required".to_string(),
        });
    };

    if identity.account.is_staff {
        debug!(path = %path, "Staff account bypasses subscription gate");
        return Ok(next.run(request).await);
    }

    let status = classify(
        Utc::now(),
        identity.buyer.subscription_expiry,
        state.subscription.grace_period(),
    );

    match status {
        SubscriptionStatus::Active => Ok(next.run(request).await),
        SubscriptionStatus::Grace => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(
                SUBSCRIPTION_WARNING_HEADER,
                HeaderValue::from_static("subscription-in-grace-period"),
            );
            Ok(response)
        }
        SubscriptionStatus::Expired => {
            info!(path = %path, buyer_id = %identity.buyer.id, "Subscription expired, rejecting request");
            Err(AppError::SubscriptionExpired)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exempt_path_matching() {
        assert!(is_gate_exempt("/api/subscription-status"));
        assert!(is_gate_exempt("/api/auth/user-details"));
        assert!(!is_gate_exempt("/api/suppliers"));
        assert!(!is_gate_exempt("/api/rfqs"));
    }
}
