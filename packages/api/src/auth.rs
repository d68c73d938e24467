// ABOUTME: API token authentication middleware and request identity
// ABOUTME: Resolves X-API-Token to the calling account and its buyer

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use procura_core::types::{Account, Buyer};

use crate::error::AppError;
use crate::state::AppState;

/// Header name for API token
pub const API_TOKEN_HEADER: &str = "X-API-Token";

/// Paths that don't require authentication. `/api/rfq-response` is the
/// supplier-facing surface; suppliers have no accounts.
pub const PUBLIC_PATHS: &[&str] = &[
    "/api/health",
    "/api/auth/login",
    "/api/auth/signup",
    "/api/rfq-response",
];

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|&public| path.starts_with(public))
}

/// Authenticated caller stored in request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct Identity {
    pub account: Account,
    pub buyer: Buyer,
}

/// API token validation middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path();

    if is_public(path) {
        debug!(path = %path, "Public path, skipping token validation");
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(API_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    let Some(token) = token else {
        warn!(path = %path, "Missing API token");
        return Err(AppError::Unauthorized {
            message: "API token required. Please include X-API-Token header.".to_string(),
        });
    };

    let account = state
        .accounts
        .verify_token(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid API token".to_string(),
        })?;

    let buyer = state
        .buyers
        .get_by_account(&account.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "No buyer profile for this account".to_string(),
        })?;

    debug!(path = %path, account_id = %account.id, "API token validated");

    let mut request = request;
    request.extensions_mut().insert(Identity { account, buyer });

    Ok(next.run(request).await)
}

/// Extractor for the authenticated buyer profile
#[derive(Debug, Clone)]
pub struct CurrentBuyer(pub Buyer);

impl<S> FromRequestParts<S> for CurrentBuyer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .map(|identity| CurrentBuyer(identity.buyer.clone()))
            .ok_or_else(|| AppError::Unauthorized {
                message: "Authentication required".to_string(),
            })
    }
}

/// Extractor for the authenticated account
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .map(|identity| CurrentAccount(identity.account.clone()))
            .ok_or_else(|| AppError::Unauthorized {
                message: "Authentication required".to_string(),
            })
    }
}
