// ABOUTME: HTTP request handlers for signup, login, and account details
// ABOUTME: Signup assigns the onboarding variant and initial subscription expiry

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use procura_core::types::OnboardingVariant;
use procura_notify::{Notification, Template};
use procura_storage::BuyerCreateInput;
use procura_subscription::{initial_expiry, pick_variant};

use crate::auth::CurrentAccount;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(rename = "companyName")]
    pub company_name: Option<String>,
    #[serde(rename = "phoneNo")]
    pub phone_no: Option<String>,
    #[serde(rename = "gstNo")]
    pub gst_no: Option<String>,
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub email: String,
    pub name: String,
    pub variant: OnboardingVariant,
    pub subscription_expiry: DateTime<Utc>,
}

/// Create an account plus buyer profile and return a fresh API token
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>, AppError> {
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if request.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let variant = pick_variant(&request.email, state.subscription.paywall_percent);
    let expiry = initial_expiry(variant, Utc::now(), state.subscription.trial_days);

    let account = match state
        .accounts
        .create_account(&request.email, &request.name, &request.password)
        .await
    {
        Ok(account) => account,
        Err(e) if e.is_unique_violation() => {
            return Err(AppError::Validation(
                "An account with this email already exists".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let buyer = state
        .buyers
        .create_buyer(BuyerCreateInput {
            account_id: account.id.clone(),
            company_name: request.company_name,
            phone_no: request.phone_no,
            gst_no: request.gst_no,
            address: request.address,
            currency: None,
            timezone: None,
            subscription_expiry: expiry,
            onboarding_variant: variant,
        })
        .await?;

    let token = state.accounts.issue_token(&account.id).await?;

    info!(
        account_id = %account.id,
        variant = variant.as_str(),
        "New buyer signed up"
    );

    state.dispatcher.enqueue(Notification::new(
        Template::Welcome,
        vec![account.email.clone()],
        serde_json::json!({ "name": account.name }),
    ));

    Ok(Json(ApiResponse::success(AuthPayload {
        token,
        email: account.email,
        name: account.name,
        variant,
        subscription_expiry: buyer.subscription_expiry,
    })))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>, AppError> {
    let account = state
        .accounts
        .authenticate(&request.email, &request.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid email or password".to_string(),
        })?;

    let buyer = state
        .buyers
        .get_by_account(&account.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "No buyer profile for this account".to_string(),
        })?;

    let token = state.accounts.issue_token(&account.id).await?;

    info!(account_id = %account.id, "Buyer logged in");

    Ok(Json(ApiResponse::success(AuthPayload {
        token,
        email: account.email,
        name: account.name,
        variant: buyer.onboarding_variant,
        subscription_expiry: buyer.subscription_expiry,
    })))
}

#[derive(Serialize)]
pub struct UserDetails {
    pub email: String,
    pub name: String,
    pub is_staff: bool,
}

/// Details of the authenticated caller. Gate-exempt so expired buyers can
/// still see who they are logged in as.
pub async fn user_details(
    CurrentAccount(account): CurrentAccount,
) -> Json<ApiResponse<UserDetails>> {
    Json(ApiResponse::success(UserDetails {
        email: account.email,
        name: account.name,
        is_staff: account.is_staff,
    }))
}
