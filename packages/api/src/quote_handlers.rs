// ABOUTME: HTTP request handlers for quotes and order placement
// ABOUTME: Public supplier response page plus buyer-side lifecycle operations

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use procura_core::types::{Quote, QuoteSubmission, RfqItem, RfqMetadata, Supplier};
use procura_lifecycle::SubmitOutcome;

use crate::auth::CurrentBuyer;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// One item on the supplier response page, with the supplier's own prior
/// response merged in when present
#[derive(Serialize)]
pub struct ResponseItem {
    #[serde(flatten)]
    pub item: RfqItem,
    pub responded: bool,
    pub supplier_price: Option<f64>,
    pub supplier_quantity: Option<f64>,
    pub supplier_lead_time: Option<i64>,
    pub supplier_remarks: Option<String>,
}

#[derive(Serialize)]
pub struct ResponsePage {
    pub rfq_id: String,
    pub rfq_title: String,
    pub metadata: RfqMetadata,
    pub items: Vec<ResponseItem>,
}

/// Data for the public supplier response page. Unauthenticated: possession
/// of the (rfq, supplier) link is the access grant, and the invite is checked.
pub async fn response_page(
    State(state): State<AppState>,
    Path((rfq_id, supplier_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ResponsePage>>, AppError> {
    let rfq = state
        .rfqs
        .get_rfq_unscoped(&rfq_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !state.rfqs.is_supplier_invited(&rfq_id, &supplier_id).await? {
        return Err(AppError::NotFound);
    }

    let metadata = state.rfqs.metadata(&rfq_id).await?;
    let items = state.rfqs.list_items_unscoped(&rfq_id).await?;

    let mut merged = Vec::with_capacity(items.len());
    for item in items {
        let existing = state
            .quotes
            .find_by_item_and_supplier(&item.id, &supplier_id)
            .await?;
        merged.push(match existing {
            Some(quote) => ResponseItem {
                item,
                responded: true,
                supplier_price: Some(quote.price),
                supplier_quantity: Some(quote.quantity),
                supplier_lead_time: quote.lead_time,
                supplier_remarks: quote.remarks,
            },
            None => ResponseItem {
                item,
                responded: false,
                supplier_price: None,
                supplier_quantity: None,
                supplier_lead_time: None,
                supplier_remarks: None,
            },
        });
    }

    Ok(Json(ApiResponse::success(ResponsePage {
        rfq_id: rfq.id,
        rfq_title: rfq.title,
        metadata,
        items: merged,
    })))
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub quote: Quote,
    pub created: bool,
}

/// Public quote submission from the supplier response page
pub async fn submit_quote(
    State(state): State<AppState>,
    Json(submission): Json<QuoteSubmission>,
) -> Result<Json<ApiResponse<SubmitResponse>>, AppError> {
    let SubmitOutcome { quote, created } = state.engine.submit_quote(&submission).await?;

    Ok(Json(ApiResponse::success(SubmitResponse { quote, created })))
}

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(rename = "quoteId")]
    pub quote_id: String,
}

#[derive(Serialize)]
pub struct PlaceOrderResponse {
    pub quote: Quote,
    pub item: RfqItem,
}

pub async fn place_order(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(item_id): Path<String>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<ApiResponse<PlaceOrderResponse>>, AppError> {
    let placed = state
        .engine
        .place_order(&buyer.id, &item_id, &request.quote_id)
        .await?;

    info!(item_id = %item_id, quote_id = %request.quote_id, "Order placed");

    Ok(Json(ApiResponse::success(PlaceOrderResponse {
        quote: placed.quote,
        item: placed.item,
    })))
}

/// Quotes received for one item, for the buyer's comparison view
pub async fn list_item_quotes(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Quote>>>, AppError> {
    if state.rfqs.get_item(&buyer.id, &item_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let quotes = state.quotes.list_by_item(&item_id).await?;
    Ok(Json(ApiResponse::success(quotes)))
}

pub async fn unresponded_suppliers(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Supplier>>>, AppError> {
    let suppliers = state
        .engine
        .list_unresponded_suppliers(&buyer.id, &item_id)
        .await?;

    Ok(Json(ApiResponse::success(suppliers)))
}

#[derive(Serialize)]
pub struct ReminderReport {
    pub reminded: usize,
}

pub async fn send_reminders(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(rfq_id): Path<String>,
) -> Result<Json<ApiResponse<ReminderReport>>, AppError> {
    let reminded = state.engine.send_reminders(&buyer.id, &rfq_id).await?;

    info!(rfq_id = %rfq_id, reminded, "Reminders enqueued");

    Ok(Json(ApiResponse::success(ReminderReport { reminded })))
}
