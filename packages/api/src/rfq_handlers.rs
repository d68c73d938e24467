// ABOUTME: HTTP request handlers for RFQs and their items
// ABOUTME: Creation with invites, list with summary meta, item search, metadata

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use procura_core::types::{Attachment, ItemStatus, Rfq, RfqCreateInput, RfqItem, RfqMetadata};
use procura_core::validation::validate_rfq_input;
use procura_notify::{Notification, Template};
use procura_storage::{RfqListEntry, RfqSummary};

use crate::auth::{CurrentAccount, CurrentBuyer};
use crate::error::AppError;
use crate::response::{ApiResponse, ListResponse};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RfqCreated {
    pub rfq: Rfq,
    pub items: Vec<RfqItem>,
}

/// Create an RFQ with items, optional terms, and supplier invites. Every
/// invited supplier gets an invitation notification.
pub async fn create_rfq(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Json(input): Json<RfqCreateInput>,
) -> Result<Json<ApiResponse<RfqCreated>>, AppError> {
    validate_rfq_input(&input)?;

    // Invites must reference the caller's own live suppliers
    for supplier_id in &input.supplier_ids {
        if state
            .suppliers
            .get_supplier(&buyer.id, supplier_id)
            .await?
            .is_none()
        {
            return Err(AppError::Validation(format!(
                "Unknown supplier: {supplier_id}"
            )));
        }
    }

    let (rfq, items) = state.rfqs.create_rfq(&buyer.id, &input).await?;

    info!(rfq_id = %rfq.id, items = items.len(), "RFQ created");

    for supplier in state.rfqs.invited_suppliers(&rfq.id).await? {
        state.dispatcher.enqueue(Notification::new(
            Template::RfqInvitation,
            vec![supplier.email.clone()],
            serde_json::json!({
                "rfq_id": rfq.id,
                "rfq_title": rfq.title,
                "supplier_id": supplier.id,
            }),
        ));
    }

    Ok(Json(ApiResponse::success(RfqCreated { rfq, items })))
}

#[derive(Deserialize)]
pub struct RfqListQuery {
    pub status: Option<String>,
}

pub async fn list_rfqs(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Query(query): Query<RfqListQuery>,
) -> Result<Json<ListResponse<RfqListEntry, RfqSummary>>, AppError> {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(ItemStatus::parse(raw).ok_or_else(|| {
            AppError::Validation(format!("Invalid status filter: {raw}"))
        })?),
    };

    let entries = state.rfqs.list_rfqs(&buyer.id, status).await?;
    let summary = state.rfqs.summary(&buyer.id).await?;

    Ok(Json(ListResponse::new(entries, summary)))
}

#[derive(Deserialize)]
pub struct ItemSearchQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct ItemWithAttachments {
    #[serde(flatten)]
    pub item: RfqItem,
    pub attachments: Vec<Attachment>,
}

pub async fn list_items(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(rfq_id): Path<String>,
    Query(query): Query<ItemSearchQuery>,
) -> Result<Json<ApiResponse<Vec<ItemWithAttachments>>>, AppError> {
    let items = state
        .rfqs
        .list_items(&buyer.id, &rfq_id, query.q.as_deref())
        .await?
        .ok_or(AppError::NotFound)?;

    let mut enriched = Vec::with_capacity(items.len());
    for item in items {
        let attachments = state.attachments.list_by_item(&item.id).await?;
        enriched.push(ItemWithAttachments { item, attachments });
    }

    Ok(Json(ApiResponse::success(enriched)))
}

pub async fn rfq_metadata(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(rfq_id): Path<String>,
) -> Result<Json<ApiResponse<RfqMetadata>>, AppError> {
    if state.rfqs.get_rfq(&buyer.id, &rfq_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let metadata = state.rfqs.metadata(&rfq_id).await?;
    Ok(Json(ApiResponse::success(metadata)))
}

#[derive(Serialize)]
pub struct ExportReport {
    pub rfqs: usize,
    pub items: usize,
    pub recipient: String,
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Mail the caller a CSV export of every RFQ with its items and quotes.
/// The mail itself is fire-and-forget; the response reports what went out.
pub async fn send_rfq_data_file(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    CurrentAccount(account): CurrentAccount,
) -> Result<Json<ApiResponse<ExportReport>>, AppError> {
    let entries = state.rfqs.list_rfqs(&buyer.id, None).await?;

    let mut csv = String::from(
        "rfq_title,product_name,quantity,uom,item_status,supplier_id,price,lead_time,order_status\n",
    );
    let mut item_count = 0;
    for entry in &entries {
        for item in state.rfqs.list_items_unscoped(&entry.id).await? {
            item_count += 1;
            let quotes = state.quotes.list_by_item(&item.id).await?;
            let prefix = format!(
                "{},{},{},{},{}",
                csv_field(&entry.title),
                csv_field(&item.product_name),
                item.quantity,
                csv_field(&item.uom),
                item.status.as_str(),
            );
            if quotes.is_empty() {
                csv.push_str(&format!("{prefix},,,,\n"));
            }
            for quote in quotes {
                let lead_time = quote.lead_time.map(|d| d.to_string()).unwrap_or_default();
                csv.push_str(&format!(
                    "{prefix},{},{},{},{}\n",
                    quote.supplier_id,
                    quote.price,
                    lead_time,
                    quote.order_status.as_str(),
                ));
            }
        }
    }

    info!(buyer_id = %buyer.id, rfqs = entries.len(), items = item_count, "RFQ data export queued");

    state.dispatcher.enqueue(Notification::new(
        Template::RfqDataExport,
        vec![account.email.clone()],
        serde_json::json!({
            "filename": "rfq-data.csv",
            "content": csv,
        }),
    ));

    Ok(Json(ApiResponse::success(ExportReport {
        rfqs: entries.len(),
        items: item_count,
        recipient: account.email,
    })))
}

/// Distinct units of measure, for the item form's autocompletion
pub async fn list_uoms(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let values = state.rfqs.distinct_uoms(&buyer.id).await?;
    Ok(Json(ApiResponse::success(values)))
}

/// Distinct product names, for the item form's autocompletion
pub async fn list_products(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let values = state.rfqs.distinct_products(&buyer.id).await?;
    Ok(Json(ApiResponse::success(values)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("M4 screws"), "M4 screws");
        assert_eq!(csv_field("bolts, zinc"), "\"bolts, zinc\"");
        assert_eq!(csv_field("2\" pipe"), "\"2\"\" pipe\"");
    }
}
