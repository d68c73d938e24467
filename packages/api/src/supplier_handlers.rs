// ABOUTME: HTTP request handlers for supplier management
// ABOUTME: Tenant-scoped CRUD, category listing, bulk import, and stats

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use procura_core::types::{AuditAction, Supplier, SupplierCreateInput, SupplierUpdateInput};
use procura_core::validation::validate_supplier_input;
use procura_storage::SupplierStats;

use crate::auth::CurrentBuyer;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

pub async fn create_supplier(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Json(input): Json<SupplierCreateInput>,
) -> Result<Json<ApiResponse<Supplier>>, AppError> {
    validate_supplier_input(&input)?;

    if state.suppliers.email_exists(&buyer.id, &input.email).await? {
        return Err(AppError::Conflict(
            "A supplier with this email already exists".to_string(),
        ));
    }

    let supplier = state.suppliers.create_supplier(&buyer.id, &input).await?;
    info!(supplier_id = %supplier.id, buyer_id = %buyer.id, "Supplier created");

    Ok(Json(ApiResponse::success(supplier)))
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
) -> Result<Json<ApiResponse<Vec<Supplier>>>, AppError> {
    let suppliers = state.suppliers.list_suppliers(&buyer.id).await?;
    Ok(Json(ApiResponse::success(suppliers)))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(supplier_id): Path<String>,
    Json(input): Json<SupplierUpdateInput>,
) -> Result<Json<ApiResponse<Supplier>>, AppError> {
    if input.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }
    if let Some(email) = &input.email {
        if !email.contains('@') {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }
        if state
            .suppliers
            .email_in_use_by_other(&buyer.id, email, &supplier_id)
            .await?
        {
            return Err(AppError::Conflict(
                "A supplier with this email already exists".to_string(),
            ));
        }
    }

    // The unique index backstops races between the pre-check and the write
    let supplier = match state
        .suppliers
        .update_supplier(&buyer.id, &supplier_id, &input)
        .await
    {
        Ok(supplier) => supplier,
        Err(e) if e.is_unique_violation() => {
            return Err(AppError::Conflict(
                "A supplier with this email already exists".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    }
    .ok_or(AppError::NotFound)?;

    Ok(Json(ApiResponse::success(supplier)))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(supplier_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let deleted = state.suppliers.soft_delete(&buyer.id, &supplier_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    info!(supplier_id = %supplier_id, buyer_id = %buyer.id, "Supplier soft-deleted");

    Ok(Json(ApiResponse::success(
        serde_json::json!({"message": "Supplier deleted"}),
    )))
}

pub async fn list_categories(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let names = state.suppliers.active_category_names(&buyer.id).await?;
    Ok(Json(ApiResponse::success(names)))
}

pub async fn supplier_stats(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
) -> Result<Json<ApiResponse<Vec<SupplierStats>>>, AppError> {
    let stats = state.suppliers.supplier_stats(&buyer.id).await?;
    Ok(Json(ApiResponse::success(stats)))
}

#[derive(Deserialize)]
pub struct ImportRequest {
    pub suppliers: Vec<SupplierCreateInput>,
}

#[derive(Serialize)]
pub struct ImportRowError {
    pub row: usize,
    pub error: String,
}

#[derive(Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<ImportRowError>,
}

/// Bulk supplier import. Rows fail independently; a per-row error report
/// comes back alongside the import count.
pub async fn import_suppliers(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ApiResponse<ImportReport>>, AppError> {
    if request.suppliers.is_empty() {
        return Err(AppError::Validation("No suppliers to import".to_string()));
    }

    let mut imported = 0;
    let mut errors = Vec::new();

    for (row, input) in request.suppliers.iter().enumerate() {
        if let Err(e) = validate_supplier_input(input) {
            errors.push(ImportRowError {
                row,
                error: e.to_string(),
            });
            continue;
        }
        if state.suppliers.email_exists(&buyer.id, &input.email).await? {
            errors.push(ImportRowError {
                row,
                error: format!("Duplicate supplier email: {}", input.email),
            });
            continue;
        }
        state.suppliers.create_supplier(&buyer.id, input).await?;
        imported += 1;
    }

    info!(
        buyer_id = %buyer.id,
        imported,
        failed = errors.len(),
        "Supplier import finished"
    );

    state
        .audit
        .record_best_effort(
            &buyer.id,
            AuditAction::SupplierImport,
            "supplier",
            "bulk",
            Some(&format!("imported {imported}, failed {}", errors.len())),
        )
        .await;

    Ok(Json(ApiResponse::success(ImportReport { imported, errors })))
}
