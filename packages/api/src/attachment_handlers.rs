// ABOUTME: HTTP request handlers for RFQ item attachments
// ABOUTME: Multipart upload with extension/size/quota checks, download, delete

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue},
    Json,
};
use tracing::info;

use procura_core::constants::ALLOWED_ATTACHMENT_EXTENSIONS;
use procura_core::types::{Attachment, AuditAction};
use procura_storage::AttachmentCreateInput;

use crate::auth::CurrentBuyer;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

fn extension_of(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

fn extension_allowed(filename: &str) -> bool {
    extension_of(filename)
        .map(|ext| ALLOWED_ATTACHMENT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Upload one file for an RFQ item. The file part must be named `file` and
/// carry a filename.
pub async fn upload_attachment(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(item_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Attachment>>, AppError> {
    if state.rfqs.get_item(&buyer.id, &item_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let mut upload: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .ok_or_else(|| AppError::Validation("File part needs a filename".to_string()))?
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((filename, content_type, bytes.to_vec()));
        break;
    }

    let (filename, content_type, bytes) =
        upload.ok_or_else(|| AppError::Validation("Missing file part".to_string()))?;

    if !extension_allowed(&filename) {
        return Err(AppError::Validation(format!(
            "File type not allowed: {filename}"
        )));
    }
    if bytes.is_empty() {
        return Err(AppError::Validation("Empty file".to_string()));
    }
    if bytes.len() as i64 > state.limits.max_file_bytes {
        return Err(AppError::Validation(format!(
            "File exceeds the {} byte limit",
            state.limits.max_file_bytes
        )));
    }

    let used = state.attachments.total_size_for_buyer(&buyer.id).await?;
    if used + bytes.len() as i64 > state.limits.quota_bytes {
        return Err(AppError::Validation(
            "Attachment storage quota exceeded".to_string(),
        ));
    }

    let stored = state.blobs.put(&item_id, &filename, &bytes).await?;
    let attachment = state
        .attachments
        .insert(AttachmentCreateInput {
            rfq_item_id: item_id.clone(),
            stored_path: stored.rel_path,
            original_filename: filename,
            file_size: stored.size,
            content_type,
            checksum: stored.checksum,
            uploaded_by: buyer.account_id.clone(),
        })
        .await?;

    info!(
        attachment_id = %attachment.id,
        item_id = %item_id,
        size = attachment.file_size,
        "Attachment stored"
    );

    state
        .audit
        .record_best_effort(
            &buyer.id,
            AuditAction::FileUpload,
            "attachment",
            &attachment.id,
            Some(&attachment.original_filename),
        )
        .await;

    Ok(Json(ApiResponse::success(attachment)))
}

pub async fn list_attachments(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Attachment>>>, AppError> {
    if state.rfqs.get_item(&buyer.id, &item_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let attachments = state.attachments.list_by_item(&item_id).await?;
    Ok(Json(ApiResponse::success(attachments)))
}

/// Stream the stored bytes back with the original content type and filename
pub async fn download_attachment(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(attachment_id): Path<String>,
) -> Result<(HeaderMap, Body), AppError> {
    let attachment = state
        .attachments
        .get_for_buyer(&buyer.id, &attachment_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let bytes = state.blobs.read(&attachment.stored_path).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&attachment.content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment.original_filename.replace('"', "_")
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or(HeaderValue::from_static("attachment")),
    );

    Ok((headers, Body::from(bytes)))
}

pub async fn delete_attachment(
    State(state): State<AppState>,
    CurrentBuyer(buyer): CurrentBuyer,
    Path(attachment_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let attachment = state
        .attachments
        .get_for_buyer(&buyer.id, &attachment_id)
        .await?
        .ok_or(AppError::NotFound)?;

    state.attachments.delete(&attachment.id).await?;
    // The metadata row is gone; the blob removal is best-effort
    state.blobs.delete(&attachment.stored_path).await;

    info!(attachment_id = %attachment.id, "Attachment deleted");

    state
        .audit
        .record_best_effort(
            &buyer.id,
            AuditAction::FileDelete,
            "attachment",
            &attachment.id,
            Some(&attachment.original_filename),
        )
        .await;

    Ok(Json(ApiResponse::success(
        serde_json::json!({"message": "Attachment deleted"}),
    )))
}
