// ABOUTME: Attachment metadata storage layer using SQLite
// ABOUTME: Rows are immutable once written; quota accounting reads live here

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use procura_core::generate_id;
use procura_core::types::Attachment;

use crate::error::StorageError;

pub struct AttachmentCreateInput {
    pub rfq_item_id: String,
    pub stored_path: String,
    pub original_filename: String,
    pub file_size: i64,
    pub content_type: String,
    pub checksum: String,
    pub uploaded_by: String,
}

pub struct AttachmentStorage {
    pool: SqlitePool,
}

impl AttachmentStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, input: AttachmentCreateInput) -> Result<Attachment, StorageError> {
        let id = generate_id();

        sqlx::query(
            r#"
            INSERT INTO attachments (
                id, rfq_item_id, stored_path, original_filename, file_size,
                content_type, checksum, uploaded_by, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.rfq_item_id)
        .bind(&input.stored_path)
        .bind(&input.original_filename)
        .bind(input.file_size)
        .bind(&input.content_type)
        .bind(&input.checksum)
        .bind(&input.uploaded_by)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(&id).await?.ok_or(StorageError::NotFound)
    }

    pub async fn get(&self, attachment_id: &str) -> Result<Option<Attachment>, StorageError> {
        let row = sqlx::query("SELECT * FROM attachments WHERE id = ?")
            .bind(attachment_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| self.row_to_attachment(&row)).transpose()
    }

    /// Attachment scoped through item and RFQ to the owning buyer
    pub async fn get_for_buyer(
        &self,
        buyer_id: &str,
        attachment_id: &str,
    ) -> Result<Option<Attachment>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT a.* FROM attachments a
            JOIN rfq_items i ON i.id = a.rfq_item_id
            JOIN rfqs r ON r.id = i.rfq_id
            WHERE a.id = ? AND r.buyer_id = ?
            "#,
        )
        .bind(attachment_id)
        .bind(buyer_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| self.row_to_attachment(&row)).transpose()
    }

    pub async fn list_by_item(&self, rfq_item_id: &str) -> Result<Vec<Attachment>, StorageError> {
        let rows = sqlx::query("SELECT * FROM attachments WHERE rfq_item_id = ? ORDER BY created_at")
            .bind(rfq_item_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(|row| self.row_to_attachment(row)).collect()
    }

    pub async fn delete(&self, attachment_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = ?")
            .bind(attachment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Cumulative stored bytes across all of a buyer's RFQ items
    pub async fn total_size_for_buyer(&self, buyer_id: &str) -> Result<i64, StorageError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(a.file_size), 0)
            FROM attachments a
            JOIN rfq_items i ON i.id = a.rfq_item_id
            JOIN rfqs r ON r.id = i.rfq_id
            WHERE r.buyer_id = ?
            "#,
        )
        .bind(buyer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    fn row_to_attachment(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Attachment, StorageError> {
        Ok(Attachment {
            id: row.try_get("id")?,
            rfq_item_id: row.try_get("rfq_item_id")?,
            stored_path: row.try_get("stored_path")?,
            original_filename: row.try_get("original_filename")?,
            file_size: row.try_get("file_size")?,
            content_type: row.try_get("content_type")?,
            checksum: row.try_get("checksum")?,
            uploaded_by: row.try_get("uploaded_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
