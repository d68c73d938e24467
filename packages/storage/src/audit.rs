// ABOUTME: Audit log storage for sensitive actions
// ABOUTME: File uploads/deletes, placed orders, and bulk imports are recorded

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::warn;

use procura_core::generate_id;
use procura_core::types::{AuditAction, AuditLog};

use crate::error::StorageError;

pub struct AuditStorage {
    pool: SqlitePool,
}

impl AuditStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        buyer_id: &str,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        detail: Option<&str>,
    ) -> Result<AuditLog, StorageError> {
        let id = generate_id();

        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, buyer_id, action, resource_type, resource_id, detail, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(buyer_id)
        .bind(action.as_str())
        .bind(resource_type)
        .bind(resource_id)
        .bind(detail)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(&id).await?.ok_or(StorageError::NotFound)
    }

    /// Best-effort variant used from request paths where audit failure must
    /// not fail the triggering operation.
    pub async fn record_best_effort(
        &self,
        buyer_id: &str,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        detail: Option<&str>,
    ) {
        if let Err(e) = self
            .record(buyer_id, action, resource_type, resource_id, detail)
            .await
        {
            warn!(error = %e, action = action.as_str(), "Failed to write audit log entry");
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<AuditLog>, StorageError> {
        let row = sqlx::query("SELECT * FROM audit_logs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| self.row_to_log(&row)).transpose()
    }

    pub async fn list_for_buyer(&self, buyer_id: &str) -> Result<Vec<AuditLog>, StorageError> {
        let rows =
            sqlx::query("SELECT * FROM audit_logs WHERE buyer_id = ? ORDER BY created_at DESC")
                .bind(buyer_id)
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(|row| self.row_to_log(row)).collect()
    }

    pub async fn exists(
        &self,
        buyer_id: &str,
        action: AuditAction,
        resource_id: &str,
    ) -> Result<bool, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_logs WHERE buyer_id = ? AND action = ? AND resource_id = ?",
        )
        .bind(buyer_id)
        .bind(action.as_str())
        .bind(resource_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    fn row_to_log(&self, row: &sqlx::sqlite::SqliteRow) -> Result<AuditLog, StorageError> {
        let action: String = row.try_get("action")?;
        Ok(AuditLog {
            id: row.try_get("id")?,
            buyer_id: row.try_get("buyer_id")?,
            action: AuditAction::parse(&action)
                .ok_or_else(|| StorageError::Decode(format!("audit action: {action}")))?,
            resource_type: row.try_get("resource_type")?,
            resource_id: row.try_get("resource_id")?,
            detail: row.try_get("detail")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
