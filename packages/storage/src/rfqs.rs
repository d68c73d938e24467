// ABOUTME: RFQ, RFQ item, and RFQ metadata storage layer using SQLite
// ABOUTME: Creation is transactional across rfq, metadata, items, and invites

use chrono::Utc;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use procura_core::generate_id;
use procura_core::types::{ItemStatus, Rfq, RfqCreateInput, RfqItem, RfqMetadata, Supplier};

use crate::error::StorageError;

/// One row of the RFQ list endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RfqListEntry {
    pub id: String,
    pub title: String,
    pub item_count: i64,
    pub open_items: i64,
    pub created_at: chrono::DateTime<Utc>,
}

/// Buyer-wide totals attached to the RFQ list as meta
#[derive(Debug, Clone, Serialize)]
pub struct RfqSummary {
    pub total_rfqs: i64,
    pub total_items: i64,
    pub open_items: i64,
}

pub struct RfqStorage {
    pool: SqlitePool,
}

impl RfqStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an RFQ together with its metadata, items, and supplier invites
    pub async fn create_rfq(
        &self,
        buyer_id: &str,
        input: &RfqCreateInput,
    ) -> Result<(Rfq, Vec<RfqItem>), StorageError> {
        let rfq_id = generate_id();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO rfqs (id, buyer_id, title, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&rfq_id)
        .bind(buyer_id)
        .bind(&input.title)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if let Some(metadata) = &input.metadata {
            sqlx::query(
                r#"
                INSERT INTO rfq_metadata (rfq_id, terms_conditions, payment_terms, shipping_terms)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&rfq_id)
            .bind(&metadata.terms_conditions)
            .bind(&metadata.payment_terms)
            .bind(&metadata.shipping_terms)
            .execute(&mut *tx)
            .await?;
        }

        let mut item_ids = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let item_id = generate_id();
            sqlx::query(
                r#"
                INSERT INTO rfq_items (
                    id, rfq_id, product_name, quantity, uom, specifications,
                    expected_delivery_date, status, created_at, updated_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, 'open', ?, ?)
                "#,
            )
            .bind(&item_id)
            .bind(&rfq_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(&item.uom)
            .bind(&item.specifications)
            .bind(item.expected_delivery_date)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            item_ids.push(item_id);
        }

        for supplier_id in &input.supplier_ids {
            sqlx::query("INSERT INTO rfq_suppliers (rfq_id, supplier_id) VALUES (?, ?)")
                .bind(&rfq_id)
                .bind(supplier_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(rfq_id = %rfq_id, items = item_ids.len(), "RFQ created");

        let rfq = self
            .get_rfq(buyer_id, &rfq_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        let items = self.items_by_ids(&item_ids).await?;
        Ok((rfq, items))
    }

    pub async fn get_rfq(&self, buyer_id: &str, rfq_id: &str) -> Result<Option<Rfq>, StorageError> {
        let row = sqlx::query("SELECT * FROM rfqs WHERE id = ? AND buyer_id = ?")
            .bind(rfq_id)
            .bind(buyer_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| self.row_to_rfq(&row)).transpose()
    }

    /// Unscoped lookup for the supplier-facing response page; the caller must
    /// check the supplier invite instead of buyer ownership.
    pub async fn get_rfq_unscoped(&self, rfq_id: &str) -> Result<Option<Rfq>, StorageError> {
        let row = sqlx::query("SELECT * FROM rfqs WHERE id = ?")
            .bind(rfq_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| self.row_to_rfq(&row)).transpose()
    }

    /// RFQ list. With a status filter, only RFQs having at least one item in
    /// that status are returned.
    pub async fn list_rfqs(
        &self,
        buyer_id: &str,
        status: Option<ItemStatus>,
    ) -> Result<Vec<RfqListEntry>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.title, r.created_at,
                   COUNT(i.id) AS item_count,
                   COALESCE(SUM(CASE WHEN i.status = 'open' THEN 1 ELSE 0 END), 0) AS open_items
            FROM rfqs r
            LEFT JOIN rfq_items i ON i.rfq_id = r.id
            WHERE r.buyer_id = ?
            GROUP BY r.id, r.title, r.created_at
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let entry = RfqListEntry {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                item_count: row.try_get("item_count")?,
                open_items: row.try_get("open_items")?,
                created_at: row.try_get("created_at")?,
            };
            let include = match status {
                None => true,
                Some(ItemStatus::Open) => entry.open_items > 0,
                Some(ItemStatus::Closed) => entry.item_count > entry.open_items,
            };
            if include {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// Buyer-wide RFQ totals for the list endpoint's meta block
    pub async fn summary(&self, buyer_id: &str) -> Result<RfqSummary, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(DISTINCT r.id) AS total_rfqs,
                   COUNT(i.id) AS total_items,
                   COALESCE(SUM(CASE WHEN i.status = 'open' THEN 1 ELSE 0 END), 0) AS open_items
            FROM rfqs r
            LEFT JOIN rfq_items i ON i.rfq_id = r.id
            WHERE r.buyer_id = ?
            "#,
        )
        .bind(buyer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(RfqSummary {
            total_rfqs: row.try_get("total_rfqs")?,
            total_items: row.try_get("total_items")?,
            open_items: row.try_get("open_items")?,
        })
    }

    /// Items of one RFQ, optionally filtered by a case-insensitive product
    /// name search. Returns None when the RFQ is not owned by the buyer.
    pub async fn list_items(
        &self,
        buyer_id: &str,
        rfq_id: &str,
        search: Option<&str>,
    ) -> Result<Option<Vec<RfqItem>>, StorageError> {
        if self.get_rfq(buyer_id, rfq_id).await?.is_none() {
            return Ok(None);
        }

        let rows = match search {
            Some(q) => {
                let pattern = format!("%{}%", q.to_lowercase());
                sqlx::query(
                    "SELECT * FROM rfq_items WHERE rfq_id = ? AND LOWER(product_name) LIKE ? ORDER BY created_at",
                )
                .bind(rfq_id)
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM rfq_items WHERE rfq_id = ? ORDER BY created_at")
                    .bind(rfq_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let items = rows
            .iter()
            .map(|row| self.row_to_item(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(items))
    }

    /// All items of an RFQ without tenant scoping (supplier response page)
    pub async fn list_items_unscoped(&self, rfq_id: &str) -> Result<Vec<RfqItem>, StorageError> {
        let rows = sqlx::query("SELECT * FROM rfq_items WHERE rfq_id = ? ORDER BY created_at")
            .bind(rfq_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(|row| self.row_to_item(row)).collect()
    }

    /// One item scoped through its RFQ to the owning buyer
    pub async fn get_item(
        &self,
        buyer_id: &str,
        item_id: &str,
    ) -> Result<Option<RfqItem>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT i.* FROM rfq_items i
            JOIN rfqs r ON r.id = i.rfq_id
            WHERE i.id = ? AND r.buyer_id = ?
            "#,
        )
        .bind(item_id)
        .bind(buyer_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| self.row_to_item(&row)).transpose()
    }

    pub async fn get_item_unscoped(&self, item_id: &str) -> Result<Option<RfqItem>, StorageError> {
        let row = sqlx::query("SELECT * FROM rfq_items WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| self.row_to_item(&row)).transpose()
    }

    /// RFQ terms, falling back to "No terms" defaults when never filled in
    pub async fn metadata(&self, rfq_id: &str) -> Result<RfqMetadata, StorageError> {
        let row = sqlx::query("SELECT * FROM rfq_metadata WHERE rfq_id = ?")
            .bind(rfq_id)
            .fetch_optional(&self.pool)
            .await?;

        let defaults = RfqMetadata::no_terms();
        match row {
            Some(row) => Ok(RfqMetadata {
                terms_conditions: row
                    .try_get::<Option<String>, _>("terms_conditions")?
                    .unwrap_or(defaults.terms_conditions),
                payment_terms: row
                    .try_get::<Option<String>, _>("payment_terms")?
                    .unwrap_or(defaults.payment_terms),
                shipping_terms: row
                    .try_get::<Option<String>, _>("shipping_terms")?
                    .unwrap_or(defaults.shipping_terms),
            }),
            None => Ok(defaults),
        }
    }

    pub async fn is_supplier_invited(
        &self,
        rfq_id: &str,
        supplier_id: &str,
    ) -> Result<bool, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM rfq_suppliers WHERE rfq_id = ? AND supplier_id = ?",
        )
        .bind(rfq_id)
        .bind(supplier_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Suppliers invited to an RFQ (live ones only)
    pub async fn invited_suppliers(&self, rfq_id: &str) -> Result<Vec<Supplier>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT s.* FROM suppliers s
            JOIN rfq_suppliers rs ON rs.supplier_id = s.id
            WHERE rs.rfq_id = ? AND s.deleted_at IS NULL
            ORDER BY s.company_name
            "#,
        )
        .bind(rfq_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Supplier {
                    id: row.try_get("id")?,
                    buyer_id: row.try_get("buyer_id")?,
                    company_name: row.try_get("company_name")?,
                    person_of_contact: row.try_get("person_of_contact")?,
                    phone_no: row.try_get("phone_no")?,
                    email: row.try_get("email")?,
                    remark: row.try_get("remark")?,
                    categories: Vec::new(),
                    deleted_at: row.try_get("deleted_at")?,
                    created_at: row.try_get("created_at")?,
                    updated_at: row.try_get("updated_at")?,
                })
            })
            .collect()
    }

    /// Distinct units of measure used by a buyer, for form autocompletion
    pub async fn distinct_uoms(&self, buyer_id: &str) -> Result<Vec<String>, StorageError> {
        let values: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT i.uom FROM rfq_items i
            JOIN rfqs r ON r.id = i.rfq_id
            WHERE r.buyer_id = ?
            ORDER BY i.uom
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }

    /// Distinct product names used by a buyer, for form autocompletion
    pub async fn distinct_products(&self, buyer_id: &str) -> Result<Vec<String>, StorageError> {
        let values: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT i.product_name FROM rfq_items i
            JOIN rfqs r ON r.id = i.rfq_id
            WHERE r.buyer_id = ?
            ORDER BY i.product_name
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }

    async fn items_by_ids(&self, item_ids: &[String]) -> Result<Vec<RfqItem>, StorageError> {
        let mut items = Vec::with_capacity(item_ids.len());
        for id in item_ids {
            if let Some(item) = self.get_item_unscoped(id).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    fn row_to_rfq(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Rfq, StorageError> {
        Ok(Rfq {
            id: row.try_get("id")?,
            buyer_id: row.try_get("buyer_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_item(&self, row: &sqlx::sqlite::SqliteRow) -> Result<RfqItem, StorageError> {
        let status: String = row.try_get("status")?;
        Ok(RfqItem {
            id: row.try_get("id")?,
            rfq_id: row.try_get("rfq_id")?,
            product_name: row.try_get("product_name")?,
            quantity: row.try_get("quantity")?,
            uom: row.try_get("uom")?,
            specifications: row.try_get("specifications")?,
            expected_delivery_date: row.try_get("expected_delivery_date")?,
            status: ItemStatus::parse(&status)
                .ok_or_else(|| StorageError::Decode(format!("item status: {status}")))?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{memory_pool, seed_buyer};
    use procura_core::types::RfqItemInput;

    fn rfq_input(title: &str) -> RfqCreateInput {
        RfqCreateInput {
            title: title.to_string(),
            items: vec![
                RfqItemInput {
                    product_name: "Resistor".to_string(),
                    quantity: 1000.0,
                    uom: "pcs".to_string(),
                    specifications: Some("1k Ohm".to_string()),
                    expected_delivery_date: None,
                },
                RfqItemInput {
                    product_name: "Capacitor".to_string(),
                    quantity: 200.0,
                    uom: "pcs".to_string(),
                    specifications: None,
                    expected_delivery_date: None,
                },
            ],
            supplier_ids: vec![],
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_create_rfq_with_items() {
        let pool = memory_pool().await;
        let buyer_id = seed_buyer(&pool, "buyer@example.com").await;
        let storage = RfqStorage::new(pool);

        let (rfq, items) = storage
            .create_rfq(&buyer_id, &rfq_input("Electronics Batch"))
            .await
            .unwrap();
        assert_eq!(rfq.title, "Electronics Batch");
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.status == ItemStatus::Open));

        let summary = storage.summary(&buyer_id).await.unwrap();
        assert_eq!(summary.total_rfqs, 1);
        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.open_items, 2);
    }

    #[tokio::test]
    async fn test_item_search_is_case_insensitive() {
        let pool = memory_pool().await;
        let buyer_id = seed_buyer(&pool, "buyer@example.com").await;
        let storage = RfqStorage::new(pool);

        let (rfq, _) = storage
            .create_rfq(&buyer_id, &rfq_input("Electronics Batch"))
            .await
            .unwrap();

        let found = storage
            .list_items(&buyer_id, &rfq.id, Some("cap"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_name, "Capacitor");
    }

    #[tokio::test]
    async fn test_metadata_defaults_when_missing() {
        let pool = memory_pool().await;
        let buyer_id = seed_buyer(&pool, "buyer@example.com").await;
        let storage = RfqStorage::new(pool);

        let (rfq, _) = storage
            .create_rfq(&buyer_id, &rfq_input("No Terms RFQ"))
            .await
            .unwrap();

        let metadata = storage.metadata(&rfq.id).await.unwrap();
        assert_eq!(metadata.terms_conditions, "No terms");
        assert_eq!(metadata.payment_terms, "No terms");
        assert_eq!(metadata.shipping_terms, "No terms");
    }

    #[tokio::test]
    async fn test_list_filter_by_status() {
        let pool = memory_pool().await;
        let buyer_id = seed_buyer(&pool, "buyer@example.com").await;
        let storage = RfqStorage::new(pool.clone());

        storage
            .create_rfq(&buyer_id, &rfq_input("Open RFQ"))
            .await
            .unwrap();

        // Close every item of the RFQ
        sqlx::query("UPDATE rfq_items SET status = 'closed'")
            .execute(&pool)
            .await
            .unwrap();

        let open = storage
            .list_rfqs(&buyer_id, Some(ItemStatus::Open))
            .await
            .unwrap();
        assert!(open.is_empty());

        let closed = storage
            .list_rfqs(&buyer_id, Some(ItemStatus::Closed))
            .await
            .unwrap();
        assert_eq!(closed.len(), 1);
    }
}
