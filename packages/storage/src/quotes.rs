// ABOUTME: Quote storage layer using SQLite
// ABOUTME: Supplier responses to RFQ items; one quote per (item, supplier)

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use procura_core::generate_id;
use procura_core::types::{OrderStatus, Quote, QuoteSubmission};

use crate::error::StorageError;

pub struct QuoteStorage {
    pool: SqlitePool,
}

impl QuoteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_quote(&self, submission: &QuoteSubmission) -> Result<Quote, StorageError> {
        let id = generate_id();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, rfq_item_id, supplier_id, quantity, price, lead_time,
                remarks, order_status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&submission.rfq_item_id)
        .bind(&submission.supplier_id)
        .bind(submission.quantity)
        .bind(submission.price)
        .bind(submission.lead_time)
        .bind(&submission.remarks)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_quote(&id).await?.ok_or(StorageError::NotFound)
    }

    pub async fn get_quote(&self, quote_id: &str) -> Result<Option<Quote>, StorageError> {
        let row = sqlx::query("SELECT * FROM quotes WHERE id = ?")
            .bind(quote_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_to_quote(&row)).transpose()
    }

    pub async fn find_by_item_and_supplier(
        &self,
        rfq_item_id: &str,
        supplier_id: &str,
    ) -> Result<Option<Quote>, StorageError> {
        let row = sqlx::query("SELECT * FROM quotes WHERE rfq_item_id = ? AND supplier_id = ?")
            .bind(rfq_item_id)
            .bind(supplier_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_to_quote(&row)).transpose()
    }

    pub async fn list_by_item(&self, rfq_item_id: &str) -> Result<Vec<Quote>, StorageError> {
        let rows = sqlx::query("SELECT * FROM quotes WHERE rfq_item_id = ? ORDER BY created_at")
            .bind(rfq_item_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_quote).collect()
    }

    /// Supplier ids that have already responded to an item
    pub async fn responded_supplier_ids(
        &self,
        rfq_item_id: &str,
    ) -> Result<Vec<String>, StorageError> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT supplier_id FROM quotes WHERE rfq_item_id = ?")
                .bind(rfq_item_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }
}

/// Shared row mapper, also used by the lifecycle engine inside transactions
pub fn row_to_quote(row: &sqlx::sqlite::SqliteRow) -> Result<Quote, StorageError> {
    let status: String = row.try_get("order_status")?;
    Ok(Quote {
        id: row.try_get("id")?,
        rfq_item_id: row.try_get("rfq_item_id")?,
        supplier_id: row.try_get("supplier_id")?,
        quantity: row.try_get("quantity")?,
        price: row.try_get("price")?,
        lead_time: row.try_get("lead_time")?,
        remarks: row.try_get("remarks")?,
        order_status: OrderStatus::parse(&status)
            .ok_or_else(|| StorageError::Decode(format!("order_status: {status}")))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfqs::RfqStorage;
    use crate::suppliers::SupplierStorage;
    use crate::test_utils::{memory_pool, seed_buyer};
    use procura_core::types::{RfqCreateInput, RfqItemInput, SupplierCreateInput};

    async fn seed_item_and_supplier(pool: &SqlitePool) -> (String, String) {
        let buyer_id = seed_buyer(pool, "buyer@example.com").await;
        let suppliers = SupplierStorage::new(pool.clone());
        let supplier = suppliers
            .create_supplier(
                &buyer_id,
                &SupplierCreateInput {
                    company_name: "Widget Supplies".to_string(),
                    person_of_contact: "Jane Vendor".to_string(),
                    phone_no: "+1-555-0100".to_string(),
                    email: "jane@example.com".to_string(),
                    remark: None,
                    categories: vec![],
                },
            )
            .await
            .unwrap();

        let rfqs = RfqStorage::new(pool.clone());
        let (_, items) = rfqs
            .create_rfq(
                &buyer_id,
                &RfqCreateInput {
                    title: "Test RFQ".to_string(),
                    items: vec![RfqItemInput {
                        product_name: "Widget".to_string(),
                        quantity: 5.0,
                        uom: "pcs".to_string(),
                        specifications: None,
                        expected_delivery_date: None,
                    }],
                    supplier_ids: vec![supplier.id.clone()],
                    metadata: None,
                },
            )
            .await
            .unwrap();

        (items[0].id.clone(), supplier.id)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let pool = memory_pool().await;
        let (item_id, supplier_id) = seed_item_and_supplier(&pool).await;
        let storage = QuoteStorage::new(pool);

        let quote = storage
            .insert_quote(&QuoteSubmission {
                rfq_item_id: item_id.clone(),
                supplier_id: supplier_id.clone(),
                quantity: 7.0,
                price: 15.5,
                lead_time: Some(4),
                remarks: Some("Fast delivery".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(quote.order_status, OrderStatus::Pending);

        let found = storage
            .find_by_item_and_supplier(&item_id, &supplier_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, quote.id);
        assert_eq!(found.lead_time, Some(4));
    }
}
