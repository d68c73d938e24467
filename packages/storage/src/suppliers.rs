// ABOUTME: Supplier storage layer using SQLite
// ABOUTME: Tenant-scoped CRUD with soft delete and category tags

use chrono::Utc;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use procura_core::generate_id;
use procura_core::types::{Supplier, SupplierCategory, SupplierCreateInput, SupplierUpdateInput};

use crate::error::StorageError;

/// Reporting row for the supplier stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SupplierStats {
    pub supplier_id: String,
    pub company_name: String,
    pub total_quotes: i64,
    pub orders_placed: i64,
}

pub struct SupplierStorage {
    pool: SqlitePool,
}

impl SupplierStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// True when a live supplier with this email already exists for the buyer
    pub async fn email_exists(&self, buyer_id: &str, email: &str) -> Result<bool, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM suppliers WHERE buyer_id = ? AND email = ? AND deleted_at IS NULL",
        )
        .bind(buyer_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// True when a different live supplier of the buyer already uses this email
    pub async fn email_in_use_by_other(
        &self,
        buyer_id: &str,
        email: &str,
        supplier_id: &str,
    ) -> Result<bool, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM suppliers WHERE buyer_id = ? AND email = ? AND id != ? AND deleted_at IS NULL",
        )
        .bind(buyer_id)
        .bind(email)
        .bind(supplier_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn create_supplier(
        &self,
        buyer_id: &str,
        input: &SupplierCreateInput,
    ) -> Result<Supplier, StorageError> {
        let id = generate_id();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, buyer_id, company_name, person_of_contact, phone_no, email,
                remark, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(buyer_id)
        .bind(&input.company_name)
        .bind(&input.person_of_contact)
        .bind(&input.phone_no)
        .bind(&input.email)
        .bind(&input.remark)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for name in &input.categories {
            sqlx::query(
                "INSERT INTO supplier_categories (supplier_id, name, active) VALUES (?, ?, 1)",
            )
            .bind(&id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_supplier(buyer_id, &id)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Fetch one supplier scoped to its owning buyer. Foreign ids come back None.
    pub async fn get_supplier(
        &self,
        buyer_id: &str,
        supplier_id: &str,
    ) -> Result<Option<Supplier>, StorageError> {
        let row = sqlx::query("SELECT * FROM suppliers WHERE id = ? AND buyer_id = ?")
            .bind(supplier_id)
            .bind(buyer_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut supplier = self.row_to_supplier(&row)?;
        supplier.categories = self.categories_for(supplier_id).await?;
        Ok(Some(supplier))
    }

    /// All live suppliers for a buyer
    pub async fn list_suppliers(&self, buyer_id: &str) -> Result<Vec<Supplier>, StorageError> {
        debug!("Listing suppliers for buyer: {}", buyer_id);

        let rows = sqlx::query(
            "SELECT * FROM suppliers WHERE buyer_id = ? AND deleted_at IS NULL ORDER BY created_at",
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut suppliers = Vec::with_capacity(rows.len());
        for row in rows {
            let mut supplier = self.row_to_supplier(&row)?;
            supplier.categories = self.categories_for(&supplier.id).await?;
            suppliers.push(supplier);
        }

        Ok(suppliers)
    }

    /// Apply a typed partial update, field by field
    pub async fn update_supplier(
        &self,
        buyer_id: &str,
        supplier_id: &str,
        input: &SupplierUpdateInput,
    ) -> Result<Option<Supplier>, StorageError> {
        let Some(existing) = self.get_supplier(buyer_id, supplier_id).await? else {
            return Ok(None);
        };

        let company_name = input.company_name.as_ref().unwrap_or(&existing.company_name);
        let person_of_contact = input
            .person_of_contact
            .as_ref()
            .unwrap_or(&existing.person_of_contact);
        let phone_no = input.phone_no.as_ref().unwrap_or(&existing.phone_no);
        let email = input.email.as_ref().unwrap_or(&existing.email);
        let remark = input.remark.as_ref().or(existing.remark.as_ref());

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE suppliers
            SET company_name = ?, person_of_contact = ?, phone_no = ?, email = ?,
                remark = ?, updated_at = ?
            WHERE id = ? AND buyer_id = ?
            "#,
        )
        .bind(company_name)
        .bind(person_of_contact)
        .bind(phone_no)
        .bind(email)
        .bind(remark)
        .bind(Utc::now())
        .bind(supplier_id)
        .bind(buyer_id)
        .execute(&mut *tx)
        .await?;

        if let Some(categories) = &input.categories {
            // Tags are deactivated, never dropped
            sqlx::query("UPDATE supplier_categories SET active = 0 WHERE supplier_id = ?")
                .bind(supplier_id)
                .execute(&mut *tx)
                .await?;

            for name in categories {
                sqlx::query(
                    r#"
                    INSERT INTO supplier_categories (supplier_id, name, active)
                    VALUES (?, ?, 1)
                    ON CONFLICT (supplier_id, name) DO UPDATE SET active = 1
                    "#,
                )
                .bind(supplier_id)
                .bind(name)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get_supplier(buyer_id, supplier_id).await
    }

    /// Soft delete: the row stays for quote history
    pub async fn soft_delete(
        &self,
        buyer_id: &str,
        supplier_id: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE suppliers SET deleted_at = ?, updated_at = ? WHERE id = ? AND buyer_id = ? AND deleted_at IS NULL",
        )
        .bind(Utc::now())
        .bind(Utc::now())
        .bind(supplier_id)
        .bind(buyer_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Distinct active category names across a buyer's live suppliers
    pub async fn active_category_names(&self, buyer_id: &str) -> Result<Vec<String>, StorageError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT sc.name
            FROM supplier_categories sc
            JOIN suppliers s ON s.id = sc.supplier_id
            WHERE s.buyer_id = ? AND s.deleted_at IS NULL AND sc.active = 1
            ORDER BY sc.name
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Per-supplier quote and placed-order counts
    pub async fn supplier_stats(&self, buyer_id: &str) -> Result<Vec<SupplierStats>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT s.id AS supplier_id, s.company_name,
                   COUNT(q.id) AS total_quotes,
                   COALESCE(SUM(CASE WHEN q.order_status = 'placed' THEN 1 ELSE 0 END), 0) AS orders_placed
            FROM suppliers s
            LEFT JOIN quotes q ON q.supplier_id = s.id
            WHERE s.buyer_id = ? AND s.deleted_at IS NULL
            GROUP BY s.id, s.company_name
            ORDER BY s.company_name
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(SupplierStats {
                    supplier_id: row.try_get("supplier_id")?,
                    company_name: row.try_get("company_name")?,
                    total_quotes: row.try_get("total_quotes")?,
                    orders_placed: row.try_get("orders_placed")?,
                })
            })
            .collect()
    }

    async fn categories_for(&self, supplier_id: &str) -> Result<Vec<SupplierCategory>, StorageError> {
        let rows = sqlx::query(
            "SELECT name, active FROM supplier_categories WHERE supplier_id = ? ORDER BY name",
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(SupplierCategory {
                    name: row.try_get("name")?,
                    active: row.try_get::<i64, _>("active")? != 0,
                })
            })
            .collect()
    }

    fn row_to_supplier(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Supplier, StorageError> {
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{memory_pool, seed_buyer};

    fn input(email: &str) -> SupplierCreateInput {
        SupplierCreateInput {
            company_name: "Widget Supplies".to_string(),
            person_of_contact: "Jane Vendor".to_string(),
            phone_no: "+1-555-0100".to_string(),
            email: email.to_string(),
            remark: None,
            categories: vec!["electronics".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_list_and_soft_delete() {
        let pool = memory_pool().await;
        let buyer_id = seed_buyer(&pool, "buyer@example.com").await;
        let storage = SupplierStorage::new(pool);

        let supplier = storage
            .create_supplier(&buyer_id, &input("jane@example.com"))
            .await
            .unwrap();
        assert_eq!(supplier.categories.len(), 1);
        assert!(supplier.categories[0].active);

        assert!(storage
            .email_exists(&buyer_id, "jane@example.com")
            .await
            .unwrap());

        let listed = storage.list_suppliers(&buyer_id).await.unwrap();
        assert_eq!(listed.len(), 1);

        assert!(storage.soft_delete(&buyer_id, &supplier.id).await.unwrap());
        let listed = storage.list_suppliers(&buyer_id).await.unwrap();
        assert!(listed.is_empty());

        // Email becomes available again once the supplier is gone
        assert!(!storage
            .email_exists(&buyer_id, "jane@example.com")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_email_in_use_by_other_excludes_self() {
        let pool = memory_pool().await;
        let buyer_id = seed_buyer(&pool, "buyer@example.com").await;
        let storage = SupplierStorage::new(pool);

        let first = storage
            .create_supplier(&buyer_id, &input("jane@example.com"))
            .await
            .unwrap();
        let second = storage
            .create_supplier(&buyer_id, &input("joe@example.com"))
            .await
            .unwrap();

        // A supplier keeping its own email is not a clash
        assert!(!storage
            .email_in_use_by_other(&buyer_id, "jane@example.com", &first.id)
            .await
            .unwrap());
        assert!(storage
            .email_in_use_by_other(&buyer_id, "jane@example.com", &second.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_deactivates_removed_categories() {
        let pool = memory_pool().await;
        let buyer_id = seed_buyer(&pool, "buyer@example.com").await;
        let storage = SupplierStorage::new(pool);

        let supplier = storage
            .create_supplier(&buyer_id, &input("jane@example.com"))
            .await
            .unwrap();

        let update = SupplierUpdateInput {
            categories: Some(vec!["metals".to_string()]),
            ..Default::default()
        };
        let updated = storage
            .update_supplier(&buyer_id, &supplier.id, &update)
            .await
            .unwrap()
            .unwrap();

        let electronics = updated
            .categories
            .iter()
            .find(|c| c.name == "electronics")
            .unwrap();
        assert!(!electronics.active);
        let metals = updated.categories.iter().find(|c| c.name == "metals").unwrap();
        assert!(metals.active);
    }

    #[tokio::test]
    async fn test_cross_buyer_lookup_returns_none() {
        let pool = memory_pool().await;
        let buyer_a = seed_buyer(&pool, "a@example.com").await;
        let buyer_b = seed_buyer(&pool, "b@example.com").await;
        let storage = SupplierStorage::new(pool);

        let supplier = storage
            .create_supplier(&buyer_a, &input("jane@example.com"))
            .await
            .unwrap();

        let foreign = storage.get_supplier(&buyer_b, &supplier.id).await.unwrap();
        assert!(foreign.is_none());
    }
}
