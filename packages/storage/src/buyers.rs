// ABOUTME: Buyer storage layer using SQLite
// ABOUTME: One buyer per account; carries subscription expiry and variant

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use procura_core::generate_id;
use procura_core::types::{Buyer, OnboardingVariant};

use crate::error::StorageError;

pub struct BuyerCreateInput {
    pub account_id: String,
    pub company_name: Option<String>,
    pub phone_no: Option<String>,
    pub gst_no: Option<String>,
    pub address: Option<String>,
    pub currency: Option<String>,
    pub timezone: Option<String>,
    pub subscription_expiry: DateTime<Utc>,
    pub onboarding_variant: OnboardingVariant,
}

pub struct BuyerStorage {
    pool: SqlitePool,
}

impl BuyerStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_buyer(&self, input: BuyerCreateInput) -> Result<Buyer, StorageError> {
        let id = generate_id();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO buyers (
                id, account_id, company_name, phone_no, gst_no, address,
                currency, timezone, subscription_expiry, onboarding_variant,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.account_id)
        .bind(&input.company_name)
        .bind(&input.phone_no)
        .bind(&input.gst_no)
        .bind(&input.address)
        .bind(input.currency.as_deref().unwrap_or("USD"))
        .bind(input.timezone.as_deref().unwrap_or("UTC"))
        .bind(input.subscription_expiry)
        .bind(input.onboarding_variant.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_buyer(&id).await?.ok_or(StorageError::NotFound)
    }

    pub async fn get_buyer(&self, buyer_id: &str) -> Result<Option<Buyer>, StorageError> {
        let row = sqlx::query("SELECT * FROM buyers WHERE id = ?")
            .bind(buyer_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| self.row_to_buyer(&row)).transpose()
    }

    pub async fn get_by_account(&self, account_id: &str) -> Result<Option<Buyer>, StorageError> {
        let row = sqlx::query("SELECT * FROM buyers WHERE account_id = ?")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| self.row_to_buyer(&row)).transpose()
    }

    pub async fn update_subscription_expiry(
        &self,
        buyer_id: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        debug!("Updating subscription expiry for buyer: {}", buyer_id);

        sqlx::query("UPDATE buyers SET subscription_expiry = ?, updated_at = ? WHERE id = ?")
            .bind(expiry)
            .bind(Utc::now())
            .bind(buyer_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn row_to_buyer(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Buyer, StorageError> {
        let variant: String = row.try_get("onboarding_variant")?;
        Ok(Buyer {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            company_name: row.try_get("company_name")?,
            phone_no: row.try_get("phone_no")?,
            gst_no: row.try_get("gst_no")?,
            address: row.try_get("address")?,
            currency: row.try_get("currency")?,
            timezone: row.try_get("timezone")?,
            subscription_expiry: row.try_get("subscription_expiry")?,
            onboarding_variant: OnboardingVariant::parse(&variant)
                .ok_or_else(|| StorageError::Decode(format!("onboarding_variant: {variant}")))?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
