// ABOUTME: Shared test helpers for storage-backed tests
// ABOUTME: In-memory SQLite pool with migrations applied

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use procura_core::types::OnboardingVariant;

use crate::accounts::AccountStorage;
use crate::buyers::{BuyerCreateInput, BuyerStorage};
use crate::db::MIGRATOR;

/// In-memory pool for tests. A single connection keeps every query on the
/// same transient database.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .expect("Failed to enable foreign keys");

    MIGRATOR.run(&pool).await.expect("Failed to run migrations");

    pool
}

/// Create an account plus buyer with an active 30-day subscription,
/// returning the buyer id.
pub async fn seed_buyer(pool: &SqlitePool, email: &str) -> String {
    seed_buyer_with_expiry(pool, email, Utc::now() + Duration::days(30)).await
}

/// Like [`seed_buyer`] but with an explicit subscription expiry
pub async fn seed_buyer_with_expiry(
    pool: &SqlitePool,
    email: &str,
    expiry: chrono::DateTime<Utc>,
) -> String {
    let accounts = AccountStorage::new(pool.clone());
    let buyers = BuyerStorage::new(pool.clone());

    let account = accounts
        .create_account(email, "Test Buyer", "strongpassword123")
        .await
        .expect("Failed to seed account");

    let buyer = buyers
        .create_buyer(BuyerCreateInput {
            account_id: account.id,
            company_name: Some("Test Buyer".to_string()),
            phone_no: None,
            gst_no: None,
            address: None,
            currency: None,
            timezone: None,
            subscription_expiry: expiry,
            onboarding_variant: OnboardingVariant::TrialFirst,
        })
        .await
        .expect("Failed to seed buyer");

    buyer.id
}
