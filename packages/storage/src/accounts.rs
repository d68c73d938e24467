// ABOUTME: Account and API token storage backed by SQLite
// ABOUTME: Password hashing, token issuing, and token verification

use argon2::{Algorithm, Argon2, ParamsBuilder, Version};
use base64::Engine;
use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use subtle::ConstantTimeEq;
use tracing::debug;

use procura_core::types::Account;
use procura_core::generate_id;

use crate::error::StorageError;

pub struct AccountStorage {
    pool: SqlitePool,
}

impl AccountStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically secure random token
    pub fn generate_token() -> String {
        let mut rng = rand::thread_rng();
        let random_bytes: [u8; 32] = rng.gen();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
    }

    /// Hash a token using SHA-256. This is what gets stored in the database.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Derive the stored password hash with Argon2id
    fn hash_password(password: &str, salt: &[u8]) -> Result<Vec<u8>, StorageError> {
        let params = ParamsBuilder::new()
            .m_cost(65536)
            .t_cost(3)
            .p_cost(4)
            .output_len(32)
            .build()
            .map_err(|e| StorageError::PasswordHash(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut hash = vec![0u8; 32];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut hash)
            .map_err(|e| StorageError::PasswordHash(e.to_string()))?;

        Ok(hash)
    }

    pub async fn create_account(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Account, StorageError> {
        let id = generate_id();
        let salt: [u8; 16] = rand::thread_rng().gen();
        let password_hash = hex::encode(Self::hash_password(password, &salt)?);
        let salt = hex::encode(salt);
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, name, password_hash, password_salt, is_staff, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(&password_hash)
        .bind(&salt)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_account(&id).await?.ok_or(StorageError::NotFound)
    }

    pub async fn get_account(&self, account_id: &str) -> Result<Option<Account>, StorageError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| self.row_to_account(&row)).transpose()
    }

    /// Verify email/password and return the matching account
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, StorageError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let account = self.row_to_account(&row)?;
        let salt = hex::decode(&account.password_salt)
            .map_err(|e| StorageError::Decode(e.to_string()))?;
        let stored = hex::decode(&account.password_hash)
            .map_err(|e| StorageError::Decode(e.to_string()))?;

        let computed = Self::hash_password(password, &salt)?;
        if computed.ct_eq(&stored).unwrap_u8() == 1 {
            Ok(Some(account))
        } else {
            Ok(None)
        }
    }

    /// Issue a fresh API token for an account, returning the plaintext token
    pub async fn issue_token(&self, account_id: &str) -> Result<String, StorageError> {
        let token = Self::generate_token();
        let token_hash = Self::hash_token(&token);

        sqlx::query(
            "INSERT INTO api_tokens (id, account_id, token_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(generate_id())
        .bind(account_id)
        .bind(&token_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    /// Resolve a plaintext token to its account, touching last_used_at
    pub async fn verify_token(&self, token: &str) -> Result<Option<Account>, StorageError> {
        let token_hash = Self::hash_token(token);

        let account_id: Option<String> =
            sqlx::query_scalar("SELECT account_id FROM api_tokens WHERE token_hash = ?")
                .bind(&token_hash)
                .fetch_optional(&self.pool)
                .await?;

        let Some(account_id) = account_id else {
            return Ok(None);
        };

        debug!(account_id = %account_id, "API token verified");

        sqlx::query("UPDATE api_tokens SET last_used_at = ? WHERE token_hash = ?")
            .bind(Utc::now())
            .bind(&token_hash)
            .execute(&self.pool)
            .await?;

        self.get_account(&account_id).await
    }

    fn row_to_account(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Account, StorageError> {
        Ok(Account {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
            password_salt: row.try_get("password_salt")?,
            is_staff: row.try_get::<i64, _>("is_staff")? != 0,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
