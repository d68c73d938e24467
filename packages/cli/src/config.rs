// ABOUTME: Environment-driven server configuration
// ABOUTME: Port, CORS, database and blob paths, subscription knobs, limits

use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

use procura_api::AttachmentLimits;
use procura_core::constants::{attachments_dir, procura_dir};
use procura_subscription::SubscriptionConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid numeric value for {0}: {1}")]
    InvalidNumber(&'static str, String),
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    pub database_path: PathBuf,
    pub blob_root: PathBuf,
    pub subscription: SubscriptionConfig,
    pub limits: AttachmentLimits,
}

fn env_i64(key: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidNumber(key, raw)),
        Err(_) => Ok(default),
    }
}

fn env_u8(key: &'static str, default: u8) -> Result<u8, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u8>()
            .map_err(|_| ConfigError::InvalidNumber(key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "4100".to_string());
        let port = port_str.parse::<u16>()?;
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let database_path = env::var("PROCURA_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| procura_dir().join("procura.db"));

        let blob_root = env::var("PROCURA_ATTACHMENTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| attachments_dir());

        let defaults = SubscriptionConfig::default();
        let subscription = SubscriptionConfig {
            grace_period_days: env_i64("PROCURA_GRACE_PERIOD_DAYS", defaults.grace_period_days)?,
            paywall_percent: env_u8("PROCURA_PAYWALL_PERCENT", defaults.paywall_percent)?,
            trial_days: env_i64("PROCURA_TRIAL_DAYS", defaults.trial_days)?,
        };

        let default_limits = AttachmentLimits::default();
        let limits = AttachmentLimits {
            max_file_bytes: env_i64("PROCURA_MAX_ATTACHMENT_BYTES", default_limits.max_file_bytes)?,
            quota_bytes: env_i64("PROCURA_ATTACHMENT_QUOTA_BYTES", default_limits.quota_bytes)?,
        };

        Ok(Config {
            port,
            cors_origin,
            database_path,
            blob_root,
            subscription,
            limits,
        })
    }
}
