// ABOUTME: Shared constants and filesystem locations for Procura
// ABOUTME: Subscription defaults and attachment limits live here

use std::env;
use std::path::PathBuf;

/// Percentage of new signups routed to the paywall-first variant
pub const DEFAULT_PAYWALL_PERCENT: u8 = 10;

/// Trial length granted to trial-first signups
pub const DEFAULT_TRIAL_DAYS: i64 = 45;

/// Days of access granted after subscription expiry
pub const DEFAULT_GRACE_PERIOD_DAYS: i64 = 3;

/// Maximum size of a single RFQ item attachment, in megabytes
pub const DEFAULT_ATTACHMENT_MAX_SIZE_MB: u64 = 10;

/// Cumulative attachment storage allowed per buyer, in megabytes
pub const DEFAULT_ATTACHMENT_QUOTA_MB: u64 = 250;

/// File extensions accepted for RFQ item attachments
pub const ALLOWED_ATTACHMENT_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "xlsx", "csv", "doc", "docx",
];

/// Get the path to the Procura data directory (~/.procura)
pub fn procura_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".procura")
    } else {
        // Fall back to dirs crate for normal usage
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".procura")
    }
}

/// Get the path to the attachment blob directory (~/.procura/attachments)
pub fn attachments_dir() -> PathBuf {
    procura_dir().join("attachments")
}
