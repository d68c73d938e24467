// ABOUTME: Shared application state threaded through all routers
// ABOUTME: Storage handles, lifecycle engine, dispatcher, and gate config

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use procura_core::constants::{DEFAULT_ATTACHMENT_MAX_SIZE_MB, DEFAULT_ATTACHMENT_QUOTA_MB};
use procura_lifecycle::LifecycleEngine;
use procura_notify::Dispatcher;
use procura_storage::{
    AccountStorage, AttachmentStorage, AuditStorage, BlobStore, BuyerStorage, QuoteStorage,
    RfqStorage, SupplierStorage,
};
use procura_subscription::SubscriptionConfig;

/// Upload limits applied before anything touches the blob store
#[derive(Debug, Clone, Copy)]
pub struct AttachmentLimits {
    pub max_file_bytes: i64,
    pub quota_bytes: i64,
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: (DEFAULT_ATTACHMENT_MAX_SIZE_MB * 1024 * 1024) as i64,
            quota_bytes: (DEFAULT_ATTACHMENT_QUOTA_MB * 1024 * 1024) as i64,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub accounts: Arc<AccountStorage>,
    pub buyers: Arc<BuyerStorage>,
    pub suppliers: Arc<SupplierStorage>,
    pub rfqs: Arc<RfqStorage>,
    pub quotes: Arc<QuoteStorage>,
    pub attachments: Arc<AttachmentStorage>,
    pub audit: Arc<AuditStorage>,
    pub blobs: BlobStore,
    pub dispatcher: Dispatcher,
    pub engine: Arc<LifecycleEngine>,
    pub subscription: SubscriptionConfig,
    pub limits: AttachmentLimits,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        blob_root: PathBuf,
        dispatcher: Dispatcher,
        subscription: SubscriptionConfig,
        limits: AttachmentLimits,
    ) -> Self {
        Self {
            accounts: Arc::new(AccountStorage::new(pool.clone())),
            buyers: Arc::new(BuyerStorage::new(pool.clone())),
            suppliers: Arc::new(SupplierStorage::new(pool.clone())),
            rfqs: Arc::new(RfqStorage::new(pool.clone())),
            quotes: Arc::new(QuoteStorage::new(pool.clone())),
            attachments: Arc::new(AttachmentStorage::new(pool.clone())),
            audit: Arc::new(AuditStorage::new(pool.clone())),
            blobs: BlobStore::new(blob_root),
            engine: Arc::new(LifecycleEngine::new(pool.clone(), dispatcher.clone())),
            dispatcher,
            subscription,
            pool,
            limits,
        }
    }
}
