// ABOUTME: Data layer and persistence for Procura
// ABOUTME: SQLite storage structs per entity, blob store, and migrations

pub mod accounts;
pub mod attachments;
pub mod audit;
pub mod blob;
pub mod buyers;
pub mod db;
pub mod error;
pub mod quotes;
pub mod rfqs;
pub mod suppliers;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use accounts::AccountStorage;
pub use attachments::{AttachmentCreateInput, AttachmentStorage};
pub use audit::AuditStorage;
pub use blob::{BlobStore, StoredBlob};
pub use buyers::{BuyerCreateInput, BuyerStorage};
pub use db::{init_pool, MIGRATOR};
pub use error::{StorageError, StorageResult};
pub use quotes::QuoteStorage;
pub use rfqs::{RfqListEntry, RfqStorage, RfqSummary};
pub use suppliers::{SupplierStats, SupplierStorage};
