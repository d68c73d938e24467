// ABOUTME: Core types, enums, and validation for Procura
// ABOUTME: Foundational package shared across all Procura packages

pub mod constants;
pub mod types;
pub mod validation;

// Re-export main types
pub use types::{
    Account, Attachment, AuditAction, AuditLog, Buyer, ItemStatus, OnboardingVariant, OrderStatus,
    Quote, QuoteSubmission, Rfq, RfqCreateInput, RfqItem, RfqItemInput, RfqMetadata, Supplier,
    SupplierCategory, SupplierCreateInput, SupplierUpdateInput,
};

// Re-export constants
pub use constants::{
    procura_dir, DEFAULT_GRACE_PERIOD_DAYS, DEFAULT_PAYWALL_PERCENT, DEFAULT_TRIAL_DAYS,
};

// Re-export validation
pub use validation::{
    check_text, validate_quote_submission, validate_rfq_input, validate_supplier_input,
    ValidationError,
};

/// Generate an opaque unique identifier for a new record
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
