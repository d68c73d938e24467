// ABOUTME: Domain type definitions for the Procura procurement backend
// ABOUTME: Buyers, suppliers, RFQs, quotes, attachments, and their input structs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Onboarding bucket assigned to a new buyer at signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingVariant {
    PaywallFirst,
    TrialFirst,
}

impl OnboardingVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingVariant::PaywallFirst => "paywall_first",
            OnboardingVariant::TrialFirst => "trial_first",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "paywall_first" => Some(OnboardingVariant::PaywallFirst),
            "trial_first" => Some(OnboardingVariant::TrialFirst),
            _ => None,
        }
    }
}

/// RFQ item lifecycle state. Items only ever move open -> closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Open,
    Closed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Open => "open",
            ItemStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(ItemStatus::Open),
            "closed" => Some(ItemStatus::Closed),
            _ => None,
        }
    }
}

/// Quote ordering state. At most one quote per item ever reaches Placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Placed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Placed => "placed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "placed" => Some(OrderStatus::Placed),
            _ => None,
        }
    }
}

/// Authenticated principal. Exactly one buyer exists per account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tenant root. Owns suppliers, RFQs, and attachment quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    pub id: String,
    pub account_id: String,
    pub company_name: Option<String>,
    pub phone_no: Option<String>,
    pub gst_no: Option<String>,
    pub address: Option<String>,
    pub currency: String,
    pub timezone: String,
    pub subscription_expiry: DateTime<Utc>,
    pub onboarding_variant: OnboardingVariant,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub buyer_id: String,
    pub company_name: String,
    pub person_of_contact: String,
    pub phone_no: String,
    pub email: String,
    pub remark: Option<String>,
    pub categories: Vec<SupplierCategory>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category tag on a supplier. Deactivated rather than deleted to keep history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierCategory {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rfq {
    pub id: String,
    pub buyer_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Commercial terms attached to an RFQ, shown on the supplier response page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfqMetadata {
    pub terms_conditions: String,
    pub payment_terms: String,
    pub shipping_terms: String,
}

impl RfqMetadata {
    /// Defaults used when a buyer never filled terms in
    pub fn no_terms() -> Self {
        Self {
            terms_conditions: "No terms".to_string(),
            payment_terms: "No terms".to_string(),
            shipping_terms: "No terms".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfqItem {
    pub id: String,
    pub rfq_id: String,
    pub product_name: String,
    pub quantity: f64,
    pub uom: String,
    pub specifications: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A supplier's priced response to one RFQ item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub rfq_item_id: String,
    pub supplier_id: String,
    pub quantity: f64,
    pub price: f64,
    pub lead_time: Option<i64>,
    pub remarks: Option<String>,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored file attached to an RFQ item. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub rfq_item_id: String,
    pub stored_path: String,
    pub original_filename: String,
    pub file_size: i64,
    pub content_type: String,
    pub checksum: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    FileUpload,
    FileDelete,
    OrderPlaced,
    QuoteSubmitted,
    SupplierImport,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::FileUpload => "file_upload",
            AuditAction::FileDelete => "file_delete",
            AuditAction::OrderPlaced => "order_placed",
            AuditAction::QuoteSubmitted => "quote_submitted",
            AuditAction::SupplierImport => "supplier_import",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "file_upload" => Some(AuditAction::FileUpload),
            "file_delete" => Some(AuditAction::FileDelete),
            "order_placed" => Some(AuditAction::OrderPlaced),
            "quote_submitted" => Some(AuditAction::QuoteSubmitted),
            "supplier_import" => Some(AuditAction::SupplierImport),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: String,
    pub buyer_id: String,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierCreateInput {
    pub company_name: String,
    pub person_of_contact: String,
    pub phone_no: String,
    pub email: String,
    pub remark: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Typed partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierUpdateInput {
    pub company_name: Option<String>,
    pub person_of_contact: Option<String>,
    pub phone_no: Option<String>,
    pub email: Option<String>,
    pub remark: Option<String>,
    pub categories: Option<Vec<String>>,
}

impl SupplierUpdateInput {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.person_of_contact.is_none()
            && self.phone_no.is_none()
            && self.email.is_none()
            && self.remark.is_none()
            && self.categories.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfqItemInput {
    pub product_name: String,
    pub quantity: f64,
    pub uom: String,
    pub specifications: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfqCreateInput {
    pub title: String,
    pub items: Vec<RfqItemInput>,
    #[serde(default)]
    pub supplier_ids: Vec<String>,
    pub metadata: Option<RfqMetadata>,
}

/// A supplier's submission for one RFQ item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSubmission {
    pub rfq_item_id: String,
    pub supplier_id: String,
    pub quantity: f64,
    pub price: f64,
    pub lead_time: Option<i64>,
    pub remarks: Option<String>,
}
