// ABOUTME: Input validation for Procura domain types
// ABOUTME: Free-text sanity checks plus quantity/price rules for RFQs and quotes

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::types::{QuoteSubmission, RfqCreateInput, SupplierCreateInput};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Not a valid text value: {0}")]
    InvalidText(String),

    #[error("{0}")]
    Invalid(String),
}

fn text_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9\s_.\-@+,&/()']*$").expect("valid regex"))
}

/// Reject free-text values carrying characters outside the accepted set
pub fn check_text(value: &str, field: &str) -> Result<(), ValidationError> {
    if !text_pattern().is_match(value) {
        return Err(ValidationError::InvalidText(field.to_string()));
    }
    Ok(())
}

pub fn validate_supplier_input(input: &SupplierCreateInput) -> Result<(), ValidationError> {
    if input.company_name.trim().is_empty() {
        return Err(ValidationError::MissingField("company_name"));
    }
    if input.person_of_contact.trim().is_empty() {
        return Err(ValidationError::MissingField("person_of_contact"));
    }
    if input.phone_no.trim().is_empty() {
        return Err(ValidationError::MissingField("phone_no"));
    }
    if input.email.trim().is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    if !input.email.contains('@') {
        return Err(ValidationError::Invalid("Invalid email address".to_string()));
    }
    check_text(&input.company_name, "company_name")?;
    check_text(&input.person_of_contact, "person_of_contact")?;
    if let Some(remark) = &input.remark {
        check_text(remark, "remark")?;
    }
    Ok(())
}

pub fn validate_rfq_input(input: &RfqCreateInput) -> Result<(), ValidationError> {
    if input.title.trim().is_empty() {
        return Err(ValidationError::MissingField("title"));
    }
    if input.items.is_empty() {
        return Err(ValidationError::Invalid(
            "An RFQ needs at least one item".to_string(),
        ));
    }
    for item in &input.items {
        if item.product_name.trim().is_empty() {
            return Err(ValidationError::MissingField("product_name"));
        }
        if item.quantity <= 0.0 {
            return Err(ValidationError::Invalid(format!(
                "Quantity must be positive for item '{}'",
                item.product_name
            )));
        }
        if item.uom.trim().is_empty() {
            return Err(ValidationError::MissingField("uom"));
        }
    }
    Ok(())
}

pub fn validate_quote_submission(submission: &QuoteSubmission) -> Result<(), ValidationError> {
    if submission.quantity <= 0.0 {
        return Err(ValidationError::Invalid(
            "Quantity must be positive".to_string(),
        ));
    }
    if submission.price < 0.0 {
        return Err(ValidationError::Invalid(
            "Price cannot be negative".to_string(),
        ));
    }
    Ok(())
}
