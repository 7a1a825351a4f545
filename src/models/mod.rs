//! Data models for the ERP backend.
//!
//! Every record type is stored as a JSON document in its own collection. The
//! [`Resource`] trait describes how a type is stored, filtered and validated;
//! [`Record`] pairs the typed fields with the shared identity and audit block.

mod announcement;
mod brand;
mod department;
mod employee;
mod invitation;
mod leave;
mod organization;
mod payroll;
mod price_list;
mod product;
mod service_request;
mod status;

pub use announcement::*;
pub use brand::*;
pub use department::*;
pub use employee::*;
pub use invitation::*;
pub use leave::*;
pub use organization::*;
pub use payroll::*;
pub use price_list::*;
pub use product::*;
pub use service_request::*;
pub use status::*;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::errors::AppError;

/// A record type persisted in the document store.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Collection (table partition) the records live in.
    const COLLECTION: &'static str;
    /// Prefix of generated record codes, e.g. `EMP` for `EMP009`.
    const ID_PREFIX: &'static str;
    /// Human-readable name used in error messages.
    const LABEL: &'static str;
    /// camelCase document fields that list endpoints may filter on.
    const FILTER_FIELDS: &'static [&'static str] = &[];
    /// Top-level document fields that `q` search never looks at.
    const PRIVATE_FIELDS: &'static [&'static str] = &[];

    /// Field values no two active records may share, as filter pairs.
    fn unique_key(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Recompute derived fields before the record is written.
    fn normalize(&mut self) {}

    /// Check field-level invariants before the record is written.
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Audit block attached to every stored record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub created_by: String,
    pub created_at: String,
    pub updated_by: String,
    pub updated_at: String,
    pub is_active: bool,
    /// Internal version for optimistic concurrency control
    pub version: i64,
}

/// A stored record: its code, its typed fields and its audit block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
    pub system_info: SystemInfo,
}

impl<T> Record<T> {
    /// Replace the typed fields, keeping identity and audit information.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Record<U> {
        Record {
            id: self.id,
            data: f(self.data),
            system_info: self.system_info,
        }
    }
}

/// Format a generated record code, zero-padded to three digits.
pub fn format_code(prefix: &str, n: i64) -> String {
    format!("{}{:03}", prefix, n)
}

/// Round a monetary amount to two decimals.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(())
}

pub(crate) fn require_non_negative(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(())
}

pub(crate) fn require_email(value: &str, field: &str) -> Result<(), AppError> {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::validation(format!(
            "{} must be a valid email address",
            field
        ))),
    }
}
