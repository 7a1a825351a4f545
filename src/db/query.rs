//! List filters and pagination shared by every collection.

use std::collections::HashMap;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::Resource;

/// Query keys with a meaning of their own; every other key is a field filter.
const RESERVED_KEYS: &[&str] = &["limit", "offset", "q", "includeInactive"];

/// Conditions for listing a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Exact matches on top-level document fields (camelCase names).
    pub fields: Vec<(String, String)>,
    /// Case-insensitive substring match over the whole document.
    pub search: Option<String>,
    pub include_inactive: bool,
    /// `None` lists everything.
    pub limit: Option<i64>,
    pub offset: i64,
}

impl ListFilter {
    /// Every active record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an exact-match condition.
    pub fn and(mut self, field: &str, value: impl Into<String>) -> Self {
        self.fields.push((field.to_string(), value.into()));
        self
    }

    /// Parse request query parameters for resource `R`.
    ///
    /// Unknown filter keys are rejected rather than ignored so a typo does not
    /// silently return the unfiltered collection.
    pub fn from_params<R: Resource>(
        params: &HashMap<String, String>,
        default_limit: i64,
        max_limit: i64,
    ) -> Result<Self, AppError> {
        let limit = match params.get("limit") {
            Some(raw) => parse_count(raw, "limit")?.clamp(1, max_limit),
            None => default_limit.min(max_limit),
        };
        let offset = match params.get("offset") {
            Some(raw) => parse_count(raw, "offset")?,
            None => 0,
        };
        let include_inactive = match params.get("includeInactive").map(String::as_str) {
            Some("true") | Some("1") => true,
            Some("false") | Some("0") | None => false,
            Some(other) => {
                return Err(AppError::validation(format!(
                    "includeInactive must be true or false, got '{}'",
                    other
                )))
            }
        };
        let search = params
            .get("q")
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        let mut fields: Vec<(String, String)> = Vec::new();
        for (key, value) in params {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if !R::FILTER_FIELDS.contains(&key.as_str()) {
                return Err(AppError::validation(format!(
                    "Unknown filter '{}' for {}; allowed: {}",
                    key,
                    R::COLLECTION,
                    R::FILTER_FIELDS.join(", ")
                )));
            }
            fields.push((key.clone(), normalize_filter_value(value)));
        }
        // HashMap order is random; keep generated SQL stable.
        fields.sort();

        Ok(Self {
            fields,
            search,
            include_inactive,
            limit: Some(limit),
            offset,
        })
    }
}

fn parse_count(raw: &str, name: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|v| *v >= 0)
        .ok_or_else(|| AppError::validation(format!("{} must be a non-negative integer", name)))
}

/// JSON booleans are extracted by SQLite as 1/0.
fn normalize_filter_value(value: &str) -> String {
    match value {
        "true" => "1".to_string(),
        "false" => "0".to_string(),
        other => other.to_string(),
    }
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn meta(&self) -> PageMeta {
        PageMeta {
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Pagination information returned next to list data.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageMeta {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    pub offset: i64,
}
