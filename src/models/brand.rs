//! Brand model for the product catalog.

use serde::{Deserialize, Serialize};

use super::{require_non_empty, Resource};
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl Resource for Brand {
    const COLLECTION: &'static str = "brands";
    const ID_PREFIX: &'static str = "BR";
    const LABEL: &'static str = "Brand";
    const FILTER_FIELDS: &'static [&'static str] = &["country"];

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.name, "Brand name")
    }
}
