//! Product catalog model.

use serde::{Deserialize, Serialize};

use super::{employee::default_currency, require_non_empty, require_non_negative, Resource};
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub base_price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

fn default_unit() -> String {
    "piece".to_string()
}

impl Resource for Product {
    const COLLECTION: &'static str = "products";
    const ID_PREFIX: &'static str = "PRD";
    const LABEL: &'static str = "Product";
    const FILTER_FIELDS: &'static [&'static str] = &["brandId", "category", "sku"];

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.name, "Product name")?;
        require_non_empty(&self.sku, "SKU")?;
        require_non_empty(&self.unit, "Unit")?;
        require_non_negative(self.base_price, "Base price")
    }
}
