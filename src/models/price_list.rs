//! Price lists with quantity tiers and discounts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    employee::default_currency, require_non_empty, require_non_negative, round_money, Resource,
};
use crate::errors::AppError;

/// One price tier of a product within a price list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceListItem {
    pub product_id: String,
    pub price: f64,
    #[serde(default = "default_min_quantity")]
    pub min_quantity: u32,
    #[serde(default)]
    pub discount_percent: f64,
}

fn default_min_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceList {
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<NaiveDate>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub items: Vec<PriceListItem>,
}

/// Price of a product for a quantity under a price list.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub product_id: String,
    pub currency: String,
    pub quantity: u32,
    pub min_quantity: u32,
    pub unit_price: f64,
    pub discount_percent: f64,
    pub effective_unit_price: f64,
    pub line_total: f64,
}

impl PriceList {
    /// Quote `product_id` at `quantity`, using the highest tier the quantity reaches.
    pub fn quote(&self, product_id: &str, quantity: u32) -> Option<PriceQuote> {
        let item = self
            .items
            .iter()
            .filter(|i| i.product_id == product_id && i.min_quantity <= quantity)
            .max_by_key(|i| i.min_quantity)?;
        let effective = round_money(item.price * (1.0 - item.discount_percent / 100.0));
        Some(PriceQuote {
            product_id: product_id.to_string(),
            currency: self.currency.clone(),
            quantity,
            min_quantity: item.min_quantity,
            unit_price: item.price,
            discount_percent: item.discount_percent,
            effective_unit_price: effective,
            line_total: round_money(effective * f64::from(quantity)),
        })
    }

    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.valid_from.is_none_or(|from| from <= date) && self.valid_to.is_none_or(|to| date <= to)
    }
}

impl Resource for PriceList {
    const COLLECTION: &'static str = "price_lists";
    const ID_PREFIX: &'static str = "PL";
    const LABEL: &'static str = "Price list";
    const FILTER_FIELDS: &'static [&'static str] = &["currency", "isDefault"];

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.name, "Price list name")?;
        require_non_empty(&self.currency, "Currency")?;
        if let (Some(from), Some(to)) = (self.valid_from, self.valid_to) {
            if to < from {
                return Err(AppError::validation("validTo must not be before validFrom"));
            }
        }
        for item in &self.items {
            require_non_empty(&item.product_id, "Item product")?;
            require_non_negative(item.price, "Item price")?;
            if item.min_quantity == 0 {
                return Err(AppError::validation("Item minQuantity must be at least 1"));
            }
            if !(0.0..=100.0).contains(&item.discount_percent) {
                return Err(AppError::validation(
                    "Item discountPercent must be between 0 and 100",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> PriceList {
        PriceList {
            name: "Wholesale 2024".to_string(),
            currency: "EGP".to_string(),
            valid_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            valid_to: NaiveDate::from_ymd_opt(2024, 12, 31),
            is_default: false,
            items: vec![
                PriceListItem {
                    product_id: "PRD001".to_string(),
                    price: 100.0,
                    min_quantity: 1,
                    discount_percent: 0.0,
                },
                PriceListItem {
                    product_id: "PRD001".to_string(),
                    price: 90.0,
                    min_quantity: 10,
                    discount_percent: 5.0,
                },
            ],
        }
    }

    #[test]
    fn test_quote_picks_highest_reached_tier() {
        let quote = list().quote("PRD001", 12).unwrap();
        assert_eq!(quote.min_quantity, 10);
        assert_eq!(quote.effective_unit_price, 85.5);
        assert_eq!(quote.line_total, 1026.0);

        let quote = list().quote("PRD001", 3).unwrap();
        assert_eq!(quote.unit_price, 100.0);
        assert_eq!(quote.line_total, 300.0);
    }

    #[test]
    fn test_quote_unknown_product() {
        assert!(list().quote("PRD404", 1).is_none());
        assert!(list().quote("PRD001", 0).is_none());
    }

    #[test]
    fn test_validation() {
        assert!(list().validate().is_ok());

        let mut bad = list();
        bad.items[0].discount_percent = 120.0;
        assert!(bad.validate().is_err());

        let mut reversed = list();
        reversed.valid_to = NaiveDate::from_ymd_opt(2023, 1, 1);
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_validity_window() {
        let l = list();
        assert!(l.is_valid_on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        assert!(!l.is_valid_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    }
}
