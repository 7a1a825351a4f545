//! Price quotes from price lists.

use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::Utc;
use serde::Deserialize;

use super::{success, ApiResult, QueryParams};
use crate::context::RequestContext;
use crate::errors::AppError;
use crate::models::{PriceList, PriceQuote, Product};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// GET /api/price-lists/:id/price/:product_id?quantity=n
pub async fn quote_price(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((list_id, product_id)): Path<(String, String)>,
    QueryParams(query): QueryParams<QuoteQuery>,
) -> ApiResult<PriceQuote> {
    if query.quantity == 0 {
        return Err(AppError::validation("quantity must be at least 1"));
    }

    let list = state
        .repo
        .get::<PriceList>(&ctx.tenant, &list_id)
        .await?
        .ok_or_else(|| AppError::missing("Price list", &list_id))?;
    if state
        .repo
        .get::<Product>(&ctx.tenant, &product_id)
        .await?
        .is_none()
    {
        return Err(AppError::missing("Product", &product_id));
    }

    let today = Utc::now().date_naive();
    if !list.data.is_valid_on(today) {
        return Err(AppError::validation(format!(
            "Price list {} is not valid on {}",
            list_id, today
        )));
    }

    match list.data.quote(&product_id, query.quantity) {
        Some(quote) => success(quote),
        None => Err(AppError::NotFound(format!(
            "No price for product {} at quantity {} in price list {}",
            product_id, query.quantity, list_id
        ))),
    }
}
