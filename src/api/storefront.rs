use axum::{extract::State, Json};
use serde::Deserialize;

use super::{ApiResult, AppState};
use crate::domain::aggregates::{Cart, CartItem, CartQuote};

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub governorate: String,
}

/// Prices a client-side cart: groups, subtotal, delivery fee and total.
pub async fn quote_cart(State(s): State<AppState>, Json(r): Json<QuoteRequest>) -> ApiResult<Json<CartQuote>> {
    let cart = Cart::from_items(r.items)?;
    Ok(Json(cart.quote(&s.delivery, &r.governorate)?))
}
