//! 产品处理器

use axum::{extract::State, response::Json};

use super::model::Product;
use crate::{app::AppState, core::error::CoreError};

/// GET /products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, CoreError> {
    let products = state.product_service.list_products().await?;
    Ok(Json(products))
}
