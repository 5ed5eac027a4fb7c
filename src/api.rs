//! HTTP surface over the product store.
//!
//! Handlers are stateless translations: request in, store call, status code
//! out. All business rules live in the store; all status mapping lives in
//! [`crate::error::ApiError`].

use crate::error::ApiError;
use crate::model::{NewProduct, Product, ProductPatch};
use crate::state::AppState;
use crate::store::ProductRepository;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;
use tracing::instrument;

/// Build the product router. Health endpoints are attached in `run_server`;
/// this router carries only the catalog surface.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            axum::routing::put(update_product).delete(delete_product),
        )
        .with_state(state)
}

#[instrument(skip(state))]
async fn list_products(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.store().list()?;
    Ok(Json(products))
}

#[instrument(skip(state, candidate), fields(reference = %candidate.reference))]
async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(candidate): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let created = state.store().create(candidate)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, patch))]
async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    let updated = state.store().update(id, patch)?;
    Ok(Json(updated))
}

#[instrument(skip(state))]
async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store().delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
