//! REST surface: hierarchy administration, bulk import, cart quotes.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Json, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::DEFAULT_IMPORT_MAX_BYTES;
use crate::domain::aggregates::DeliveryPolicy;
use crate::publisher::EventPublisher;
use crate::store::HierarchyStore;

pub mod error;
pub mod hierarchy;
pub mod import;
pub mod storefront;

pub use error::ApiError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HierarchyStore>,
    pub publisher: EventPublisher,
    pub delivery: DeliveryPolicy,
    pub import_max_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn HierarchyStore>, publisher: EventPublisher) -> Self {
        Self { store, publisher, delivery: DeliveryPolicy::default(), import_max_bytes: DEFAULT_IMPORT_MAX_BYTES }
    }

    pub fn with_import_limit(mut self, max_bytes: usize) -> Self { self.import_max_bytes = max_bytes; self }
}

pub fn build_router(state: AppState) -> Router {
    // Multipart framing overhead on top of the file itself.
    let upload_limit = state.import_max_bytes.saturating_add(64 * 1024);

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "parashop-catalog"})) }))
        .route("/api/v1/categories", get(hierarchy::list_categories).post(hierarchy::create_category))
        .route("/api/v1/categories/import", post(import::import_categories).layer(DefaultBodyLimit::max(upload_limit)))
        .route("/api/v1/categories/import/template", get(import::download_template))
        .route("/api/v1/families", get(hierarchy::list_families).post(hierarchy::create_family))
        .route("/api/v1/subfamilies", get(hierarchy::list_subfamilies).post(hierarchy::create_subfamily))
        .route("/api/v1/cart/quote", post(storefront::quote_cart))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}
