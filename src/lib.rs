//! Parashop Catalog
//!
//! Back-office catalog service for a parapharmacy storefront (TND, cash on delivery).
//!
//! ## Features
//! - Category → family → subfamily hierarchy administration
//! - Spreadsheet bulk import (xlsx, xls, ods or CSV) of families and subfamilies, with per-row reporting
//! - Storefront pricing: promo prices, packs, cart grouping and delivery fees
//! - Product listing filters and pagination
//! - Fidelity points and scheduled promotional banners

use thiserror::Error;

pub mod api;
pub mod config;
pub mod domain;
pub mod import;
pub mod publisher;
pub mod store;

pub use config::Config;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{0} introuvable")]
    NotFound(&'static str),

    #[error("Cette référence existe déjà")]
    DuplicateReference,

    #[error("Cette catégorie existe déjà")]
    DuplicateCategory,

    #[error("Données invalides : {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
