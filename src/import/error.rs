//! Import failures: run-level (the file) and row-level (one record).

use thiserror::Error;

use super::parser::Column;
use crate::domain::aggregates::Family;

/// Aborts the whole import before any row is processed.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Le fichier est vide")]
    EmptyFile,

    #[error("Colonnes non reconnues ({}), colonnes attendues : {}", .0.join(", "), Column::expected_headers())]
    UnrecognizedColumns(Vec<String>),

    #[error("Fichier illisible : {0}")]
    Malformed(String),

    #[error("Erreur lors du chargement des catégories : {0}")]
    Store(#[from] crate::CatalogError),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self { ImportError::Malformed(err.to_string()) }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self { ImportError::Malformed(err.to_string()) }
}

/// Rejects a single row; the run carries on with the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Champ obligatoire manquant : {0}")]
    MissingRequiredField(Column),

    #[error("{column} invalide : {reason}")]
    InvalidReference { column: Column, reason: String },

    #[error("Catégorie \"{0}\" non trouvée")]
    CategoryNotFound(String),

    #[error("Erreur lors de la création : {0}")]
    Creation(String),
}

impl RowError {
    /// Stable machine-readable code reported next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingRequiredField(_) => "MissingRequiredField",
            Self::InvalidReference { .. } => "InvalidReference",
            Self::CategoryNotFound(_) => "CategoryNotFound",
            Self::Creation(_) => "CreationError",
        }
    }
}

/// A rejected row. A row can fail on its subfamily after creating its family;
/// that family stays in the store and is carried here so it is still counted.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub error: RowError,
    pub created_family: Option<Family>,
}

impl From<RowError> for RowFailure {
    fn from(error: RowError) -> Self { Self { error, created_family: None } }
}
