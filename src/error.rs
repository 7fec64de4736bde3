//! Error types for geocatalog.

use thiserror::Error;

/// Errors produced by datastores, the filter language, and the demo harness.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The datastore handle could not be obtained. Unrecoverable by design.
    #[error("connection error: {0}")]
    Connection(String),

    /// The datastore was already disposed.
    #[error("datastore is closed")]
    Closed,

    /// The queried feature type is not registered in the catalog.
    #[error("unknown feature type: {0}")]
    UnknownFeatureType(String),

    /// A filter expression failed to parse.
    #[error("filter parse error: {0}")]
    FilterParse(String),

    /// Seed data was not valid GeoJSON, or not a supported geometry.
    #[error("geojson error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
