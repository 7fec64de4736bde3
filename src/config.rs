//! Demo configuration.
//!
//! The original demonstration passed connection parameters as an untyped
//! string map; here the same inputs are a typed, serializable struct that can
//! be loaded from JSON or used with its built-in defaults.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the query demonstration harness.
///
/// Every field has a default reproducing the original demo, so
/// `DemoConfig::default()` runs out of the box.
///
/// # Example
///
/// ```rust
/// use geocatalog::DemoConfig;
///
/// let config = DemoConfig::default();
/// assert_eq!(config.catalog, "geomesa");
/// assert_eq!(config.max_features, 10);
///
/// // Load from JSON, overriding only some fields
/// let json = r#"{ "type_name": "bus_stop", "max_features": 5 }"#;
/// let config: DemoConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.catalog, "geomesa");
/// assert_eq!(config.max_features, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Catalog identifier grouping the feature-type schemas.
    #[serde(default = "DemoConfig::default_catalog")]
    pub catalog: String,

    /// Target feature-type name, matched case-insensitively against the
    /// names the datastore enumerates.
    #[serde(default = "DemoConfig::default_type_name")]
    pub type_name: String,

    /// Filter expressions to run, in order.
    #[serde(default = "DemoConfig::default_filters")]
    pub filters: Vec<String>,

    /// Maximum number of records returned per query.
    #[serde(default = "DemoConfig::default_max_features")]
    pub max_features: usize,
}

impl DemoConfig {
    fn default_catalog() -> String {
        "geomesa".to_string()
    }

    fn default_type_name() -> String {
        "beijing_subway_station".to_string()
    }

    fn default_filters() -> Vec<String> {
        vec![
            // IN membership over multiple subway lines
            "line IN ('地铁10号线', '地铁14号线')".to_string(),
            // string-function predicate: English names ending in "zhuang"
            "strEndsWith(stationNameEn, 'zhuang') = true".to_string(),
            // spatial predicate combined with an attribute comparison:
            // line-10 stations within 10 km of Tiananmen
            "DWITHIN(geom, POINT(116.391 39.905), 10, kilometers) AND line = '地铁10号线'"
                .to_string(),
        ]
    }

    const fn default_max_features() -> usize {
        crate::query::DEFAULT_MAX_FEATURES
    }

    /// Load a configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_type_name<S: Into<String>>(mut self, type_name: S) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            catalog: Self::default_catalog(),
            type_name: Self::default_type_name(),
            filters: Self::default_filters(),
            max_features: Self::default_max_features(),
        }
    }
}
