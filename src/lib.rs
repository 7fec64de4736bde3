//! Embedded geospatial feature catalog with an ECQL-style filter language and
//! a query demonstration harness.
//!
//! ```rust
//! use geocatalog::{DemoConfig, Feature, FeatureType, MemoryStore, Point, harness};
//!
//! let config = DemoConfig::default();
//! let store = MemoryStore::connect(&config)?;
//! store.create_type(FeatureType::new("Beijing_Subway_Station").with_field("line"))?;
//! store.insert(
//!     "Beijing_Subway_Station",
//!     Feature::new("station.1", Point::new(116.461, 39.909)).with_attribute("line", "地铁10号线"),
//! )?;
//!
//! let mut out = Vec::new();
//! harness::run(&store, &config, &mut out)?;
//! # Ok::<(), geocatalog::CatalogError>(())
//! ```

pub mod config;
pub mod datastore;
pub mod error;
pub mod feature;
pub mod filter;
pub mod harness;
pub mod query;
pub mod store;

pub use config::DemoConfig;
pub use datastore::{DataStore, FeatureReader};
pub use error::{CatalogError, Result};
pub use feature::{Feature, FeatureType};
pub use filter::{CompareOp, Filter, Literal};
pub use harness::{RunOutcome, run};
pub use query::{DEFAULT_MAX_FEATURES, Query};
pub use store::MemoryStore;

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{CatalogError, DemoConfig, Result};

    pub use crate::{DataStore, FeatureReader, MemoryStore};

    pub use crate::{Feature, FeatureType, Filter, Query};

    pub use crate::harness::{RunOutcome, run};

    pub use geo::Point;
}
