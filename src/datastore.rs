//! Datastore abstraction.
//!
//! `DataStore` is the statically-typed client interface to a catalog of
//! feature types. Backends implement it; the query harness and the tests talk
//! only to the trait.

use crate::error::Result;
use crate::feature::Feature;
use crate::query::Query;

/// A connected handle to a catalog of feature-type schemas.
pub trait DataStore {
    /// Names of all feature types registered in the catalog.
    fn type_names(&self) -> Result<Vec<String>>;

    /// Open a scoped record cursor for a query. The cursor is released when
    /// dropped.
    fn feature_reader(&self, query: &Query) -> Result<Box<dyn FeatureReader + '_>>;

    /// Release the handle. Every operation after this fails with
    /// `CatalogError::Closed`, including a second `dispose`.
    fn dispose(&self) -> Result<()>;
}

/// An iterator-like cursor over query results.
pub trait FeatureReader {
    /// The next record, or `None` when the cursor is exhausted.
    fn next(&mut self) -> Result<Option<Feature>>;
}
