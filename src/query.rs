//! Bounded queries against a datastore.

use crate::filter::Filter;

/// Default cap on the number of records a query returns.
pub const DEFAULT_MAX_FEATURES: usize = 10;

/// A query over one feature type: a filter predicate plus a result cap.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    type_name: String,
    filter: Filter,
    max_features: usize,
}

impl Query {
    pub fn new<S: Into<String>>(type_name: S, filter: Filter) -> Self {
        Self {
            type_name: type_name.into(),
            filter,
            max_features: DEFAULT_MAX_FEATURES,
        }
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }
}
