//! Embedded in-memory datastore.
//!
//! `MemoryStore` keeps every feature type in memory: a feature vector in
//! insertion order plus an R-tree over positions. Queries with a `DWITHIN`
//! conjunct probe the R-tree with a degree-approximated bounding envelope and
//! verify candidates with the precise haversine predicate; everything else is
//! a linear scan.

use crate::config::DemoConfig;
use crate::datastore::{DataStore, FeatureReader};
use crate::error::{CatalogError, Result};
use crate::feature::{Feature, FeatureType};
use crate::query::Query;
use geo::Point;
use geojson::{FeatureCollection, GeoJson};
use parking_lot::RwLock;
use rstar::{AABB, RTree, primitives::GeomWithData};
use rustc_hash::FxHashMap;

/// Position entry in the per-type R-tree, carrying the feature's index in the
/// insertion-order vector.
type IndexedPosition = GeomWithData<[f64; 2], usize>;

/// Meters per degree of latitude, at the short end of the range so envelope
/// padding never under-covers.
const METERS_PER_DEGREE_LAT: f64 = 110_574.0;
/// Meters per degree of longitude at the equator.
const METERS_PER_DEGREE_LON: f64 = 111_320.0;

struct TypeEntry {
    schema: FeatureType,
    features: Vec<Feature>,
    index: RTree<IndexedPosition>,
}

struct StoreInner {
    /// Type names in registration order; `type_names` reports this order.
    order: Vec<String>,
    types: FxHashMap<String, TypeEntry>,
    closed: bool,
}

/// An embedded, in-memory feature catalog.
///
/// # Example
///
/// ```rust
/// use geocatalog::{DataStore, DemoConfig, Feature, FeatureType, Filter, MemoryStore, Query};
/// use geo::Point;
///
/// let store = MemoryStore::connect(&DemoConfig::default())?;
/// store.create_type(FeatureType::new("cities").with_field("name"))?;
/// store.insert(
///     "cities",
///     Feature::new("cities.1", Point::new(-74.0060, 40.7128)).with_attribute("name", "NYC"),
/// )?;
///
/// let query = Query::new("cities", Filter::parse("name = 'NYC'")?);
/// let mut reader = store.feature_reader(&query)?;
/// assert!(reader.next()?.is_some());
/// # Ok::<(), geocatalog::CatalogError>(())
/// ```
pub struct MemoryStore {
    catalog: String,
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    /// Connect to an in-memory catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Connection` when the configuration names no
    /// catalog. This is the unrecoverable tier: callers are expected to
    /// terminate on it.
    pub fn connect(config: &DemoConfig) -> Result<Self> {
        if config.catalog.trim().is_empty() {
            return Err(CatalogError::Connection(
                "no catalog identifier in configuration".to_string(),
            ));
        }

        Ok(Self {
            catalog: config.catalog.clone(),
            inner: RwLock::new(StoreInner {
                order: Vec::new(),
                types: FxHashMap::default(),
                closed: false,
            }),
        })
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    /// Register a feature-type schema.
    pub fn create_type(&self, schema: FeatureType) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.closed {
            return Err(CatalogError::Closed);
        }
        let name = schema.name().to_string();
        if inner.types.contains_key(&name) {
            return Err(CatalogError::Other(format!(
                "feature type '{name}' already exists"
            )));
        }

        inner.order.push(name.clone());
        inner.types.insert(
            name,
            TypeEntry {
                schema,
                features: Vec::new(),
                index: RTree::new(),
            },
        );
        Ok(())
    }

    /// Insert a feature record under a registered type.
    pub fn insert(&self, type_name: &str, feature: Feature) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.closed {
            return Err(CatalogError::Closed);
        }
        let entry = inner
            .types
            .get_mut(type_name)
            .ok_or_else(|| CatalogError::UnknownFeatureType(type_name.to_string()))?;

        let position = [feature.geometry().x(), feature.geometry().y()];
        entry
            .index
            .insert(IndexedPosition::new(position, entry.features.len()));
        entry.features.push(feature);
        Ok(())
    }

    /// Seed a registered type from a GeoJSON FeatureCollection of points.
    ///
    /// Feature ids come from the GeoJSON `id` member when present, otherwise
    /// they are generated as `{type_name}.{n}`. Properties become attribute
    /// values unchanged.
    ///
    /// Returns the number of features loaded.
    pub fn load_geojson(&self, type_name: &str, raw: &str) -> Result<usize> {
        let geojson: GeoJson = raw.parse()?;
        let collection = FeatureCollection::try_from(geojson)?;

        let mut count = 0;
        for (i, gj_feature) in collection.features.into_iter().enumerate() {
            let geometry = gj_feature.geometry.as_ref().ok_or_else(|| {
                CatalogError::Other(format!("feature {i} in '{type_name}' has no geometry"))
            })?;
            let point = match &geometry.value {
                geojson::Value::Point(coords) if coords.len() >= 2 => {
                    Point::new(coords[0], coords[1])
                }
                other => {
                    return Err(CatalogError::Other(format!(
                        "feature {i} in '{type_name}': unsupported geometry {}",
                        other.type_name()
                    )));
                }
            };

            let id = match gj_feature.id {
                Some(geojson::feature::Id::String(s)) => s,
                Some(geojson::feature::Id::Number(n)) => format!("{type_name}.{n}"),
                None => format!("{type_name}.{}", i + 1),
            };

            let mut feature = Feature::new(id, point);
            if let Some(properties) = gj_feature.properties {
                for (name, value) in properties {
                    feature = feature.with_attribute(name, value);
                }
            }

            self.insert(type_name, feature)?;
            count += 1;
        }
        Ok(count)
    }

    /// The schema registered for a type name, if any.
    pub fn schema(&self, type_name: &str) -> Option<FeatureType> {
        let inner = self.inner.read();
        inner.types.get(type_name).map(|entry| entry.schema.clone())
    }
}

impl DataStore for MemoryStore {
    fn type_names(&self) -> Result<Vec<String>> {
        let inner = self.inner.read();
        if inner.closed {
            return Err(CatalogError::Closed);
        }
        Ok(inner.order.clone())
    }

    fn feature_reader(&self, query: &Query) -> Result<Box<dyn FeatureReader + '_>> {
        let inner = self.inner.read();
        if inner.closed {
            return Err(CatalogError::Closed);
        }
        let entry = inner
            .types
            .get(query.type_name())
            .ok_or_else(|| CatalogError::UnknownFeatureType(query.type_name().to_string()))?;

        let filter = query.filter();
        let cap = query.max_features();
        let mut results = Vec::new();

        if let Some((center, meters)) = filter.dwithin_bounds() {
            // Prune with the R-tree, then verify every candidate with the
            // full predicate. Envelope padding over-covers so the precise
            // haversine check is the only arbiter.
            let envelope = search_envelope(&center, meters);
            let mut candidates: Vec<usize> = entry
                .index
                .locate_in_envelope_intersecting(&envelope)
                .map(|pos| pos.data)
                .collect();
            // insertion order, like the linear path
            candidates.sort_unstable();

            for idx in candidates {
                if results.len() == cap {
                    break;
                }
                let feature = &entry.features[idx];
                if filter.matches(feature) {
                    results.push(feature.clone());
                }
            }
        } else {
            for feature in &entry.features {
                if results.len() == cap {
                    break;
                }
                if filter.matches(feature) {
                    results.push(feature.clone());
                }
            }
        }

        Ok(Box::new(MemoryReader {
            results: results.into_iter(),
        }))
    }

    fn dispose(&self) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.closed {
            return Err(CatalogError::Closed);
        }
        inner.closed = true;
        Ok(())
    }
}

/// Bounding envelope in degrees around a center, wide enough to contain every
/// point within `meters`.
fn search_envelope(center: &Point, meters: f64) -> AABB<[f64; 2]> {
    let lat_pad = meters / METERS_PER_DEGREE_LAT;
    let cos_lat = center.y().to_radians().cos().abs().max(1e-6);
    let lon_pad = meters / (METERS_PER_DEGREE_LON * cos_lat);

    AABB::from_corners(
        [center.x() - lon_pad, center.y() - lat_pad],
        [center.x() + lon_pad, center.y() + lat_pad],
    )
}

struct MemoryReader {
    results: std::vec::IntoIter<Feature>,
}

impl FeatureReader for MemoryReader {
    fn next(&mut self) -> Result<Option<Feature>> {
        Ok(self.results.next())
    }
}
