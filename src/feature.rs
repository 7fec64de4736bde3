//! Feature types and feature records.
//!
//! A `FeatureType` is a named schema describing the attributes of geospatial
//! records; a `Feature` is one record of such a type. The harness treats
//! records opaquely and only ever serializes them to a display string.

use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A named schema for geospatial records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureType {
    name: String,
    geometry_field: String,
    fields: Vec<String>,
}

impl FeatureType {
    /// Create a feature type with the conventional geometry field `geom`.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            geometry_field: "geom".to_string(),
            fields: Vec::new(),
        }
    }

    pub fn with_geometry_field<S: Into<String>>(mut self, field: S) -> Self {
        self.geometry_field = field.into();
        self
    }

    pub fn with_field<S: Into<String>>(mut self, field: S) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry_field(&self) -> &str {
        &self.geometry_field
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// One geospatial record: an id, a point geometry, and attribute values.
///
/// Attribute values are `serde_json::Value` so records can carry strings,
/// numbers, and booleans without a per-type schema in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    id: String,
    geometry: Point,
    attributes: BTreeMap<String, Value>,
}

impl Feature {
    pub fn new<S: Into<String>>(id: S, geometry: Point) -> Self {
        Self {
            id: id.into(),
            geometry,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute<S: Into<String>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn geometry(&self) -> &Point {
        &self.geometry
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}

/// Encodes a record as `id=attr:value|...|geom:POINT (x y)`.
impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.id)?;
        for (name, value) in &self.attributes {
            match value {
                Value::String(s) => write!(f, "{}:{}|", name, s)?,
                other => write!(f, "{}:{}|", name, other)?,
            }
        }
        write!(
            f,
            "geom:POINT ({} {})",
            self.geometry.x(),
            self.geometry.y()
        )
    }
}
