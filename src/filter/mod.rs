//! ECQL-style filter expressions.
//!
//! A `Filter` is a parsed predicate over feature records, covering the subset
//! of the extended constraint query language the demo queries exercise:
//! attribute comparisons, `IN` membership, `strStartsWith`/`strEndsWith`
//! string functions, and the `DWITHIN` spatial predicate, combined with
//! `AND`/`OR`/`NOT` and parentheses.
//!
//! ```rust
//! use geocatalog::{Feature, Filter};
//! use geo::Point;
//!
//! let filter = Filter::parse("line IN ('地铁10号线', '地铁14号线')")?;
//! let station = Feature::new("station.1", Point::new(116.461, 39.909))
//!     .with_attribute("line", "地铁10号线");
//! assert!(filter.matches(&station));
//! # Ok::<(), geocatalog::CatalogError>(())
//! ```

mod parser;

use crate::error::Result;
use crate::feature::Feature;
use geo::{Distance, Haversine, Point};
use serde_json::Value;
use std::fmt;

/// Comparison operators for attribute predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        };
        write!(f, "{}", op)
    }
}

/// A literal value in a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
}

/// A parsed filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
    /// `attr <op> literal`
    Compare {
        attr: String,
        op: CompareOp,
        value: Literal,
    },
    /// `attr IN (v1, v2, ...)`
    In { attr: String, values: Vec<Literal> },
    /// `strStartsWith(attr, 'prefix') = true`
    StrStartsWith { attr: String, prefix: String },
    /// `strEndsWith(attr, 'suffix') = true`
    StrEndsWith { attr: String, suffix: String },
    /// `DWITHIN(geomattr, POINT(x y), distance, units)`, distance in meters.
    DWithin {
        attr: String,
        center: Point,
        meters: f64,
    },
}

impl Filter {
    /// Parse an ECQL-style expression into a filter predicate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::FilterParse` when the expression is not valid.
    pub fn parse(input: &str) -> Result<Self> {
        parser::parse(input)
    }

    /// Evaluate this predicate against a feature record.
    ///
    /// Missing attributes and type-mismatched comparisons are non-matches,
    /// never errors.
    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            Filter::And(lhs, rhs) => lhs.matches(feature) && rhs.matches(feature),
            Filter::Or(lhs, rhs) => lhs.matches(feature) || rhs.matches(feature),
            Filter::Not(inner) => !inner.matches(feature),
            Filter::Compare { attr, op, value } => feature
                .attribute(attr)
                .is_some_and(|actual| compare(actual, *op, value)),
            Filter::In { attr, values } => feature.attribute(attr).is_some_and(|actual| {
                values
                    .iter()
                    .any(|value| compare(actual, CompareOp::Eq, value))
            }),
            Filter::StrStartsWith { attr, prefix } => str_attribute(feature, attr)
                .is_some_and(|s| s.to_lowercase().starts_with(&prefix.to_lowercase())),
            Filter::StrEndsWith { attr, suffix } => str_attribute(feature, attr)
                .is_some_and(|s| s.to_lowercase().ends_with(&suffix.to_lowercase())),
            Filter::DWithin { center, meters, .. } => {
                Haversine.distance(*feature.geometry(), *center) <= *meters
            }
        }
    }

    /// The tightest `DWITHIN` constraint reachable through top-level `AND`
    /// conjuncts, if any. Backends use it to prune candidates with a spatial
    /// index before the full predicate runs.
    pub fn dwithin_bounds(&self) -> Option<(Point, f64)> {
        match self {
            Filter::DWithin { center, meters, .. } => Some((*center, *meters)),
            Filter::And(lhs, rhs) => match (lhs.dwithin_bounds(), rhs.dwithin_bounds()) {
                (Some(a), Some(b)) => Some(if a.1 <= b.1 { a } else { b }),
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (None, None) => None,
            },
            // a DWITHIN under OR or NOT does not bound the result set
            _ => None,
        }
    }
}

fn str_attribute<'a>(feature: &'a Feature, attr: &str) -> Option<&'a str> {
    feature.attribute(attr).and_then(Value::as_str)
}

fn compare(actual: &Value, op: CompareOp, expected: &Literal) -> bool {
    match (actual, expected) {
        (Value::String(a), Literal::Str(e)) => ord_matches(op, a.as_str().cmp(e.as_str())),
        (Value::Number(a), Literal::Num(e)) => a
            .as_f64()
            .and_then(|a| a.partial_cmp(e))
            .is_some_and(|ord| ord_matches(op, ord)),
        (Value::Bool(a), Literal::Bool(e)) => match op {
            CompareOp::Eq => a == e,
            CompareOp::Ne => a != e,
            _ => false,
        },
        _ => false,
    }
}

fn ord_matches(op: CompareOp, ord: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::*;
    match op {
        CompareOp::Eq => ord == Equal,
        CompareOp::Ne => ord != Equal,
        CompareOp::Lt => ord == Less,
        CompareOp::Le => ord != Greater,
        CompareOp::Gt => ord == Greater,
        CompareOp::Ge => ord != Less,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guomao() -> Feature {
        Feature::new("station.1", Point::new(116.461, 39.909))
            .with_attribute("name", "国贸")
            .with_attribute("stationNameEn", "Guomao")
            .with_attribute("line", "地铁10号线")
            .with_attribute("exits", 8)
    }

    #[test]
    fn test_compare_string_eq() {
        let filter = Filter::parse("line = '地铁10号线'").unwrap();
        assert!(filter.matches(&guomao()));

        let filter = Filter::parse("line = '地铁14号线'").unwrap();
        assert!(!filter.matches(&guomao()));
    }

    #[test]
    fn test_compare_number_ordering() {
        assert!(Filter::parse("exits > 5").unwrap().matches(&guomao()));
        assert!(Filter::parse("exits <= 8").unwrap().matches(&guomao()));
        assert!(!Filter::parse("exits < 8").unwrap().matches(&guomao()));
        assert!(Filter::parse("exits <> 3").unwrap().matches(&guomao()));
    }

    #[test]
    fn test_missing_attribute_never_matches() {
        assert!(!Filter::parse("color = 'red'").unwrap().matches(&guomao()));
        // but NOT over a missing attribute does match
        assert!(
            Filter::parse("NOT color = 'red'")
                .unwrap()
                .matches(&guomao())
        );
    }

    #[test]
    fn test_type_mismatch_never_matches() {
        assert!(!Filter::parse("line = 42").unwrap().matches(&guomao()));
        assert!(!Filter::parse("exits = 'eight'").unwrap().matches(&guomao()));
    }

    #[test]
    fn test_in_membership() {
        let filter = Filter::parse("line IN ('地铁10号线', '地铁14号线')").unwrap();
        assert!(filter.matches(&guomao()));

        let filter = Filter::parse("line IN ('地铁1号线', '地铁2号线')").unwrap();
        assert!(!filter.matches(&guomao()));
    }

    #[test]
    fn test_str_ends_with_case_insensitive() {
        let filter = Filter::parse("strEndsWith(stationNameEn, 'MAO') = true").unwrap();
        assert!(filter.matches(&guomao()));

        let filter = Filter::parse("strEndsWith(stationNameEn, 'zhuang') = true").unwrap();
        assert!(!filter.matches(&guomao()));
    }

    #[test]
    fn test_str_starts_with() {
        let filter = Filter::parse("strStartsWith(stationNameEn, 'guo') = true").unwrap();
        assert!(filter.matches(&guomao()));
    }

    #[test]
    fn test_dwithin_haversine() {
        // Tiananmen is ~6 km from Guomao
        let filter = Filter::parse("DWITHIN(geom, POINT(116.391 39.905), 10, kilometers)").unwrap();
        assert!(filter.matches(&guomao()));

        let filter = Filter::parse("DWITHIN(geom, POINT(116.391 39.905), 2, kilometers)").unwrap();
        assert!(!filter.matches(&guomao()));
    }

    #[test]
    fn test_and_or_combination() {
        let filter = Filter::parse(
            "DWITHIN(geom, POINT(116.391 39.905), 10, kilometers) AND line = '地铁10号线'",
        )
        .unwrap();
        assert!(filter.matches(&guomao()));

        let filter =
            Filter::parse("line = '地铁14号线' OR strEndsWith(stationNameEn, 'mao') = true")
                .unwrap();
        assert!(filter.matches(&guomao()));
    }

    #[test]
    fn test_dwithin_bounds_from_conjunction() {
        let filter = Filter::parse(
            "line = '地铁10号线' AND DWITHIN(geom, POINT(116.391 39.905), 10, kilometers)",
        )
        .unwrap();
        let (center, meters) = filter.dwithin_bounds().unwrap();
        assert_eq!(center, Point::new(116.391, 39.905));
        assert_eq!(meters, 10_000.0);
    }

    #[test]
    fn test_dwithin_bounds_takes_tightest() {
        let filter = Filter::parse(
            "DWITHIN(geom, POINT(0 0), 5, kilometers) AND DWITHIN(geom, POINT(0 0), 2000, meters)",
        )
        .unwrap();
        assert_eq!(filter.dwithin_bounds().unwrap().1, 2_000.0);
    }

    #[test]
    fn test_dwithin_under_or_has_no_bounds() {
        let filter = Filter::parse(
            "line = '地铁10号线' OR DWITHIN(geom, POINT(116.391 39.905), 10, kilometers)",
        )
        .unwrap();
        assert!(filter.dwithin_bounds().is_none());
    }
}
