//! Harness behavior against a mock backend: release discipline, query
//! bounding, case-insensitive type resolution, and per-query failure
//! isolation.

use geo::Point;
use geocatalog::harness::{RunOutcome, run};
use geocatalog::{
    CatalogError, DataStore, DemoConfig, Feature, FeatureReader, Query, Result,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct MockStore {
    types: Vec<String>,
    rows: Vec<Feature>,
    /// 0-based index of the `feature_reader` call that fails.
    fail_on_query: Option<usize>,
    fail_dispose: bool,
    disposals: AtomicUsize,
    queries: Mutex<Vec<Query>>,
}

impl MockStore {
    fn with_types(types: &[&str]) -> Self {
        Self {
            types: types.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn disposals(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    fn recorded_queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }
}

impl DataStore for MockStore {
    fn type_names(&self) -> Result<Vec<String>> {
        Ok(self.types.clone())
    }

    fn feature_reader(&self, query: &Query) -> Result<Box<dyn FeatureReader + '_>> {
        let mut queries = self.queries.lock().unwrap();
        let call_index = queries.len();
        queries.push(query.clone());

        if self.fail_on_query == Some(call_index) {
            return Err(CatalogError::Other("injected query failure".to_string()));
        }

        let rows: Vec<Feature> = self
            .rows
            .iter()
            .take(query.max_features())
            .cloned()
            .collect();
        Ok(Box::new(MockReader {
            rows: rows.into_iter(),
        }))
    }

    fn dispose(&self) -> Result<()> {
        self.disposals.fetch_add(1, Ordering::SeqCst);
        if self.fail_dispose {
            return Err(CatalogError::Other("injected dispose failure".to_string()));
        }
        Ok(())
    }
}

struct MockReader {
    rows: std::vec::IntoIter<Feature>,
}

impl FeatureReader for MockReader {
    fn next(&mut self) -> Result<Option<Feature>> {
        Ok(self.rows.next())
    }
}

fn station(id: &str) -> Feature {
    Feature::new(id, Point::new(116.461, 39.909)).with_attribute("line", "地铁10号线")
}

fn run_captured(store: &MockStore, config: &DemoConfig) -> (RunOutcome, String) {
    let mut out = Vec::new();
    let outcome = run(store, config, &mut out).unwrap();
    (outcome, String::from_utf8(out).unwrap())
}

#[test]
fn empty_catalog_releases_once_without_querying() {
    let store = MockStore::with_types(&[]);
    let (outcome, output) = run_captured(&store, &DemoConfig::default());

    assert_eq!(outcome, RunOutcome::EmptyCatalog);
    assert!(output.contains("no feature types registered in catalog 'geomesa'"));
    assert_eq!(store.disposals(), 1);
    assert!(store.recorded_queries().is_empty());
}

#[test]
fn absent_type_releases_once_without_querying() {
    let store = MockStore::with_types(&["Roads", "Rivers"]);
    let (outcome, output) = run_captured(&store, &DemoConfig::default());

    assert_eq!(outcome, RunOutcome::TypeNotFound);
    assert!(output.contains("target feature type 'beijing_subway_station' does not exist"));
    assert_eq!(store.disposals(), 1);
    assert!(store.recorded_queries().is_empty());
}

#[test]
fn target_resolves_case_insensitively_to_enumerated_name() {
    let store = MockStore::with_types(&["Beijing_Subway_Station"]);
    let (outcome, _) = run_captured(&store, &DemoConfig::default());

    assert_eq!(outcome, RunOutcome::Completed);
    let queries = store.recorded_queries();
    assert_eq!(queries.len(), 3);
    for query in &queries {
        // the enumerated original-case name, not the configured lower-case one
        assert_eq!(query.type_name(), "Beijing_Subway_Station");
    }
    assert_eq!(store.disposals(), 1);
}

#[test]
fn queries_are_bounded_and_records_numbered_from_one() {
    let mut store = MockStore::with_types(&["Beijing_Subway_Station"]);
    store.rows = vec![station("station.a"), station("station.b")];
    let (outcome, output) = run_captured(&store, &DemoConfig::default());

    assert_eq!(outcome, RunOutcome::Completed);
    for query in store.recorded_queries() {
        assert_eq!(query.max_features(), 10);
    }
    assert!(output.contains("-> 1: station.a="));
    assert!(output.contains("-> 2: station.b="));
    assert!(!output.contains("-> 3:"));
}

#[test]
fn zero_rows_prints_zero_count_and_no_record_lines() {
    let store = MockStore::with_types(&["Beijing_Subway_Station"]);
    let (outcome, output) = run_captured(&store, &DemoConfig::default());

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(output.matches("-> 0 records matched").count(), 3);
    assert!(!output.contains("-> 1:"));
}

#[test]
fn one_failing_query_does_not_stop_the_rest() {
    let mut store = MockStore::with_types(&["Beijing_Subway_Station"]);
    store.rows = vec![station("station.a")];
    store.fail_on_query = Some(1); // second query fails
    let (outcome, output) = run_captured(&store, &DemoConfig::default());

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(store.recorded_queries().len(), 3);
    // queries 1 and 3 still printed their records
    assert_eq!(output.matches("-> 1: station.a=").count(), 2);
    assert_eq!(store.disposals(), 1);
}

#[test]
fn unparseable_expression_is_isolated_too() {
    let mut store = MockStore::with_types(&["Beijing_Subway_Station"]);
    store.rows = vec![station("station.a")];
    let config = DemoConfig::default().with_filters(vec![
        "this is not ecql ((".to_string(),
        "line = '地铁10号线'".to_string(),
    ]);
    let (outcome, output) = run_captured(&store, &config);

    assert_eq!(outcome, RunOutcome::Completed);
    // only the second expression reached the store
    assert_eq!(store.recorded_queries().len(), 1);
    assert!(output.contains("-> 1: station.a="));
    assert_eq!(store.disposals(), 1);
}

#[test]
fn dispose_failure_does_not_change_the_outcome() {
    let mut store = MockStore::with_types(&[]);
    store.fail_dispose = true;
    let mut out = Vec::new();

    let outcome = run(&store, &DemoConfig::default(), &mut out).unwrap();
    assert_eq!(outcome, RunOutcome::EmptyCatalog);
    assert_eq!(store.disposals(), 1);
}

#[test]
fn configured_cap_is_passed_through() {
    let mut store = MockStore::with_types(&["Beijing_Subway_Station"]);
    store.rows = (0..8).map(|i| station(&format!("station.{i}"))).collect();
    let config = DemoConfig::default().with_max_features(3);
    let (_, output) = run_captured(&store, &config);

    for query in store.recorded_queries() {
        assert_eq!(query.max_features(), 3);
    }
    assert!(output.contains("-> 3: station.2="));
    assert!(!output.contains("-> 4:"));
}
