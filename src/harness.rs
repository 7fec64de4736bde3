//! Query demonstration harness.
//!
//! The harness drives a connected datastore through one fixed sequence:
//! enumerate the registered feature types, resolve the target type name
//! case-insensitively, run each configured filter expression as a bounded
//! query, and print matching records. An empty catalog or a missing target
//! type ends the run cleanly; a failing query is logged and the remaining
//! queries still run. The datastore handle is released exactly once on every
//! exit path.

use crate::config::DemoConfig;
use crate::datastore::DataStore;
use crate::error::Result;
use crate::filter::Filter;
use crate::query::Query;
use log::error;
use std::io::Write;

/// How a harness run ended. All three variants are clean terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every configured query was attempted.
    Completed,
    /// The catalog enumerated no feature types; no queries were attempted.
    EmptyCatalog,
    /// The target type name matched none of the enumerated names.
    TypeNotFound,
}

/// Run the demonstration against a connected datastore, printing progress and
/// results to `out`.
///
/// The store is disposed exactly once before this returns, whichever path the
/// run takes. A dispose failure is logged, never propagated over the run's
/// own outcome.
pub fn run<S, W>(store: &S, config: &DemoConfig, out: &mut W) -> Result<RunOutcome>
where
    S: DataStore + ?Sized,
    W: Write,
{
    let outcome = drive(store, config, out);
    if let Err(err) = store.dispose() {
        error!("failed to release datastore handle: {err}");
    }
    outcome
}

fn drive<S, W>(store: &S, config: &DemoConfig, out: &mut W) -> Result<RunOutcome>
where
    S: DataStore + ?Sized,
    W: Write,
{
    let type_names = store.type_names()?;
    if type_names.is_empty() {
        writeln!(
            out,
            "no feature types registered in catalog '{}'",
            config.catalog
        )?;
        return Ok(RunOutcome::EmptyCatalog);
    }

    writeln!(out, "feature types in catalog '{}':", config.catalog)?;
    for name in &type_names {
        writeln!(out, " - {name}")?;
    }

    // Case-insensitive match; querying uses the enumerated original-case name.
    let target = config.type_name.to_lowercase();
    let Some(resolved) = type_names
        .iter()
        .find(|name| name.to_lowercase() == target)
    else {
        writeln!(
            out,
            "error: target feature type '{}' does not exist",
            config.type_name
        )?;
        return Ok(RunOutcome::TypeNotFound);
    };

    for (i, expression) in config.filters.iter().enumerate() {
        writeln!(out, "\n[query {}] {expression}", i + 1)?;
        if let Err(err) = execute_query(store, resolved, expression, config.max_features, out) {
            error!("query {} failed: {err}", i + 1);
        }
    }

    Ok(RunOutcome::Completed)
}

/// Parse one expression, run it as a bounded query, and print the records.
/// Failures propagate to the caller, which logs them and moves on.
fn execute_query<S, W>(
    store: &S,
    type_name: &str,
    expression: &str,
    max_features: usize,
    out: &mut W,
) -> Result<()>
where
    S: DataStore + ?Sized,
    W: Write,
{
    let filter = Filter::parse(expression)?;
    let query = Query::new(type_name, filter).with_max_features(max_features);

    writeln!(out, "  executing query...")?;
    let mut reader = store.feature_reader(&query)?;

    let mut count = 0;
    while let Some(feature) = reader.next()? {
        count += 1;
        writeln!(out, "  -> {count}: {feature}")?;
    }
    if count == 0 {
        writeln!(out, "  -> 0 records matched")?;
    }

    Ok(())
}
