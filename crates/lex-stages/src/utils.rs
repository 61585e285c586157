//! Shared utilities for stages, models and adapters.

use crate::error::{Result, StageError};
use crate::types::Table;

// =============================================================================
// Column Utilities
// =============================================================================

/// Column names of a table, in order.
pub fn column_names(table: &Table) -> Vec<String> {
    table
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Fail with a schema mismatch naming every expected column absent from `table`.
pub fn require_columns<S: AsRef<str>>(stage: &str, table: &Table, expected: &[S]) -> Result<()> {
    let present = column_names(table);
    let missing: Vec<&str> = expected
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !present.iter().any(|p| p == name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StageError::missing_columns(stage, &missing))
    }
}

/// Check two ordered column lists are identical, describing the first difference.
pub fn compare_columns<A: AsRef<str>, B: AsRef<str>>(
    expected: &[A],
    actual: &[B],
) -> std::result::Result<(), String> {
    if expected.len() != actual.len() {
        return Err(format!(
            "expected {} columns, got {}",
            expected.len(),
            actual.len()
        ));
    }
    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        if e.as_ref() != a.as_ref() {
            return Err(format!(
                "column {} is '{}', expected '{}'",
                i,
                a.as_ref(),
                e.as_ref()
            ));
        }
    }
    Ok(())
}

// =============================================================================
// Naming Utilities
// =============================================================================

/// Strip module paths and generics from a `std::any::type_name` string.
///
/// `lex_stages::adapter::UniversalAdapter` becomes `UniversalAdapter`.
pub fn short_type_name(full_name: &'static str) -> &'static str {
    let before_generic = match full_name.find('<') {
        Some(pos) => &full_name[..pos],
        None => full_name,
    };

    match before_generic.rfind("::") {
        Some(pos) => &before_generic[pos + 2..],
        None => before_generic,
    }
}
