//! Core data types shared by every contract.

use crate::error::{Result, StageError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, named columnar data consumed and produced by stages.
pub type Table = DataFrame;

/// Target values aligned by row position with a [`Table`]. Also used for predictions.
pub type Labels = Series;

// =============================================================================
// Feature Lineage
// =============================================================================

/// Record of which columns one shape-changing transform consumed, created and removed.
///
/// The columns a transform returns are `input_features` minus `removed_features`
/// (in input order) followed by `created_features`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLineage {
    /// Columns present before the stage ran.
    pub input_features: Vec<String>,
    /// Columns present after the stage ran but absent before.
    pub created_features: Vec<String>,
    /// Columns present before but absent after.
    pub removed_features: Vec<String>,
}

impl FeatureLineage {
    /// Create a lineage record from explicit parts.
    pub fn new(
        input_features: Vec<String>,
        created_features: Vec<String>,
        removed_features: Vec<String>,
    ) -> Self {
        Self {
            input_features,
            created_features,
            removed_features,
        }
    }

    /// Derive the record from the column lists seen before and after a transform.
    pub fn between<S: AsRef<str>>(input: &[S], output: &[S]) -> Self {
        let input: Vec<String> = input.iter().map(|s| s.as_ref().to_string()).collect();
        let output: Vec<String> = output.iter().map(|s| s.as_ref().to_string()).collect();

        let before: HashSet<&str> = input.iter().map(String::as_str).collect();
        let after: HashSet<&str> = output.iter().map(String::as_str).collect();

        let created = output
            .iter()
            .filter(|name| !before.contains(name.as_str()))
            .cloned()
            .collect();
        let removed = input
            .iter()
            .filter(|name| !after.contains(name.as_str()))
            .cloned()
            .collect();

        Self::new(input, created, removed)
    }

    /// Columns the transform produced, in output order.
    pub fn output_features(&self) -> Vec<String> {
        let removed: HashSet<&str> = self.removed_features.iter().map(String::as_str).collect();
        self.input_features
            .iter()
            .filter(|name| !removed.contains(name.as_str()))
            .chain(self.created_features.iter())
            .cloned()
            .collect()
    }

    /// Check the internal consistency of the record.
    ///
    /// Created columns must be new, removed columns must come from the input,
    /// and no column may be both created and removed.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let input: HashSet<&str> = self.input_features.iter().map(String::as_str).collect();
        let removed: HashSet<&str> = self.removed_features.iter().map(String::as_str).collect();

        if let Some(name) = self.created_features.iter().find(|n| removed.contains(n.as_str())) {
            return Err(format!("column '{}' is both created and removed", name));
        }
        if let Some(name) = self.created_features.iter().find(|n| input.contains(n.as_str())) {
            return Err(format!("created column '{}' already existed in the input", name));
        }
        if let Some(name) = self.removed_features.iter().find(|n| !input.contains(n.as_str())) {
            return Err(format!("removed column '{}' was not in the input", name));
        }
        Ok(())
    }

    /// Whether the record describes exactly the given output columns, in order.
    pub fn matches<S: AsRef<str>>(&self, output: &[S]) -> bool {
        let expected = self.output_features();
        expected.len() == output.len()
            && expected.iter().zip(output).all(|(a, b)| a == b.as_ref())
    }
}

// =============================================================================
// Learned State
// =============================================================================

/// Holder for state that only exists after a successful fit or transform.
///
/// Reading before the first [`set`](FittedState::set) fails with
/// [`StageError::NotFitted`] instead of returning an empty value.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedState<T> {
    value: Option<T>,
}

impl<T> Default for FittedState<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> FittedState<T> {
    /// Create an empty (unfitted) holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store freshly learned state, discarding whatever was learned before.
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Forget learned state.
    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Whether state has been learned.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Borrow the learned state if present.
    pub fn as_option(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Borrow the learned state, failing for the named stage when absent.
    pub fn get(&self, stage: &str) -> Result<&T> {
        self.value
            .as_ref()
            .ok_or_else(|| StageError::not_fitted(stage))
    }
}
