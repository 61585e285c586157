//! The stage contract and its shape specializations.

use super::__private::{ChangesShape, PreservesValues, Sealed};
use crate::error::{Result, StageError};
use crate::params::Parameterized;
use crate::types::{FeatureLineage, Labels, Table};
use serde::{Deserialize, Serialize};

/// Which shape rule a stage promises to uphold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShapeContract {
    /// No promise beyond `feature_names_out` (e.g. adapted third-party objects).
    #[default]
    Unspecified,
    /// Output columns always equal input columns, same order; only values change.
    ValuePreserving,
    /// Output columns may differ; every transform records a [`FeatureLineage`].
    ShapeChanging,
}

/// Runtime view of the shape marker a stage implements.
///
/// Implemented only through [`stage_shape!`](crate::stage_shape), which also
/// implements the matching marker trait, so the accessors always agree with
/// the markers.
pub trait ShapeRule: Sealed {
    /// `Some` exactly when the stage implements [`ValuePreserving`].
    fn as_value_preserving(&self) -> Option<&dyn ValuePreserving> {
        None
    }

    /// `Some` exactly when the stage implements [`ShapeChanging`].
    fn as_shape_changing(&self) -> Option<&dyn ShapeChanging> {
        None
    }

    /// The shape rule this stage upholds.
    fn shape_contract(&self) -> ShapeContract {
        if self.as_shape_changing().is_some() {
            ShapeContract::ShapeChanging
        } else if self.as_value_preserving().is_some() {
            ShapeContract::ValuePreserving
        } else {
            ShapeContract::Unspecified
        }
    }
}

/// A unit that learns from a table and transforms tables.
///
/// Stages never mutate their input: `transform` returns a new table or fails
/// without returning one. Every stage declares its shape rule with
/// [`stage_shape!`](crate::stage_shape).
///
/// # Example
///
/// ```rust,ignore
/// let mut imputer = MedianImputer::new(["age", "fare"]);
/// let cleaned = imputer.fit_transform(&df, None)?;
/// assert_eq!(imputer.feature_names_out()?, column_names(&cleaned));
/// ```
pub trait Stage: Parameterized + ShapeRule + Send + Sync {
    /// Learn internal state from `table`, discarding anything learned before.
    ///
    /// Must leave `feature_names_out` describing what `transform` will produce.
    fn fit(&mut self, table: &Table, labels: Option<&Labels>) -> Result<()>;

    /// Apply the learned transformation.
    ///
    /// Fails with [`StageError::NotFitted`] before the first successful fit and
    /// with [`StageError::SchemaMismatch`] when `table` lacks what was learned.
    fn transform(&mut self, table: &Table) -> Result<Table>;

    /// Fit then transform the same table.
    ///
    /// Overrides must return exactly what `fit` followed by `transform` would.
    fn fit_transform(&mut self, table: &Table, labels: Option<&Labels>) -> Result<Table> {
        self.fit(table, labels)?;
        self.transform(table)
    }

    /// Human-readable summary of what the stage does. Must not require fitting.
    fn describe(&self) -> String;

    /// Column names `transform` produces for the fitted state.
    fn feature_names_out(&self) -> Result<Vec<String>>;

    /// Fit an owned stage and hand it back, for builder-style chaining.
    fn fitted(mut self, table: &Table, labels: Option<&Labels>) -> Result<Self>
    where
        Self: Sized,
    {
        self.fit(table, labels)?;
        Ok(self)
    }
}

/// Marker for stages whose output columns always equal their input columns.
pub trait ValuePreserving: Stage + PreservesValues {}

/// Stages that may add, remove or rename columns.
///
/// Every successful `transform` must store a [`FeatureLineage`] whose
/// [`output_features`](FeatureLineage::output_features) equals the returned
/// table's columns.
pub trait ShapeChanging: Stage + ChangesShape {
    /// Lineage of the most recent successful transform.
    fn lineage(&self) -> Option<&FeatureLineage>;

    /// Lineage of the most recent transform, or `NotFitted` if none ran.
    fn require_lineage(&self) -> Result<&FeatureLineage> {
        self.lineage()
            .ok_or_else(|| StageError::not_fitted(self.name()))
    }

    /// Columns that entered the most recent transform.
    fn original_features(&self) -> Result<Vec<String>> {
        Ok(self.require_lineage()?.input_features.clone())
    }

    /// Columns the most recent transform created.
    fn new_features(&self) -> Result<Vec<String>> {
        Ok(self.require_lineage()?.created_features.clone())
    }

    /// Columns the most recent transform removed.
    fn removed_features(&self) -> Result<Vec<String>> {
        Ok(self.require_lineage()?.removed_features.clone())
    }
}

/// Declare the shape rule of a stage type.
///
/// - `ValuePreserving` implements the [`ValuePreserving`] marker.
/// - `ShapeChanging` permits a hand-written [`ShapeChanging`] impl (the
///   `lineage` accessor) and exposes it to conformance checks.
/// - `Unspecified` makes no shape promise.
///
/// ```rust,ignore
/// stage_shape!(MedianImputer: ValuePreserving);
///
/// stage_shape!(OneHotEncoder: ShapeChanging);
/// impl ShapeChanging for OneHotEncoder {
///     fn lineage(&self) -> Option<&FeatureLineage> { self.lineage.as_option() }
/// }
/// ```
#[macro_export]
macro_rules! stage_shape {
    ($ty:ty : ValuePreserving) => {
        impl $crate::contract::__private::Sealed for $ty {}
        impl $crate::contract::__private::PreservesValues for $ty {}
        impl $crate::contract::ValuePreserving for $ty {}
        impl $crate::contract::ShapeRule for $ty {
            fn as_value_preserving(&self) -> Option<&dyn $crate::contract::ValuePreserving> {
                Some(self)
            }
        }
    };
    ($ty:ty : ShapeChanging) => {
        impl $crate::contract::__private::Sealed for $ty {}
        impl $crate::contract::__private::ChangesShape for $ty {}
        impl $crate::contract::ShapeRule for $ty {
            fn as_shape_changing(&self) -> Option<&dyn $crate::contract::ShapeChanging> {
                Some(self)
            }
        }
    };
    ($ty:ty : Unspecified) => {
        impl $crate::contract::__private::Sealed for $ty {}
        impl $crate::contract::ShapeRule for $ty {}
    };
}
