//! The predictive model contract.

use crate::error::{Result, StageError};
use crate::params::Parameterized;
use crate::types::{Labels, Table};

/// A unit that learns a mapping from features to labels.
///
/// Models share the parameter introspection rules of stages but are not
/// stages themselves: they produce predictions, not tables.
pub trait Model: Parameterized + Send + Sync {
    /// Learn from `features` and row-aligned `labels`, discarding prior state.
    fn fit(&mut self, features: &Table, labels: &Labels) -> Result<()>;

    /// One prediction per row of `features`.
    fn predict(&self, features: &Table) -> Result<Labels>;

    /// Class probabilities, one `Float64` column per class.
    ///
    /// Models without probability estimates keep this default.
    fn predict_proba(&self, _features: &Table) -> Result<Table> {
        Err(StageError::unsupported(
            self.name(),
            "probability predictions",
        ))
    }

    /// Human-readable summary of the model.
    fn describe(&self) -> String {
        format!("{} model", self.name())
    }

    /// Fit an owned model and hand it back, for builder-style chaining.
    fn fitted(mut self, features: &Table, labels: &Labels) -> Result<Self>
    where
        Self: Sized,
    {
        self.fit(features, labels)?;
        Ok(self)
    }
}
