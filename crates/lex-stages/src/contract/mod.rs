//! Capability contracts for stages and models.
//!
//! This module provides:
//! - [`Stage`]: fit/transform/describe for table-to-table units
//! - [`ValuePreserving`] and [`ShapeChanging`]: the two shape specializations,
//!   declared with [`stage_shape!`](crate::stage_shape)
//! - [`Model`]: fit/predict for predictive units
//! - [`conformance`]: runtime verification of the shape rules

pub mod conformance;
mod model;
mod stage;

pub use model::Model;
pub use stage::{ShapeChanging, ShapeContract, ShapeRule, Stage, ValuePreserving};

/// Seals used by [`stage_shape!`](crate::stage_shape). Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub trait Sealed {}
    pub trait PreservesValues {}
    pub trait ChangesShape {}
}

static_assertions::assert_obj_safe!(Stage, Model, ShapeChanging, ValuePreserving, ShapeRule);
static_assertions::assert_impl_all!(crate::types::FeatureLineage: Send, Sync);
static_assertions::assert_impl_all!(crate::error::StageError: Send, Sync);
