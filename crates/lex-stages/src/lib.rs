//! Stage and Model Contract Library
//!
//! A contract layer for composable tabular preprocessing stages and predictive
//! models, built on Polars.
//!
//! # Overview
//!
//! This library provides the uniform interface that preprocessing units
//! (scalers, imputers, encoders, feature generators) and models implement so a
//! pipeline layer can combine them:
//!
//! - **Stage Contract**: fit/transform/describe over [`polars`] tables
//! - **Shape Rules**: value-preserving stages keep their columns, shape-changing
//!   stages record a [`FeatureLineage`] on every transform; each stage declares
//!   its rule with [`stage_shape!`]
//! - **Model Contract**: fit/predict with optional probability predictions
//! - **Parameter Introspection**: nested hyperparameters flattened to
//!   `field__nested_field` paths, with collisions rejected instead of overwritten
//! - **Universal Adapter**: any object implementing a subset of the capability
//!   traits exposed through both contracts
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_stages::{Parameterized, ParamList, Stage, FittedState, Result, Table, Labels};
//! use lex_stages::utils::column_names;
//!
//! struct Clipper {
//!     upper: f64,
//!     feature_names: FittedState<Vec<String>>,
//! }
//!
//! impl Parameterized for Clipper {
//!     fn params(&self) -> ParamList<'_> {
//!         ParamList::new().value("upper", self.upper)
//!     }
//! }
//!
//! impl Stage for Clipper {
//!     fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
//!         self.feature_names.set(column_names(table));
//!         Ok(())
//!     }
//!     // transform, describe, feature_names_out ...
//! }
//!
//! lex_stages::stage_shape!(Clipper: ValuePreserving);
//!
//! let params = pipeline_stage.get_params(true)?;
//! println!("{}", params.to_json());
//! ```
//!
//! # Composition
//!
//! Stages nest other stages by registering them in [`Parameterized::params`].
//! A stage holding `a` (with `alpha = 0.1`) and `b` (with `beta = 2`) reports
//! `{"a__alpha": 0.1, "b__beta": 2}` from `get_params(true)` and accepts
//! `set_params("a__alpha", json!(0.5))` from a tuning layer.
//!
//! # Errors
//!
//! All operations return [`Result<T, StageError>`](StageError). Missing learned
//! state is [`StageError::NotFitted`], incompatible input columns are
//! [`StageError::SchemaMismatch`], duplicate parameter paths are
//! [`StageError::ParameterNamespaceCollision`] and missing capabilities are
//! [`StageError::UnsupportedOperation`].

pub mod adapter;
pub mod config;
pub mod contract;
pub mod error;
pub mod params;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use adapter::{
    Capabilities, Capability, Fit, FitTransform, ParameterSource, Predict, PredictProba, Probe,
    Transform, UniversalAdapter,
};
pub use config::{ConfigValidationError, ContractConfig, ContractConfigBuilder};
pub use contract::conformance::{checked_fit_transform, checked_transform};
pub use contract::{Model, ShapeChanging, ShapeContract, ShapeRule, Stage, ValuePreserving};
pub use error::{Result, ResultExt, StageError};
pub use params::{
    DELIMITER, NestedMut, ParamList, ParamMap, ParamValue, Parameterized, apply_params,
    parse_value,
};
pub use types::{FeatureLineage, FittedState, Labels, Table};
