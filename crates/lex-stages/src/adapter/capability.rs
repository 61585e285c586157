//! Capability interfaces for objects wrapped by [`UniversalAdapter`](super::UniversalAdapter).
//!
//! Each capability is an independent trait. An object states which of them it
//! implements through [`Probe`], usually generated with [`probe_capabilities!`].
//!
//! [`probe_capabilities!`]: crate::probe_capabilities

use crate::error::{Result, StageError};
use crate::params::ParamMap;
use crate::types::{Labels, Table};
use crate::utils::short_type_name;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Learn from a table.
pub trait Fit {
    fn fit(&mut self, table: &Table, labels: Option<&Labels>) -> Result<()>;
}

/// Learn from a table and transform it in one pass.
///
/// Objects that must see the full data during fit before any transform
/// expose this; the adapter prefers it over [`Fit`].
pub trait FitTransform {
    fn fit_transform(&mut self, table: &Table, labels: Option<&Labels>) -> Result<Table>;
}

/// Transform a table.
pub trait Transform {
    fn transform(&mut self, table: &Table) -> Result<Table>;

    /// Columns `transform` produces, when the object knows them.
    ///
    /// `None` means the object does not report its output columns, not that it
    /// is unfitted. An adapter over such an object answers
    /// `feature_names_out` with [`StageError::UnsupportedOperation`] and
    /// conformance checks skip the feature-name comparison. Objects that know
    /// their output columns after fitting override this.
    fn feature_names_out(&self) -> Option<Vec<String>> {
        None
    }
}

/// Predict one value per row.
pub trait Predict {
    fn predict(&self, table: &Table) -> Result<Labels>;
}

/// Predict class probabilities.
pub trait PredictProba {
    fn predict_proba(&self, table: &Table) -> Result<Table>;
}

/// Report and update hyperparameters.
pub trait ParameterSource {
    /// Flat path-keyed hyperparameters of the object.
    fn get_params(&self, deep: bool) -> Result<ParamMap<'_>>;

    /// Assign the hyperparameter at `path`.
    fn set_param(&mut self, path: &str, _value: Value) -> Result<()> {
        Err(StageError::unknown_parameter(path))
    }
}

/// Capability discovery for an opaque object.
///
/// Every accessor defaults to `None`; an object overrides the ones it supports.
pub trait Probe: Send + Sync {
    /// Short label used in errors and logs.
    fn type_label(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn as_fit(&mut self) -> Option<&mut dyn Fit> {
        None
    }

    fn as_fit_transform(&mut self) -> Option<&mut dyn FitTransform> {
        None
    }

    fn as_transform(&self) -> Option<&dyn Transform> {
        None
    }

    fn as_transform_mut(&mut self) -> Option<&mut dyn Transform> {
        None
    }

    fn as_predict(&self) -> Option<&dyn Predict> {
        None
    }

    fn as_predict_proba(&self) -> Option<&dyn PredictProba> {
        None
    }

    fn as_parameter_source(&self) -> Option<&dyn ParameterSource> {
        None
    }

    fn as_parameter_source_mut(&mut self) -> Option<&mut dyn ParameterSource> {
        None
    }
}

/// One probed capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Capability {
    Fit,
    FitTransform,
    Transform,
    Predict,
    PredictProba,
    Params,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Fit,
        Capability::FitTransform,
        Capability::Transform,
        Capability::Predict,
        Capability::PredictProba,
        Capability::Params,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Fit => "fit",
            Capability::FitTransform => "fit_transform",
            Capability::Transform => "transform",
            Capability::Predict => "predict",
            Capability::PredictProba => "predict_proba",
            Capability::Params => "get_params",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of capabilities an object supports, fixed at probe time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities(u8);

impl Capabilities {
    pub fn empty() -> Self {
        Self(0)
    }

    /// Probe every accessor of `object` once.
    pub fn probe(object: &mut dyn Probe) -> Self {
        let mut caps = Self::empty();
        if object.as_fit().is_some() {
            caps.insert(Capability::Fit);
        }
        if object.as_fit_transform().is_some() {
            caps.insert(Capability::FitTransform);
        }
        if object.as_transform().is_some() {
            caps.insert(Capability::Transform);
        }
        if object.as_predict().is_some() {
            caps.insert(Capability::Predict);
        }
        if object.as_predict_proba().is_some() {
            caps.insert(Capability::PredictProba);
        }
        if object.as_parameter_source().is_some() {
            caps.insert(Capability::Params);
        }
        caps
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Capability::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Implement [`Probe`] for a type from the capability traits it implements.
///
/// Capability names: `Fit`, `FitTransform`, `Transform`, `Predict`,
/// `PredictProba`, `Params` (for [`ParameterSource`]).
///
/// ```rust,ignore
/// struct Binner { /* ... */ }
/// impl Fit for Binner { /* ... */ }
/// impl Transform for Binner { /* ... */ }
///
/// probe_capabilities!(Binner: Fit, Transform);
/// ```
#[macro_export]
macro_rules! probe_capabilities {
    (@method Fit) => {
        fn as_fit(&mut self) -> Option<&mut dyn $crate::adapter::Fit> {
            Some(self)
        }
    };
    (@method FitTransform) => {
        fn as_fit_transform(&mut self) -> Option<&mut dyn $crate::adapter::FitTransform> {
            Some(self)
        }
    };
    (@method Transform) => {
        fn as_transform(&self) -> Option<&dyn $crate::adapter::Transform> {
            Some(self)
        }
        fn as_transform_mut(&mut self) -> Option<&mut dyn $crate::adapter::Transform> {
            Some(self)
        }
    };
    (@method Predict) => {
        fn as_predict(&self) -> Option<&dyn $crate::adapter::Predict> {
            Some(self)
        }
    };
    (@method PredictProba) => {
        fn as_predict_proba(&self) -> Option<&dyn $crate::adapter::PredictProba> {
            Some(self)
        }
    };
    (@method Params) => {
        fn as_parameter_source(&self) -> Option<&dyn $crate::adapter::ParameterSource> {
            Some(self)
        }
        fn as_parameter_source_mut(
            &mut self,
        ) -> Option<&mut dyn $crate::adapter::ParameterSource> {
            Some(self)
        }
    };
    ($ty:ty : $($capability:ident),* $(,)?) => {
        impl $crate::adapter::Probe for $ty {
            $( $crate::probe_capabilities!(@method $capability); )*
        }
    };
}
