//! Universal adapter for objects that only implement some capabilities.
//!
//! [`UniversalAdapter`] wraps any [`Probe`] implementor and exposes it as both a
//! [`Stage`] and a [`Model`]. Capabilities are probed once at construction and
//! every call dispatches on that fixed set.
//!
//! ```rust,ignore
//! use lex_stages::{UniversalAdapter, probe_capabilities};
//!
//! probe_capabilities!(ThirdPartyScaler: Fit, Transform, Params);
//!
//! let mut adapter = UniversalAdapter::new(ThirdPartyScaler::default());
//! let scaled = adapter.fit(&df, None)?.transform(&df)?;
//! let params = adapter.get_params(true)?;   // {"obj__with_mean": true, ...}
//! ```

mod capability;

pub use capability::{
    Capabilities, Capability, Fit, FitTransform, ParameterSource, Predict, PredictProba, Probe,
    Transform,
};

use crate::config::ContractConfig;
use crate::contract::{Model, Stage};
use crate::error::{Result, StageError};
use crate::params::{NestedMut, ParamList, ParamMap, ParamValue, Parameterized};
use crate::types::{Labels, Table};
use std::fmt;
use tracing::debug;

/// Adapter exposing an arbitrary [`Probe`] object through the stage and model contracts.
///
/// The adapter owns the wrapped object and nothing else that changes: its
/// capability set, label and parameter prefix are fixed at construction.
pub struct UniversalAdapter {
    inner: Box<dyn Probe>,
    capabilities: Capabilities,
    label: String,
    prefix: String,
}

// Adapters are stored in pipelines that may move across threads.
static_assertions::assert_impl_all!(UniversalAdapter: Send, Sync);

impl UniversalAdapter {
    /// Wrap `object`, re-exporting its parameters under the default `obj` prefix.
    pub fn new(object: impl Probe + 'static) -> Self {
        Self::from_boxed(Box::new(object))
    }

    /// Wrap an already boxed object.
    pub fn from_boxed(inner: Box<dyn Probe>) -> Self {
        Self::build(inner, ContractConfig::default().adapter_prefix)
    }

    /// Wrap `object` using the prefix from `config`.
    pub fn with_config(object: impl Probe + 'static, config: &ContractConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(Box::new(object), config.adapter_prefix.clone()))
    }

    fn build(mut inner: Box<dyn Probe>, prefix: String) -> Self {
        let capabilities = Capabilities::probe(inner.as_mut());
        let label = inner.type_label().to_string();
        debug!("Wrapped '{}' with capabilities {}", label, capabilities);

        Self {
            inner,
            capabilities,
            label,
            prefix,
        }
    }

    /// Capabilities found when the object was wrapped.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Path segment wrapped parameters are re-exported under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn inner(&self) -> &dyn Probe {
        self.inner.as_ref()
    }

    pub fn into_inner(self) -> Box<dyn Probe> {
        self.inner
    }

    /// Fit the wrapped object and return the adapter.
    ///
    /// Prefers a combined fit-and-transform (its output is discarded), then a
    /// plain fit. Objects with neither are treated as stateless.
    pub fn fit(&mut self, table: &Table, labels: Option<&Labels>) -> Result<&mut Self> {
        self.fit_wrapped(table, labels)?;
        Ok(self)
    }

    /// Delegate to the wrapped transform, or return the input unchanged.
    pub fn transform(&mut self, table: &Table) -> Result<Table> {
        self.transform_wrapped(table)
    }

    /// Delegate to the wrapped predict.
    pub fn predict(&self, table: &Table) -> Result<Labels> {
        self.predict_wrapped(table)
    }

    /// Delegate to the wrapped predict_proba.
    pub fn predict_proba(&self, table: &Table) -> Result<Table> {
        self.predict_proba_wrapped(table)
    }

    /// Wrapped parameters under `<prefix>__`, or the object itself when `deep` is false.
    pub fn get_params(&self, deep: bool) -> Result<ParamMap<'_>> {
        self.params_wrapped(deep)
    }

    pub fn describe(&self) -> String {
        format!("Adapter over {} {}", self.label, self.capabilities)
    }

    fn fit_wrapped(&mut self, table: &Table, labels: Option<&Labels>) -> Result<()> {
        if self.capabilities.contains(Capability::FitTransform) {
            debug!("'{}': fitting through fit_transform", self.label);
            let target = self
                .inner
                .as_fit_transform()
                .ok_or_else(|| lost(&self.label, Capability::FitTransform))?;
            let discarded = target.fit_transform(table, labels)?;
            debug!(
                "'{}': discarded fit_transform output ({} columns)",
                self.label,
                discarded.width()
            );
        } else if self.capabilities.contains(Capability::Fit) {
            debug!("'{}': fitting through fit", self.label);
            let target = self
                .inner
                .as_fit()
                .ok_or_else(|| lost(&self.label, Capability::Fit))?;
            target.fit(table, labels)?;
        } else {
            debug!("'{}' has no fit capability, nothing to learn", self.label);
        }
        Ok(())
    }

    fn transform_wrapped(&mut self, table: &Table) -> Result<Table> {
        if !self.capabilities.contains(Capability::Transform) {
            return Ok(table.clone());
        }
        let target = self
            .inner
            .as_transform_mut()
            .ok_or_else(|| lost(&self.label, Capability::Transform))?;
        target.transform(table)
    }

    fn predict_wrapped(&self, table: &Table) -> Result<Labels> {
        self.require(Capability::Predict)?;
        let target = self
            .inner
            .as_predict()
            .ok_or_else(|| lost(&self.label, Capability::Predict))?;
        target.predict(table)
    }

    fn predict_proba_wrapped(&self, table: &Table) -> Result<Table> {
        self.require(Capability::PredictProba)?;
        let target = self
            .inner
            .as_predict_proba()
            .ok_or_else(|| lost(&self.label, Capability::PredictProba))?;
        target.predict_proba(table)
    }

    fn params_wrapped(&self, deep: bool) -> Result<ParamMap<'_>> {
        let mut map = ParamMap::new();
        if !deep {
            map.insert_unique(self.prefix.clone(), ParamValue::Object(self.inner.as_ref()))?;
            return Ok(map);
        }
        if self.capabilities.contains(Capability::Params) {
            let source = self
                .inner
                .as_parameter_source()
                .ok_or_else(|| lost(&self.label, Capability::Params))?;
            map.merge_prefixed(&self.prefix, source.get_params(true)?)?;
        }
        Ok(map)
    }

    fn require(&self, capability: Capability) -> Result<()> {
        if self.capabilities.contains(capability) {
            Ok(())
        } else {
            Err(StageError::unsupported(&self.label, capability.as_str()))
        }
    }
}

/// A capability reported at probe time is no longer returned by the object.
fn lost(label: &str, capability: Capability) -> StageError {
    StageError::violation(
        label,
        format!("capability '{}' disappeared after probing", capability),
    )
}

impl fmt::Debug for UniversalAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniversalAdapter")
            .field("inner", &self.label)
            .field("capabilities", &self.capabilities)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl Parameterized for UniversalAdapter {
    fn name(&self) -> &str {
        &self.label
    }

    fn params(&self) -> ParamList<'_> {
        ParamList::new().object(self.prefix.clone(), self.inner.as_ref())
    }

    fn get_params(&self, deep: bool) -> Result<ParamMap<'_>> {
        self.params_wrapped(deep)
    }

    fn nested_mut(&mut self, name: &str) -> Option<NestedMut<'_>> {
        if name == self.prefix {
            Some(NestedMut::Object(self.inner.as_mut()))
        } else {
            None
        }
    }
}

impl Stage for UniversalAdapter {
    fn fit(&mut self, table: &Table, labels: Option<&Labels>) -> Result<()> {
        self.fit_wrapped(table, labels)
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        self.transform_wrapped(table)
    }

    fn describe(&self) -> String {
        UniversalAdapter::describe(self)
    }

    /// Known only when the wrapped object reports its own output columns.
    ///
    /// Fails with [`StageError::UnsupportedOperation`] when the object has no
    /// transform or its [`Transform::feature_names_out`] returns `None`.
    fn feature_names_out(&self) -> Result<Vec<String>> {
        if !self.capabilities.contains(Capability::Transform) {
            return Err(StageError::unsupported(&self.label, "feature_names_out"));
        }
        self.inner
            .as_transform()
            .ok_or_else(|| lost(&self.label, Capability::Transform))?
            .feature_names_out()
            .ok_or_else(|| StageError::unsupported(&self.label, "feature_names_out"))
    }
}

crate::stage_shape!(UniversalAdapter: Unspecified);

impl Model for UniversalAdapter {
    fn fit(&mut self, features: &Table, labels: &Labels) -> Result<()> {
        self.fit_wrapped(features, Some(labels))
    }

    fn predict(&self, features: &Table) -> Result<Labels> {
        self.predict_wrapped(features)
    }

    fn predict_proba(&self, features: &Table) -> Result<Table> {
        self.predict_proba_wrapped(features)
    }

    fn describe(&self) -> String {
        UniversalAdapter::describe(self)
    }
}
