//! Concrete stages, models and raw objects used by the integration tests.

#![allow(dead_code)]

use lex_stages::utils::{column_names, compare_columns, require_columns};
use lex_stages::{
    FeatureLineage, Fit, FitTransform, FittedState, Labels, Model, NestedMut, ParamList, ParamMap,
    ParameterSource, Parameterized, Predict, Result, ShapeChanging, Stage, StageError, Table,
    Transform, parse_value, probe_capabilities, stage_shape,
};
use polars::prelude::*;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Datasets
// ============================================================================

pub fn passengers() -> DataFrame {
    df![
        "age" => [Some(22.0), None, Some(38.0), Some(26.0), None],
        "fare" => [Some(7.25), Some(71.3), None, Some(8.05), Some(53.1)],
        "port" => ["S", "C", "S", "Q", "S"],
    ]
    .unwrap()
}

pub fn survived() -> Series {
    Series::new("survived".into(), &["no", "yes", "yes", "no", "no"])
}

// ============================================================================
// Value-preserving stage: median imputation
// ============================================================================

/// Fills nulls in numeric columns with the median seen during fit.
pub struct MedianImputer {
    pub columns: Vec<String>,
    pub fallback: f64,
    medians: FittedState<Vec<(String, f64)>>,
    feature_names: FittedState<Vec<String>>,
}

impl MedianImputer {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            fallback: 0.0,
            medians: FittedState::new(),
            feature_names: FittedState::new(),
        }
    }
}

impl Parameterized for MedianImputer {
    fn params(&self) -> ParamList<'_> {
        ParamList::new()
            .value("columns", self.columns.clone())
            .value("fallback", self.fallback)
    }

    fn set_param(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "columns" => self.columns = parse_value(name, value)?,
            "fallback" => self.fallback = parse_value(name, value)?,
            _ => return Err(StageError::unknown_parameter(name)),
        }
        Ok(())
    }
}

impl Stage for MedianImputer {
    fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
        require_columns(self.name(), table, &self.columns)?;

        let mut medians = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let series = table
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            medians.push((name.clone(), series.median().unwrap_or(self.fallback)));
        }

        self.medians.set(medians);
        self.feature_names.set(column_names(table));
        Ok(())
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        let medians = self.medians.get(self.name())?;
        let expected = self.feature_names.get(self.name())?;
        compare_columns(expected, &column_names(table))
            .map_err(|reason| StageError::schema_mismatch(self.name(), reason))?;

        let mut out = table.clone();
        for (name, median) in medians {
            let series = out
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let median = *median;
            let filled = series.f64()?.apply(|v| v.or(Some(median))).into_series();
            out.replace(name, filled)?;
        }
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("Fill nulls in {:?} with the fitted median", self.columns)
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.feature_names.get(self.name()).cloned()
    }
}

stage_shape!(MedianImputer: ValuePreserving);

// ============================================================================
// Shape-changing stages: one-hot encoding and column dropping
// ============================================================================

/// Replaces a string column with one indicator column per fitted category.
pub struct OneHotEncoder {
    pub column: String,
    pub drop_original: bool,
    categories: FittedState<Vec<String>>,
    feature_names: FittedState<Vec<String>>,
    lineage: FittedState<FeatureLineage>,
}

impl OneHotEncoder {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            drop_original: true,
            categories: FittedState::new(),
            feature_names: FittedState::new(),
            lineage: FittedState::new(),
        }
    }

    fn indicator_names(&self, categories: &[String]) -> Vec<String> {
        categories
            .iter()
            .map(|c| format!("{}_{}", self.column, c))
            .collect()
    }

    fn output_names(&self, table: &Table, categories: &[String]) -> Vec<String> {
        column_names(table)
            .into_iter()
            .filter(|name| !(self.drop_original && *name == self.column))
            .chain(self.indicator_names(categories))
            .collect()
    }
}

impl Parameterized for OneHotEncoder {
    fn params(&self) -> ParamList<'_> {
        ParamList::new()
            .value("column", self.column.clone())
            .value("drop_original", self.drop_original)
    }

    fn set_param(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "column" => self.column = parse_value(name, value)?,
            "drop_original" => self.drop_original = parse_value(name, value)?,
            _ => return Err(StageError::unknown_parameter(name)),
        }
        Ok(())
    }
}

impl Stage for OneHotEncoder {
    fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
        require_columns(self.name(), table, &[self.column.as_str()])?;

        let series = table.column(&self.column)?.as_materialized_series();
        let categories: BTreeSet<String> = series
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        let categories: Vec<String> = categories.into_iter().collect();

        self.feature_names.set(self.output_names(table, &categories));
        self.categories.set(categories);
        self.lineage.clear();
        Ok(())
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        let categories = self.categories.get(self.name())?.clone();
        require_columns(self.name(), table, &[self.column.as_str()])?;

        let indicators = self.indicator_names(&categories);
        let existing = column_names(table);
        if let Some(clash) = indicators.iter().find(|n| existing.contains(n)) {
            return Err(StageError::schema_mismatch(
                self.name(),
                format!("indicator column '{}' already exists", clash),
            ));
        }

        let values = table.column(&self.column)?.as_materialized_series().str()?;
        let mut out = if self.drop_original {
            table.drop(&self.column)?
        } else {
            table.clone()
        };
        for (category, name) in categories.iter().zip(&indicators) {
            let flags: Vec<f64> = values
                .into_iter()
                .map(|v| if v == Some(category.as_str()) { 1.0 } else { 0.0 })
                .collect();
            out.with_column(Column::new(name.as_str().into(), flags))?;
        }

        let output = column_names(&out);
        self.lineage.set(FeatureLineage::between(&existing, &output));
        self.feature_names.set(output);
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("One-hot encode '{}'", self.column)
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.feature_names.get(self.name()).cloned()
    }
}

stage_shape!(OneHotEncoder: ShapeChanging);

impl ShapeChanging for OneHotEncoder {
    fn lineage(&self) -> Option<&FeatureLineage> {
        self.lineage.as_option()
    }
}

/// Removes a fixed set of columns.
pub struct ColumnDropper {
    pub columns: Vec<String>,
    feature_names: FittedState<Vec<String>>,
    lineage: FittedState<FeatureLineage>,
}

impl ColumnDropper {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            feature_names: FittedState::new(),
            lineage: FittedState::new(),
        }
    }
}

impl Parameterized for ColumnDropper {
    fn params(&self) -> ParamList<'_> {
        ParamList::new().value("columns", self.columns.clone())
    }
}

impl Stage for ColumnDropper {
    fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
        require_columns(self.name(), table, &self.columns)?;
        let kept = column_names(table)
            .into_iter()
            .filter(|n| !self.columns.contains(n))
            .collect();
        self.feature_names.set(kept);
        self.lineage.clear();
        Ok(())
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        self.feature_names.get(self.name())?;
        require_columns(self.name(), table, &self.columns)?;

        let input = column_names(table);
        let out = table.drop_many(self.columns.iter().map(String::as_str));
        let output = column_names(&out);

        self.lineage.set(FeatureLineage::between(&input, &output));
        self.feature_names.set(output);
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("Drop columns {:?}", self.columns)
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.feature_names.get(self.name()).cloned()
    }
}

stage_shape!(ColumnDropper: ShapeChanging);

impl ShapeChanging for ColumnDropper {
    fn lineage(&self) -> Option<&FeatureLineage> {
        self.lineage.as_option()
    }
}

/// Shape-changing stage that records lineage for the wrong output.
pub struct LyingRenamer {
    feature_names: FittedState<Vec<String>>,
    lineage: FittedState<FeatureLineage>,
}

impl LyingRenamer {
    pub fn new() -> Self {
        Self {
            feature_names: FittedState::new(),
            lineage: FittedState::new(),
        }
    }
}

impl Parameterized for LyingRenamer {
    fn params(&self) -> ParamList<'_> {
        ParamList::new()
    }
}

impl Stage for LyingRenamer {
    fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
        self.feature_names.set(column_names(table));
        Ok(())
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        let input = column_names(table);
        let mut out = table.clone();
        out.rename(&input[0], "renamed".into())?;

        // Claims nothing changed.
        self.lineage.set(FeatureLineage::between(&input, &input));
        self.feature_names.set(column_names(&out));
        Ok(out)
    }

    fn describe(&self) -> String {
        "Rename the first column".to_string()
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.feature_names.get(self.name()).cloned()
    }
}

stage_shape!(LyingRenamer: ShapeChanging);

impl ShapeChanging for LyingRenamer {
    fn lineage(&self) -> Option<&FeatureLineage> {
        self.lineage.as_option()
    }
}

/// Declared value-preserving but renames its first column.
pub struct RenamingPreserver {
    feature_names: FittedState<Vec<String>>,
}

impl RenamingPreserver {
    pub fn new() -> Self {
        Self {
            feature_names: FittedState::new(),
        }
    }
}

impl Parameterized for RenamingPreserver {
    fn params(&self) -> ParamList<'_> {
        ParamList::new()
    }
}

impl Stage for RenamingPreserver {
    fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
        self.feature_names.set(column_names(table));
        Ok(())
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        let input = column_names(table);
        let mut out = table.clone();
        out.rename(&input[0], "renamed".into())?;

        // Reports what it produced, so only the identity rule is broken.
        self.feature_names.set(column_names(&out));
        Ok(out)
    }

    fn describe(&self) -> String {
        "Rename the first column".to_string()
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.feature_names.get(self.name()).cloned()
    }
}

stage_shape!(RenamingPreserver: ValuePreserving);

/// Appends a row index column but keeps reporting its fit-time columns.
pub struct StaleNames {
    feature_names: FittedState<Vec<String>>,
}

impl StaleNames {
    pub fn new() -> Self {
        Self {
            feature_names: FittedState::new(),
        }
    }
}

impl Parameterized for StaleNames {
    fn params(&self) -> ParamList<'_> {
        ParamList::new()
    }
}

impl Stage for StaleNames {
    fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
        self.feature_names.set(column_names(table));
        Ok(())
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        self.feature_names.get(self.name())?;
        let index: Vec<u32> = (0..table.height() as u32).collect();
        let mut out = table.clone();
        out.with_column(Column::new("row".into(), index))?;
        Ok(out)
    }

    fn describe(&self) -> String {
        "Append a row index".to_string()
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.feature_names.get(self.name()).cloned()
    }
}

stage_shape!(StaleNames: Unspecified);

// ============================================================================
// Scalar stages used to build compositions
// ============================================================================

/// Adds `alpha` to every Float64 column.
pub struct Shift {
    pub alpha: f64,
    feature_names: FittedState<Vec<String>>,
}

impl Shift {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            feature_names: FittedState::new(),
        }
    }
}

impl Parameterized for Shift {
    fn params(&self) -> ParamList<'_> {
        ParamList::new().value("alpha", self.alpha)
    }

    fn set_param(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "alpha" => self.alpha = parse_value(name, value)?,
            _ => return Err(StageError::unknown_parameter(name)),
        }
        Ok(())
    }
}

impl Stage for Shift {
    fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
        self.feature_names.set(column_names(table));
        Ok(())
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        self.feature_names.get(self.name())?;
        let mut out = table.clone();
        for name in column_names(table) {
            let series = out.column(&name)?.as_materialized_series().clone();
            if series.dtype() == &DataType::Float64 {
                let alpha = self.alpha;
                let shifted = series.f64()?.apply(|v| v.map(|x| x + alpha)).into_series();
                out.replace(&name, shifted)?;
            }
        }
        self.feature_names.set(column_names(&out));
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("Add {} to numeric columns", self.alpha)
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.feature_names.get(self.name()).cloned()
    }
}

stage_shape!(Shift: ValuePreserving);

/// Multiplies every Float64 column by `beta`.
pub struct Scale {
    pub beta: i64,
    feature_names: FittedState<Vec<String>>,
}

impl Scale {
    pub fn new(beta: i64) -> Self {
        Self {
            beta,
            feature_names: FittedState::new(),
        }
    }
}

impl Parameterized for Scale {
    fn params(&self) -> ParamList<'_> {
        ParamList::new().value("beta", self.beta)
    }

    fn set_param(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "beta" => self.beta = parse_value(name, value)?,
            _ => return Err(StageError::unknown_parameter(name)),
        }
        Ok(())
    }
}

impl Stage for Scale {
    fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
        self.feature_names.set(column_names(table));
        Ok(())
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        self.feature_names.get(self.name())?;
        let mut out = table.clone();
        for name in column_names(table) {
            let series = out.column(&name)?.as_materialized_series().clone();
            if series.dtype() == &DataType::Float64 {
                let beta = self.beta as f64;
                let scaled = series.f64()?.apply(|v| v.map(|x| x * beta)).into_series();
                out.replace(&name, scaled)?;
            }
        }
        self.feature_names.set(column_names(&out));
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("Multiply numeric columns by {}", self.beta)
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.feature_names.get(self.name()).cloned()
    }
}

stage_shape!(Scale: ValuePreserving);

/// Runs named child stages in order, feeding each output to the next.
pub struct Chain {
    steps: Vec<(String, Box<dyn Stage>)>,
}

impl Chain {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn step(mut self, name: impl Into<String>, stage: impl Stage + 'static) -> Self {
        self.steps.push((name.into(), Box::new(stage)));
        self
    }
}

impl Parameterized for Chain {
    fn params(&self) -> ParamList<'_> {
        self.steps
            .iter()
            .fold(ParamList::new(), |list, (name, stage)| {
                list.stage(name.clone(), stage.as_ref())
            })
    }

    fn nested_mut(&mut self, name: &str) -> Option<NestedMut<'_>> {
        self.steps
            .iter_mut()
            .find(|(step, _)| step == name)
            .map(|(_, stage)| NestedMut::Stage(stage.as_mut()))
    }
}

impl Stage for Chain {
    fn fit(&mut self, table: &Table, labels: Option<&Labels>) -> Result<()> {
        let mut current = table.clone();
        for (_, stage) in &mut self.steps {
            current = stage.fit_transform(&current, labels)?;
        }
        Ok(())
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        let mut current = table.clone();
        for (_, stage) in &mut self.steps {
            current = stage.transform(&current)?;
        }
        Ok(current)
    }

    fn describe(&self) -> String {
        let names: Vec<&str> = self.steps.iter().map(|(n, _)| n.as_str()).collect();
        format!("Chain of [{}]", names.join(" -> "))
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        match self.steps.last() {
            Some((_, stage)) => stage.feature_names_out(),
            None => Err(StageError::not_fitted(self.name())),
        }
    }
}

stage_shape!(Chain: Unspecified);

// ============================================================================
// Models
// ============================================================================

/// Predicts the most frequent label; probabilities use additive smoothing.
pub struct MajorityClassifier {
    pub smoothing: f64,
    counts: FittedState<BTreeMap<String, usize>>,
}

impl MajorityClassifier {
    pub fn new(smoothing: f64) -> Self {
        Self {
            smoothing,
            counts: FittedState::new(),
        }
    }
}

impl Parameterized for MajorityClassifier {
    fn params(&self) -> ParamList<'_> {
        ParamList::new().value("smoothing", self.smoothing)
    }

    fn set_param(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "smoothing" => self.smoothing = parse_value(name, value)?,
            _ => return Err(StageError::unknown_parameter(name)),
        }
        Ok(())
    }
}

impl Model for MajorityClassifier {
    fn fit(&mut self, features: &Table, labels: &Labels) -> Result<()> {
        if labels.len() != features.height() {
            return Err(StageError::schema_mismatch(
                self.name(),
                format!("{} labels for {} rows", labels.len(), features.height()),
            ));
        }
        let mut counts = BTreeMap::new();
        for label in labels.str()?.into_iter().flatten() {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        self.counts.set(counts);
        Ok(())
    }

    fn predict(&self, features: &Table) -> Result<Labels> {
        let counts = self.counts.get(self.name())?;
        let majority = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(label, _)| label.clone())
            .ok_or_else(|| StageError::failed(self.name(), "no labels seen during fit"))?;
        Ok(Series::new(
            "prediction".into(),
            vec![majority; features.height()],
        ))
    }

    fn predict_proba(&self, features: &Table) -> Result<Table> {
        let counts = self.counts.get(self.name())?;
        let total: usize = counts.values().sum();
        let denominator = total as f64 + self.smoothing * counts.len() as f64;

        let columns: Vec<Column> = counts
            .iter()
            .map(|(label, count)| {
                let p = (*count as f64 + self.smoothing) / denominator;
                Column::new(label.as_str().into(), vec![p; features.height()])
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    fn describe(&self) -> String {
        "Predict the most frequent class".to_string()
    }
}

/// Predicts the label mean plus `offset`; has no probability estimates.
pub struct MeanRegressor {
    pub offset: f64,
    mean: FittedState<f64>,
}

impl MeanRegressor {
    pub fn new() -> Self {
        Self {
            offset: 0.0,
            mean: FittedState::new(),
        }
    }
}

impl Parameterized for MeanRegressor {
    fn params(&self) -> ParamList<'_> {
        ParamList::new().value("offset", self.offset)
    }
}

impl Model for MeanRegressor {
    fn fit(&mut self, _features: &Table, labels: &Labels) -> Result<()> {
        let mean = labels
            .mean()
            .ok_or_else(|| StageError::failed(self.name(), "labels have no numeric values"))?;
        self.mean.set(mean);
        Ok(())
    }

    fn predict(&self, features: &Table) -> Result<Labels> {
        let mean = *self.mean.get(self.name())? + self.offset;
        Ok(Series::new("prediction".into(), vec![mean; features.height()]))
    }
}

/// A stage that owns a model, registered under the field `model`.
pub struct ModelStage {
    pub passthrough: bool,
    model: Box<dyn Model>,
    feature_names: FittedState<Vec<String>>,
}

impl ModelStage {
    pub fn new(model: impl Model + 'static) -> Self {
        Self {
            passthrough: true,
            model: Box::new(model),
            feature_names: FittedState::new(),
        }
    }
}

impl Parameterized for ModelStage {
    fn params(&self) -> ParamList<'_> {
        ParamList::new()
            .value("passthrough", self.passthrough)
            .model("model", self.model.as_ref())
    }

    fn nested_mut(&mut self, name: &str) -> Option<NestedMut<'_>> {
        (name == "model").then(|| NestedMut::Model(self.model.as_mut()))
    }
}

impl Stage for ModelStage {
    fn fit(&mut self, table: &Table, labels: Option<&Labels>) -> Result<()> {
        let labels = labels.ok_or_else(|| StageError::failed(self.name(), "labels required"))?;
        self.model.fit(table, labels)?;
        self.feature_names.set(column_names(table));
        Ok(())
    }

    fn transform(&mut self, table: &Table) -> Result<Table> {
        self.feature_names.get(self.name())?;
        Ok(table.clone())
    }

    fn describe(&self) -> String {
        format!("Stage around {}", self.model.describe())
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.feature_names.get(self.name()).cloned()
    }
}

stage_shape!(ModelStage: Unspecified);

// ============================================================================
// Raw objects for the universal adapter
// ============================================================================

/// Centers every Float64 column; exposes fit, transform and parameters.
#[derive(Default)]
pub struct RawCenterer {
    pub with_mean: bool,
    pub scale: f64,
    means: Vec<(String, f64)>,
    fitted_columns: Option<Vec<String>>,
}

impl RawCenterer {
    pub fn new() -> Self {
        Self {
            with_mean: true,
            scale: 1.0,
            ..Self::default()
        }
    }
}

impl Fit for RawCenterer {
    fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
        self.means.clear();
        for name in column_names(table) {
            let series = table.column(&name)?.as_materialized_series();
            if series.dtype() == &DataType::Float64 {
                self.means.push((name, series.mean().unwrap_or(0.0)));
            }
        }
        self.fitted_columns = Some(column_names(table));
        Ok(())
    }
}

impl Transform for RawCenterer {
    fn transform(&mut self, table: &Table) -> Result<Table> {
        if self.fitted_columns.is_none() {
            return Err(StageError::not_fitted("RawCenterer"));
        }
        let mut out = table.clone();
        for (name, mean) in &self.means {
            let shift = if self.with_mean { *mean } else { 0.0 };
            let scale = self.scale;
            let series = out.column(name)?.as_materialized_series().clone();
            let centered = series
                .f64()?
                .apply(|v| v.map(|x| (x - shift) * scale))
                .into_series();
            out.replace(name, centered)?;
        }
        Ok(out)
    }

    fn feature_names_out(&self) -> Option<Vec<String>> {
        self.fitted_columns.clone()
    }
}

impl ParameterSource for RawCenterer {
    fn get_params(&self, deep: bool) -> Result<ParamMap<'_>> {
        lex_stages::params::flatten(
            ParamList::new()
                .value("with_mean", self.with_mean)
                .value("scale", self.scale),
            deep,
        )
    }

    fn set_param(&mut self, path: &str, value: Value) -> Result<()> {
        match path {
            "with_mean" => self.with_mean = parse_value(path, value)?,
            "scale" => self.scale = parse_value(path, value)?,
            _ => return Err(StageError::unknown_parameter(path)),
        }
        Ok(())
    }
}

probe_capabilities!(RawCenterer: Fit, Transform, Params);

/// Transform-only object that returns its input and never reports columns.
pub struct RawIdentity;

impl Transform for RawIdentity {
    fn transform(&mut self, table: &Table) -> Result<Table> {
        Ok(table.clone())
    }
}

probe_capabilities!(RawIdentity: Transform);

/// Must see the whole table at fit time; counts how it was fitted.
#[derive(Default)]
pub struct RawEmbedder {
    pub fit_transform_calls: Arc<AtomicUsize>,
    pub plain_fit_calls: Arc<AtomicUsize>,
    rows_seen: usize,
}

impl Fit for RawEmbedder {
    fn fit(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<()> {
        self.plain_fit_calls.fetch_add(1, Ordering::SeqCst);
        self.rows_seen = table.height();
        Ok(())
    }
}

impl FitTransform for RawEmbedder {
    fn fit_transform(&mut self, table: &Table, _labels: Option<&Labels>) -> Result<Table> {
        self.fit_transform_calls.fetch_add(1, Ordering::SeqCst);
        self.rows_seen = table.height();
        Ok(table.clone())
    }
}

probe_capabilities!(RawEmbedder: Fit, FitTransform);

/// Predict-only object with parameters; no transform, no probabilities.
pub struct RawVoter {
    pub threshold: f64,
}

impl Predict for RawVoter {
    fn predict(&self, table: &Table) -> Result<Labels> {
        Ok(Series::new("vote".into(), vec![self.threshold > 0.5; table.height()]))
    }
}

impl ParameterSource for RawVoter {
    fn get_params(&self, _deep: bool) -> Result<ParamMap<'_>> {
        let mut map = ParamMap::new();
        map.insert_unique("threshold", serde_json::json!(self.threshold).into())?;
        Ok(map)
    }
}

probe_capabilities!(RawVoter: Predict, Params);

/// Exposes nothing at all.
pub struct RawInert;

impl lex_stages::Probe for RawInert {}

/// Reports a parameter whose name breaks the path rules.
pub struct RawBadNames;

impl ParameterSource for RawBadNames {
    fn get_params(&self, _deep: bool) -> Result<ParamMap<'_>> {
        let mut map = ParamMap::new();
        map.insert_unique("_hidden", serde_json::json!(1).into())?;
        Ok(map)
    }
}

probe_capabilities!(RawBadNames: Params);
