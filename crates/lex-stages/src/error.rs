//! Custom error types for the stage contract layer.
//!
//! This module provides a single error hierarchy using `thiserror` for every
//! contract operation: fitting, transforming, predicting and parameter
//! introspection.
//!
//! Errors are serializable so they can be sent to a frontend for display.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for stage and model contracts.
#[derive(Error, Debug)]
pub enum StageError {
    /// An operation that needs learned state ran before a successful fit/transform.
    #[error("Stage '{stage}' is not fitted yet")]
    NotFitted { stage: String },

    /// Input columns are incompatible with what the stage expects or learned.
    #[error("Schema mismatch in stage '{stage}': {reason}")]
    SchemaMismatch { stage: String, reason: String },

    /// Two hyperparameter paths flatten to the same string, or a path segment
    /// cannot be addressed unambiguously.
    #[error("Parameter namespace collision at '{path}': {reason}")]
    ParameterNamespaceCollision { path: String, reason: String },

    /// A parameter path does not address any hyperparameter.
    #[error("Unknown parameter '{path}'")]
    UnknownParameter { path: String },

    /// A parameter value could not be applied to its field.
    #[error("Invalid value for parameter '{path}': {reason}")]
    InvalidParameterValue { path: String, reason: String },

    /// The unit does not support the requested capability.
    #[error("'{stage}' does not support {operation}")]
    UnsupportedOperation { stage: String, operation: String },

    /// A stage produced output that breaks its own shape contract.
    #[error("Stage '{stage}' violated its contract: {reason}")]
    ContractViolation { stage: String, reason: String },

    /// A concrete stage or model failed while doing its work.
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: String },

    /// Invalid contract configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigValidationError),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<StageError>,
    },
}

impl StageError {
    /// Shorthand for [`StageError::NotFitted`].
    pub fn not_fitted(stage: impl Into<String>) -> Self {
        Self::NotFitted {
            stage: stage.into(),
        }
    }

    /// Shorthand for [`StageError::SchemaMismatch`].
    pub fn schema_mismatch(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Schema mismatch listing the columns a stage expected but did not find.
    pub fn missing_columns<S: AsRef<str>>(stage: impl Into<String>, missing: &[S]) -> Self {
        let names: Vec<&str> = missing.iter().map(AsRef::as_ref).collect();
        Self::schema_mismatch(stage, format!("missing columns [{}]", names.join(", ")))
    }

    /// Shorthand for [`StageError::ParameterNamespaceCollision`].
    pub fn collision(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParameterNamespaceCollision {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`StageError::UnknownParameter`].
    pub fn unknown_parameter(path: impl Into<String>) -> Self {
        Self::UnknownParameter { path: path.into() }
    }

    /// Shorthand for [`StageError::InvalidParameterValue`].
    pub fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameterValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`StageError::UnsupportedOperation`].
    pub fn unsupported(stage: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            stage: stage.into(),
            operation: operation.into(),
        }
    }

    /// Shorthand for [`StageError::ContractViolation`].
    pub fn violation(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContractViolation {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`StageError::StageFailed`].
    pub fn failed(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        StageError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFitted { .. } => "NOT_FITTED",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::ParameterNamespaceCollision { .. } => "PARAMETER_NAMESPACE_COLLISION",
            Self::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            Self::InvalidParameterValue { .. } => "INVALID_PARAMETER_VALUE",
            Self::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            Self::ContractViolation { .. } => "CONTRACT_VIOLATION",
            Self::StageFailed { .. } => "STAGE_FAILED",
            Self::Config(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error means learned state was missing.
    pub fn is_not_fitted(&self) -> bool {
        match self {
            Self::NotFitted { .. } => true,
            Self::WithContext { source, .. } => source.is_not_fitted(),
            _ => false,
        }
    }

    /// Check if this error means a capability is missing.
    pub fn is_unsupported(&self) -> bool {
        match self {
            Self::UnsupportedOperation { .. } => true,
            Self::WithContext { source, .. } => source.is_unsupported(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for StageError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("StageError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for contract operations.
pub type Result<T> = std::result::Result<T, StageError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| StageError::Polars(e).with_context(context))
    }
}
