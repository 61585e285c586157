//! Runtime checks that a stage honours its shape contract.
//!
//! Pipeline layers call [`checked_transform`] instead of `transform` when they
//! want contract breaches surfaced as [`StageError::ContractViolation`] rather
//! than propagated downstream as silently wrong tables.

use super::{ShapeContract, ShapeRule, Stage};
use crate::config::ContractConfig;
use crate::error::{Result, StageError};
use crate::types::{Labels, Table};
use crate::utils::{column_names, compare_columns};
use tracing::{debug, warn};

/// Run `transform` and verify the output against the stage's contract.
pub fn checked_transform<S>(stage: &mut S, table: &Table, config: &ContractConfig) -> Result<Table>
where
    S: Stage + ?Sized,
{
    let input = column_names(table);
    let output = stage.transform(table)?;
    verify_output(&*stage, &input, &output, config)?;
    Ok(output)
}

/// Run `fit_transform` and verify the output against the stage's contract.
pub fn checked_fit_transform<S>(
    stage: &mut S,
    table: &Table,
    labels: Option<&Labels>,
    config: &ContractConfig,
) -> Result<Table>
where
    S: Stage + ?Sized,
{
    let input = column_names(table);
    let output = stage.fit_transform(table, labels)?;
    verify_output(&*stage, &input, &output, config)?;
    Ok(output)
}

/// Verify one completed transform given the columns it received.
pub fn verify_output<S>(
    stage: &S,
    input: &[String],
    output: &Table,
    config: &ContractConfig,
) -> Result<()>
where
    S: Stage + ?Sized,
{
    let produced = column_names(output);

    if config.verify_feature_names {
        match stage.feature_names_out() {
            Ok(declared) => {
                compare_columns(&declared, &produced)
                    .map_err(|reason| breach(stage, format!("feature_names_out: {}", reason)))?;
            }
            Err(e) if e.is_unsupported() => {
                debug!("'{}' does not declare feature names, skipping check", stage.name());
            }
            Err(e) => {
                return Err(breach(
                    stage,
                    format!("feature_names_out unavailable after transform: {}", e),
                ));
            }
        }
    }

    match stage.shape_contract() {
        ShapeContract::ValuePreserving => {
            compare_columns(input, &produced)
                .map_err(|reason| breach(stage, format!("value-preserving stage: {}", reason)))?;
        }
        ShapeContract::ShapeChanging if config.verify_lineage => {
            let lineage = stage
                .as_shape_changing()
                .and_then(|s| s.lineage())
                .ok_or_else(|| breach(stage, "no lineage recorded by transform"))?;

            lineage
                .validate()
                .map_err(|reason| breach(stage, format!("lineage: {}", reason)))?;
            compare_columns(&lineage.input_features, input)
                .map_err(|reason| breach(stage, format!("lineage input: {}", reason)))?;
            if !lineage.matches(&produced) {
                return Err(breach(
                    stage,
                    format!(
                        "lineage predicts {:?} but transform returned {:?}",
                        lineage.output_features(),
                        produced
                    ),
                ));
            }
        }
        _ => {}
    }

    Ok(())
}

fn breach<S: Stage + ?Sized>(stage: &S, reason: impl Into<String>) -> StageError {
    let reason = reason.into();
    warn!("Contract violation in '{}': {}", stage.name(), reason);
    StageError::violation(stage.name(), reason)
}
