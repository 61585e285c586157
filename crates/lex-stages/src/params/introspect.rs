//! Namespaced flattening of nested hyperparameters.
//!
//! Every stage, model and adapter reports its own hyperparameters as a
//! [`ParamList`]. Flattening turns that list into a [`ParamMap`] keyed by
//! delimiter-joined paths, expanding nested units when `deep` is requested.

use super::{ParamList, ParamMap, ParamValue};
use crate::error::{Result, StageError};
use tracing::debug;

/// Reserved delimiter joining path segments.
pub const DELIMITER: &str = "__";

/// Check that a single field name can be used as a path segment.
///
/// A segment must be non-empty, must not contain the delimiter, and must not
/// start or end with `_` (that would let two different paths join into the
/// same string, and leading underscores mark internal state).
pub fn validate_segment(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "segment is empty"
    } else if name.contains(DELIMITER) {
        "segment contains the reserved delimiter '__'"
    } else if name.starts_with('_') || name.ends_with('_') {
        "segment starts or ends with '_'"
    } else {
        return Ok(());
    };
    Err(StageError::collision(name, reason))
}

/// Check every segment of a full path.
pub fn validate_path(path: &str) -> Result<()> {
    for segment in split_path(path) {
        validate_segment(segment).map_err(|_| {
            StageError::collision(path, format!("invalid segment '{}'", segment))
        })?;
    }
    Ok(())
}

/// Split a path into its segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(DELIMITER).collect()
}

/// Join segments into a path.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Flatten a unit's own parameters into a path-keyed map.
///
/// With `deep == false` nested units are kept as single entries holding the
/// unit itself. With `deep == true` each nested unit is replaced by its own
/// deep parameters, re-keyed under `<field>__`. A nested unit without
/// hyperparameters contributes no entries.
pub fn flatten<'a>(params: ParamList<'a>, deep: bool) -> Result<ParamMap<'a>> {
    let mut map = ParamMap::new();

    for (name, value) in params {
        validate_segment(&name)?;

        match value {
            ParamValue::Stage(stage) if deep => {
                map.merge_prefixed(&name, stage.get_params(true)?)?;
            }
            ParamValue::Model(model) if deep => {
                map.merge_prefixed(&name, model.get_params(true)?)?;
            }
            ParamValue::Object(object) if deep => match object.as_parameter_source() {
                Some(source) => map.merge_prefixed(&name, source.get_params(true)?)?,
                None => debug!(
                    "Field '{}' holds {} which exposes no parameters",
                    name,
                    object.type_label()
                ),
            },
            other => map.insert_unique(name, other)?,
        }
    }

    Ok(map)
}
