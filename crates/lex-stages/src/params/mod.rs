//! Hyperparameter registration, introspection and write-back.
//!
//! Units declare their hyperparameters explicitly through [`Parameterized::params`];
//! learned state is never registered, so the split between hyperparameters and
//! internal state is decided at compile time by what each unit lists.
//!
//! ```rust,ignore
//! impl Parameterized for Composite {
//!     fn params(&self) -> ParamList<'_> {
//!         ParamList::new()
//!             .value("strict", self.strict)
//!             .stage("a", &*self.a)
//!             .stage("b", &*self.b)
//!     }
//! }
//!
//! let flat = composite.get_params(true)?;   // {"a__alpha": 0.1, "b__beta": 2, "strict": true}
//! composite.set_params("a__alpha", json!(0.5))?;
//! ```

mod introspect;

pub use introspect::{DELIMITER, flatten, join_path, split_path, validate_path, validate_segment};

use crate::adapter::Probe;
use crate::contract::{Model, Stage};
use crate::error::{Result, StageError};
use crate::utils::short_type_name;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

// =============================================================================
// Parameter Values
// =============================================================================

/// Value of one hyperparameter entry.
#[derive(Clone)]
pub enum ParamValue<'a> {
    /// A scalar (or JSON-shaped) hyperparameter.
    Value(Value),
    /// A nested stage, held by reference.
    Stage(&'a dyn Stage),
    /// A nested model, held by reference.
    Model(&'a dyn Model),
    /// An opaque object wrapped by an adapter.
    Object(&'a dyn Probe),
}

impl<'a> ParamValue<'a> {
    /// The scalar value, if this entry is not a nested unit.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this entry holds a nested unit rather than a scalar.
    pub fn is_nested(&self) -> bool {
        !matches!(self, Self::Value(_))
    }

    /// JSON rendering: scalars as-is, nested units as their description.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Stage(stage) => Value::String(stage.describe()),
            Self::Model(model) => Value::String(model.describe()),
            Self::Object(object) => Value::String(object.type_label().to_string()),
        }
    }
}

impl fmt::Debug for ParamValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "Value({})", v),
            Self::Stage(stage) => write!(f, "Stage({})", stage.name()),
            Self::Model(model) => write!(f, "Model({})", model.name()),
            Self::Object(object) => write!(f, "Object({})", object.type_label()),
        }
    }
}

/// Scalars compare by value, nested units by identity.
impl PartialEq for ParamValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Stage(a), Self::Stage(b)) => same_object(*a, *b),
            (Self::Model(a), Self::Model(b)) => same_object(*a, *b),
            (Self::Object(a), Self::Object(b)) => same_object(*a, *b),
            _ => false,
        }
    }
}

fn same_object<T: ?Sized>(a: &T, b: &T) -> bool {
    std::ptr::addr_eq(a, b)
}

impl From<Value> for ParamValue<'_> {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Ordered list of a unit's own hyperparameters.
#[derive(Debug, Default)]
pub struct ParamList<'a> {
    entries: Vec<(String, ParamValue<'a>)>,
}

impl<'a> ParamList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scalar hyperparameter.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, ParamValue::Value(value.into()));
        self
    }

    /// Register a nested stage.
    pub fn stage(mut self, name: impl Into<String>, stage: &'a dyn Stage) -> Self {
        self.push(name, ParamValue::Stage(stage));
        self
    }

    /// Register a nested model.
    pub fn model(mut self, name: impl Into<String>, model: &'a dyn Model) -> Self {
        self.push(name, ParamValue::Model(model));
        self
    }

    /// Register an opaque wrapped object.
    pub fn object(mut self, name: impl Into<String>, object: &'a dyn Probe) -> Self {
        self.push(name, ParamValue::Object(object));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: ParamValue<'a>) {
        self.entries.push((name.into(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for ParamList<'a> {
    type Item = (String, ParamValue<'a>);
    type IntoIter = std::vec::IntoIter<(String, ParamValue<'a>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// =============================================================================
// Flattened Map
// =============================================================================

/// Path-keyed hyperparameter map. Paths are unique by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap<'a> {
    entries: BTreeMap<String, ParamValue<'a>>,
}

impl<'a> ParamMap<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, failing if the path is already taken.
    pub fn insert_unique(&mut self, path: impl Into<String>, value: ParamValue<'a>) -> Result<()> {
        let path = path.into();
        if self.entries.contains_key(&path) {
            return Err(StageError::collision(
                path,
                "path is produced by more than one field",
            ));
        }
        self.entries.insert(path, value);
        Ok(())
    }

    /// Move every entry of `child` under `<prefix>__`.
    pub fn merge_prefixed(&mut self, prefix: &str, child: ParamMap<'a>) -> Result<()> {
        validate_segment(prefix)?;
        for (path, value) in child {
            validate_path(&path)?;
            self.insert_unique(join_path(&[prefix, path.as_str()]), value)?;
        }
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&ParamValue<'a>> {
        self.entries.get(path)
    }

    /// Scalar value at `path`, if present and not a nested unit.
    pub fn value(&self, path: &str) -> Option<&Value> {
        self.get(path).and_then(ParamValue::as_value)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue<'a>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flat JSON object of every entry (nested units rendered as descriptions).
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(path, value)| (path.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Rebuild the composition structure as nested JSON objects.
    ///
    /// `{"a__alpha": 0.1, "b__beta": 2}` becomes `{"a": {"alpha": 0.1}, "b": {"beta": 2}}`.
    /// A path that is both a leaf and a prefix of another path is a collision.
    pub fn to_nested_json(&self) -> Result<Value> {
        let mut root = Map::new();

        for (path, value) in &self.entries {
            let segments = split_path(path);
            let Some((last, parents)) = segments.split_last() else {
                continue;
            };

            let mut node = &mut root;
            for segment in parents {
                let entry = node
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                node = match entry {
                    Value::Object(children) => children,
                    _ => {
                        return Err(StageError::collision(
                            path.clone(),
                            format!("'{}' is both a parameter and a namespace", segment),
                        ));
                    }
                };
            }

            if node.contains_key(*last) {
                return Err(StageError::collision(
                    path.clone(),
                    "parameter is also used as a namespace",
                ));
            }
            node.insert(last.to_string(), value.to_json());
        }

        Ok(Value::Object(root))
    }
}

impl<'a> IntoIterator for ParamMap<'a> {
    type Item = (String, ParamValue<'a>);
    type IntoIter = std::collections::btree_map::IntoIter<String, ParamValue<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// =============================================================================
// Introspection Contract
// =============================================================================

/// Mutable handle to a nested unit, used to route parameter write-back.
pub enum NestedMut<'a> {
    Stage(&'a mut dyn Stage),
    Model(&'a mut dyn Model),
    Object(&'a mut dyn Probe),
}

impl NestedMut<'_> {
    /// Set the parameter at `path`, relative to the nested unit.
    pub fn set_params(self, path: &str, value: Value) -> Result<()> {
        match self {
            Self::Stage(stage) => stage.set_params(path, value),
            Self::Model(model) => model.set_params(path, value),
            Self::Object(object) => {
                let label = object.type_label().to_string();
                match object.as_parameter_source_mut() {
                    Some(source) => source.set_param(path, value),
                    None => Err(StageError::unsupported(label, "parameter write-back")),
                }
            }
        }
    }
}

/// Hyperparameter introspection shared by stages, models and adapters.
pub trait Parameterized {
    /// Short name used in errors and logs.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// The unit's own declared hyperparameters, nested units included as references.
    fn params(&self) -> ParamList<'_>;

    /// Flattened hyperparameters.
    ///
    /// See [`flatten`] for the `deep` rules. Fails with
    /// [`StageError::ParameterNamespaceCollision`] instead of overwriting.
    fn get_params(&self, deep: bool) -> Result<ParamMap<'_>> {
        flatten(self.params(), deep)
    }

    /// Assign one of the unit's own scalar hyperparameters.
    fn set_param(&mut self, name: &str, _value: Value) -> Result<()> {
        Err(StageError::unknown_parameter(name))
    }

    /// Mutable access to the nested unit registered under `name`.
    fn nested_mut(&mut self, _name: &str) -> Option<NestedMut<'_>> {
        None
    }

    /// Assign the hyperparameter addressed by a full path.
    fn set_params(&mut self, path: &str, value: Value) -> Result<()> {
        match path.split_once(DELIMITER) {
            None => self.set_param(path, value),
            Some((head, rest)) => match self.nested_mut(head) {
                Some(nested) => nested
                    .set_params(rest, value)
                    .map_err(|e| qualify_path(e, head)),
                None => Err(StageError::unknown_parameter(path)),
            },
        }
    }
}

/// Prefix the path carried by a write-back error with the enclosing field.
fn qualify_path(error: StageError, head: &str) -> StageError {
    match error {
        StageError::UnknownParameter { path } => {
            StageError::unknown_parameter(join_path(&[head, path.as_str()]))
        }
        StageError::InvalidParameterValue { path, reason } => {
            StageError::invalid_value(join_path(&[head, path.as_str()]), reason)
        }
        other => other,
    }
}

/// Apply a flat map of path → value updates, in path order.
///
/// Stops at the first failing path; updates applied before it stay applied.
pub fn apply_params<P, I>(target: &mut P, updates: I) -> Result<()>
where
    P: Parameterized + ?Sized,
    I: IntoIterator<Item = (String, Value)>,
{
    let mut updates: Vec<(String, Value)> = updates.into_iter().collect();
    updates.sort_by(|a, b| a.0.cmp(&b.0));

    for (path, value) in updates {
        debug!("Setting parameter '{}' = {}", path, value);
        target.set_params(&path, value)?;
    }
    Ok(())
}

/// Deserialize a write-back value into a field's type.
pub fn parse_value<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| StageError::invalid_value(path, e.to_string()))
}
