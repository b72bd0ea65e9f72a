//! Parameter values and the node-side parameter store.
//!
//! [`Value`] is the dynamically typed payload both backends store. The
//! [`ParamValue`] trait converts between it and plain Rust types so that the
//! uniform `get_parameter(name, &mut out)` surface can be generic.

use crate::error::{Error, Result};
use std::{
    collections::BTreeMap,
    fmt::Display,
    path::Path,
};
use yaml_rust2::{Yaml, YamlLoader};

/// Represents a parameter value of various types.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Boolean value.
    Bool(bool),

    /// 64-bit signed integer value.
    I64(i64),

    /// 64-bit floating point value.
    F64(f64),

    /// String value.
    String(String),

    /// Array of boolean values.
    VecBool(Vec<bool>),

    /// Array of 64-bit signed integer values.
    VecI64(Vec<i64>),

    /// Array of 8-bit unsigned integer values (byte array).
    VecU8(Vec<u8>),

    /// Array of 64-bit floating point values.
    VecF64(Vec<f64>),

    /// Array of string values.
    VecString(Vec<String>),
}

impl Value {
    /// Checks if this value has the same type as another value.
    pub fn type_check(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Returns the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::I64(_) => "I64",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::VecBool(_) => "VecBool",
            Value::VecI64(_) => "VecI64",
            Value::VecU8(_) => "VecU8",
            Value::VecF64(_) => "VecF64",
            Value::VecString(_) => "VecString",
        }
    }

    /// Parse the right-hand side of a `name:=value` assignment.
    ///
    /// The text is read as a YAML scalar or flow sequence, like both ROS
    /// command lines do: `true` is a bool, `3` an integer, `[1.0, 2.0]` a
    /// float array. Anything that is not valid YAML is kept as a string.
    pub fn parse(text: &str) -> Value {
        match YamlLoader::load_from_str(text) {
            Ok(docs) => docs
                .first()
                .and_then(Value::from_yaml)
                .unwrap_or_else(|| Value::String(text.to_string())),
            Err(_) => Value::String(text.to_string()),
        }
    }

    /// Convert a YAML node. Maps and mixed arrays have no representation.
    pub fn from_yaml(yaml: &Yaml) -> Option<Value> {
        match yaml {
            Yaml::Boolean(b) => Some(Value::Bool(*b)),
            Yaml::Integer(i) => Some(Value::I64(*i)),
            Yaml::Real(_) => yaml.as_f64().map(Value::F64),
            Yaml::String(s) => Some(Value::String(s.clone())),
            Yaml::Array(arr) => match arr.first() {
                None => Some(Value::VecString(Vec::new())),
                Some(Yaml::Boolean(_)) => arr
                    .iter()
                    .map(Yaml::as_bool)
                    .collect::<Option<Vec<_>>>()
                    .map(Value::VecBool),
                Some(Yaml::Integer(_)) => arr
                    .iter()
                    .map(Yaml::as_i64)
                    .collect::<Option<Vec<_>>>()
                    .map(Value::VecI64),
                Some(Yaml::Real(_)) => arr
                    .iter()
                    .map(|v| v.as_f64().or_else(|| v.as_i64().map(|i| i as f64)))
                    .collect::<Option<Vec<_>>>()
                    .map(Value::VecF64),
                Some(Yaml::String(_)) => arr
                    .iter()
                    .map(|v| v.as_str().map(String::from))
                    .collect::<Option<Vec<_>>>()
                    .map(Value::VecString),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::VecBool(v) => write!(f, "{:?}", v),
            Value::VecI64(v) => write!(f, "{:?}", v),
            Value::VecU8(v) => write!(f, "{:?}", v),
            Value::VecF64(v) => write!(f, "{:?}", v),
            Value::VecString(v) => write!(f, "{:?}", v),
        }
    }
}

/// Conversion between Rust types and [`Value`].
///
/// Reading is lenient in one direction only: integers widen to floats.
pub trait ParamValue: Sized {
    /// Wrap `self` in a [`Value`].
    fn into_value(self) -> Value;

    /// Extract `Self`, or `None` when the stored type is incompatible.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! param_value {
    ($ty:ty, $variant:ident) => {
        impl ParamValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

param_value!(bool, Bool);
param_value!(i64, I64);
param_value!(String, String);
param_value!(Vec<bool>, VecBool);
param_value!(Vec<i64>, VecI64);
param_value!(Vec<u8>, VecU8);
param_value!(Vec<String>, VecString);

impl ParamValue for f64 {
    fn into_value(self) -> Value {
        Value::F64(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::F64(v) => Some(*v),
            Value::I64(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl ParamValue for f32 {
    fn into_value(self) -> Value {
        Value::F64(self as f64)
    }

    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl ParamValue for i32 {
    fn into_value(self) -> Value {
        Value::I64(self as i64)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::I64(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl ParamValue for Vec<f64> {
    fn into_value(self) -> Value {
        Value::VecF64(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::VecF64(v) => Some(v.clone()),
            Value::VecI64(v) => Some(v.iter().map(|i| *i as f64).collect()),
            _ => None,
        }
    }
}

impl ParamValue for Value {
    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

// Write-only: a borrowed string cannot be read back out of the store.
impl ParamValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }

    fn from_value(_value: &Value) -> Option<Self> {
        None
    }
}

/// Parameter storage.
///
/// Parameters are undeclared until first set and dynamically typed: a set
/// replaces the value whatever its previous type.
///
/// # Example
///
/// ```
/// use roscompat_core::parameter::{Parameters, Value};
///
/// let mut params = Parameters::new();
/// params.set("threshold".into(), Value::F64(0.5));
/// params.set("threshold".into(), Value::String("high".into()));
/// assert_eq!(params.get("threshold"), Some(&Value::String("high".into())));
/// ```
#[derive(Debug, Default)]
pub struct Parameters {
    params: BTreeMap<String, Value>,
}

impl Parameters {
    pub const fn new() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Set `name`, declaring it if needed. Returns the previous value.
    pub fn set(&mut self, name: String, value: Value) -> Option<Value> {
        if let Some(previous) = self.params.get(&name)
            && !previous.type_check(&value)
        {
            tracing::debug!(
                name = %name,
                from = previous.type_name(),
                to = value.type_name(),
                "parameter type changed"
            );
        }
        self.params.insert(name, value)
    }

    /// Remove `name`. Returns the removed value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.params.remove(name)
    }

    /// Parameter names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }
}

/// Load the `ros__parameters` that apply to `node_fqn` from a YAML file.
///
/// Matching sections are `/**`, the node base name and its fully qualified
/// name. Later sections override earlier ones. Nested maps are flattened
/// with `.` separators.
///
/// ```yaml
/// /**:
///   ros__parameters:
///     use_sim_time: false
/// detectnet:
///   ros__parameters:
///     threshold: 0.5
///     model:
///       name: ssd-mobilenet-v2
/// ```
pub fn load_params_file(path: &Path, node_fqn: &str) -> Result<Vec<(String, Value)>> {
    let text = std::fs::read_to_string(path)?;
    let docs = YamlLoader::load_from_str(&text).map_err(|e| Error::ParamFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let base_name = node_fqn.rsplit('/').next().unwrap_or(node_fqn);
    let mut result = Vec::new();

    for doc in docs {
        let Yaml::Hash(sections) = doc else {
            tracing::warn!(path = %path.display(), "unexpected YAML document, skipped");
            continue;
        };
        for (key, section) in sections {
            let Yaml::String(key) = key else { continue };
            if key != "/**" && key != base_name && key != node_fqn {
                continue;
            }
            let Some(params @ Yaml::Hash(_)) = section
                .as_hash()
                .and_then(|h| h.get(&Yaml::String("ros__parameters".into())))
            else {
                return Err(Error::ParamFile {
                    path: path.to_path_buf(),
                    reason: format!("section '{key}' has no ros__parameters"),
                });
            };
            flatten(path, "", params, &mut result)?;
        }
    }

    Ok(result)
}

fn flatten(path: &Path, prefix: &str, yaml: &Yaml, out: &mut Vec<(String, Value)>) -> Result<()> {
    let Yaml::Hash(map) = yaml else {
        return Ok(());
    };
    for (key, value) in map {
        let Some(key) = key.as_str() else { continue };
        let name = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };
        if let Yaml::Hash(_) = value {
            flatten(path, &name, value, out)?;
        } else {
            let value = Value::from_yaml(value).ok_or_else(|| Error::ParamFile {
                path: path.to_path_buf(),
                reason: format!("unsupported value for '{name}'"),
            })?;
            out.push((name, value));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(Value::parse("true"), Value::Bool(true));
        assert_eq!(Value::parse("42"), Value::I64(42));
        assert_eq!(Value::parse("0.5"), Value::F64(0.5));
        assert_eq!(Value::parse("hello"), Value::String("hello".into()));
        assert_eq!(Value::parse("[1, 2]"), Value::VecI64(vec![1, 2]));
        assert_eq!(Value::parse("[1.5, 2]"), Value::VecF64(vec![1.5, 2.0]));
        assert_eq!(
            Value::parse("[a, b]"),
            Value::VecString(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_param_value_conversion() {
        assert_eq!(f64::from_value(&Value::I64(3)), Some(3.0));
        assert_eq!(i64::from_value(&Value::F64(3.0)), None);
        assert_eq!(i32::from_value(&Value::I64(i64::MAX)), None);
        assert_eq!(
            String::from_value(&"model".into_value()),
            Some("model".to_string())
        );
        assert_eq!(Vec::<f64>::from_value(&Value::VecI64(vec![1])), Some(vec![1.0]));
    }

    #[test]
    fn test_set_replaces_any_type() {
        let mut params = Parameters::new();
        assert_eq!(params.set("rate".into(), Value::I64(10)), None);
        assert_eq!(
            params.set("rate".into(), Value::String("fast".into())),
            Some(Value::I64(10))
        );
        assert_eq!(params.get("rate"), Some(&Value::String("fast".into())));
        assert!(params.contains("rate"));

        params.set("model".into(), Value::String("ssd".into()));
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["model", "rate"]);

        assert!(params.remove("rate").is_some());
        assert!(params.get("rate").is_none());
        assert!(params.remove("rate").is_none());
    }

    #[test]
    fn test_load_params_file() {
        let dir = std::env::temp_dir().join(format!("roscompat-params-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("params.yaml");
        std::fs::write(
            &path,
            "/**:\n  ros__parameters:\n    use_sim_time: false\n\
             detectnet:\n  ros__parameters:\n    threshold: 0.5\n    model:\n      name: ssd\n\
             other:\n  ros__parameters:\n    ignored: 1\n",
        )
        .unwrap();

        let params = load_params_file(&path, "/detectnet").unwrap();
        assert!(params.contains(&("use_sim_time".into(), Value::Bool(false))));
        assert!(params.contains(&("threshold".into(), Value::F64(0.5))));
        assert!(params.contains(&("model.name".into(), Value::String("ssd".into()))));
        assert!(!params.iter().any(|(name, _)| name == "ignored"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
