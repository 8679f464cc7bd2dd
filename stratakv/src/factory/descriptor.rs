use crate::common::{CHAIN_SEPARATOR, WRAP_PARAMETER};
use crate::errors::{ErrorKind, StrataError, StrataResult};
use std::collections::BTreeMap;

/// A single configuration parameter value.
///
/// URL query parsing produces `Str` for `key=value` pairs and `Bool(true)`
/// for bare flags; programmatic callers can pass either.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    Str(String),
    Bool(bool),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(value) => Some(value),
            ParamValue::Bool(_) => None,
        }
    }

    /// Boolean view: `Bool` values directly, `Str` values via the usual
    /// textual spellings.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(value) => Some(*value),
            ParamValue::Str(value) => match value.as_str() {
                "true" | "True" | "1" => Some(true),
                "false" | "False" | "0" => Some(false),
                _ => None,
            },
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Named parameters for a backend constructor.
///
/// A thin ordered map of parameter name to [`ParamValue`]. The factory
/// removes the parameters it owns (the decorator chain, the universal
/// `create_if_missing` flag is inserted, not removed) and hands the rest to
/// the backend constructor, which validates what it understands and ignores
/// the remainder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreParams {
    values: BTreeMap<String, ParamValue>,
}

impl StoreParams {
    pub fn new() -> Self {
        StoreParams { values: BTreeMap::new() }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style insertion for test and call-site ergonomics.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(ParamValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(ParamValue::as_bool)
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }
}

/// One entry of a decorator chain: a registered identifier plus its
/// optional argument.
///
/// Textual grammar: `name` or `name(arg)`, e.g. `readonly` or
/// `prefix(ns/)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorSpec {
    pub name: String,
    pub arg: Option<String>,
}

impl DecoratorSpec {
    pub fn new(name: impl Into<String>, arg: Option<String>) -> Self {
        DecoratorSpec { name: name.into(), arg }
    }

    /// Parses a single chain entry.
    pub fn parse(spec: &str) -> StrataResult<DecoratorSpec> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(StrataError::new(
                "Empty decorator name in chain",
                ErrorKind::ConfigurationError,
            ));
        }

        match spec.split_once('(') {
            None => Ok(DecoratorSpec::new(spec, None)),
            Some((name, rest)) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(StrataError::new(
                        &format!("Decorator entry '{}' has no name", spec),
                        ErrorKind::ConfigurationError,
                    ));
                }
                match rest.strip_suffix(')') {
                    Some(arg) => Ok(DecoratorSpec::new(name, Some(arg.to_string()))),
                    None => Err(StrataError::new(
                        &format!("Decorator entry '{}' is missing ')'", spec),
                        ErrorKind::ConfigurationError,
                    )),
                }
            }
        }
    }
}

/// Normalized store configuration, consumed once by the factory.
///
/// `decorators` is stored in fold order: the first entry becomes the
/// innermost wrapper and the last the outermost, so the outermost decorator
/// is the one whose behavior the caller observes first. Both textual chain
/// forms are written outermost-first and are reversed during
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDescriptor {
    pub store_type: String,
    pub params: StoreParams,
    pub decorators: Vec<DecoratorSpec>,
}

impl StoreDescriptor {
    /// Normalizes the two chain spellings into one descriptor.
    ///
    /// 1. Legacy combined form: a `store_type` of `deco+...+type` splits
    ///    into the trailing real type and the leading decorators (written
    ///    outermost-first).
    /// 2. Modern form: the reserved `wrap` parameter, same separator, same
    ///    written order.
    /// 3. Both forms non-empty is a `ConfigurationConflict`; neither form
    ///    is silently preferred.
    pub fn normalize(store_type: &str, mut params: StoreParams) -> StrataResult<StoreDescriptor> {
        let mut parts: Vec<&str> = store_type.split(CHAIN_SEPARATOR).collect();
        let real_type = parts.pop().unwrap_or("").trim();
        if real_type.is_empty() {
            return Err(StrataError::new(
                &format!("Store type missing in '{}'", store_type),
                ErrorKind::ConfigurationError,
            ));
        }
        let legacy: Vec<&str> = parts;

        let modern: Vec<String> = match params.remove(WRAP_PARAMETER) {
            None => Vec::new(),
            Some(ParamValue::Str(chain)) => {
                if chain.is_empty() {
                    Vec::new()
                } else {
                    chain
                        .split(CHAIN_SEPARATOR)
                        .map(|entry| entry.to_string())
                        .collect()
                }
            }
            Some(ParamValue::Bool(_)) => {
                return Err(StrataError::new(
                    "The 'wrap' parameter requires a decorator chain value",
                    ErrorKind::ConfigurationError,
                ));
            }
        };

        if !legacy.is_empty() && !modern.is_empty() {
            return Err(StrataError::new(
                "Decorators given both embedded in the store type and via 'wrap'; use only 'wrap'",
                ErrorKind::ConfigurationConflict,
            ));
        }

        let written: Vec<String> = if modern.is_empty() {
            legacy.iter().map(|entry| entry.to_string()).collect()
        } else {
            modern
        };

        // written order is outermost-first; fold order is innermost-first
        let mut decorators = Vec::with_capacity(written.len());
        for entry in written.iter().rev() {
            decorators.push(DecoratorSpec::parse(entry)?);
        }

        Ok(StoreDescriptor {
            store_type: real_type.to_string(),
            params,
            decorators,
        })
    }
}
