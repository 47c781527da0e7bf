//! Named parameter bags and the resolver that builds them from call arguments.

use std::fmt;

use indexmap::IndexMap;

use crate::binding::MethodDecl;
use crate::error::{BindError, BindResult};
use crate::value::Value;

/// Prefix of the positional aliases added to every multi-argument bag.
pub const GENERIC_NAME_PREFIX: &str = "param";

/// Parameter bag passed to statements of multi-argument methods.
///
/// Unlike a plain map, reading a missing key is an error that lists the
/// available names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap {
    entries: IndexMap<String, Value>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> BindResult<&Value> {
        self.entries.get(key).ok_or_else(|| {
            let available: Vec<&str> = self.keys().collect();
            BindError::binding(format!(
                "Parameter '{}' not found. Available parameters are [{}]",
                key,
                available.join(", ")
            ))
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

impl fmt::Display for ParamMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = ParamMap::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Turns the argument list of one call into the statement parameter.
#[derive(Debug, Clone)]
pub struct ParamNameResolver {
    method: String,
    names: Vec<String>,
}

impl ParamNameResolver {
    /// Declared names, falling back to `arg<i>` for unnamed parameters.
    pub fn new(method: &MethodDecl) -> Self {
        let names = method
            .params()
            .iter()
            .enumerate()
            .map(|(i, param)| param.name.clone().unwrap_or_else(|| format!("arg{}", i)))
            .collect();
        Self {
            method: method.name().to_string(),
            names,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// No arguments give `Null` and a single argument is passed through.
    /// Several arguments become a [`ParamMap`] holding each declared name
    /// plus `param1..N`, where a declared name is never overwritten.
    pub fn named_params(&self, args: Vec<Value>) -> BindResult<Value> {
        if args.len() != self.names.len() {
            return Err(BindError::binding(format!(
                "Mapper method '{}' expects {} argument(s) but was called with {}",
                self.method,
                self.names.len(),
                args.len()
            )));
        }
        let mut args = args;
        match args.len() {
            0 => Ok(Value::Null),
            1 => Ok(args.pop().unwrap_or_default()),
            _ => {
                let mut params = ParamMap::new();
                for (i, (name, arg)) in self.names.iter().zip(args).enumerate() {
                    params.insert(name.as_str(), arg.clone());
                    let generic = format!("{}{}", GENERIC_NAME_PREFIX, i + 1);
                    if !self.names.contains(&generic) {
                        params.insert(generic, arg);
                    }
                }
                Ok(Value::Params(params))
            }
        }
    }
}
