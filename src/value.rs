//! Dynamic values and declared value types.
//!
//! [`Value`] is what flows through the navigator, the parameter binder and the
//! transaction layer. [`ValueType`] is the declared type of a property, a
//! parameter or a result, and is what type handlers are registered against.

use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::binding::ParamMap;
use crate::error::{BindError, BindResult};
use crate::reflection::{Mappable, Reflect, TypeShape};

/// One result row as returned by a transaction, columns in select order.
pub type Row = IndexMap<String, Value>;

/// A dynamically typed value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value; also the null-object sentinel for navigation.
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Named bag built from the arguments of a multi-argument call.
    Params(ParamMap),
    /// An instance of a [`Mappable`] type.
    Object(Box<dyn Reflect>),
}

impl Value {
    /// Wrap a mappable instance.
    pub fn object<T: Mappable>(value: T) -> Self {
        Value::Object(Box::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the wrapped object, if this is one.
    pub fn as_object(&self) -> Option<&dyn Reflect> {
        match self {
            Value::Object(obj) => Some(&**obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut dyn Reflect> {
        match self {
            Value::Object(obj) => Some(&mut **obj),
            _ => None,
        }
    }

    /// Borrow the wrapped object as a concrete type.
    pub fn downcast_ref<T: Mappable>(&self) -> Option<&T> {
        self.as_object()
            .and_then(|obj| obj.as_any().downcast_ref::<T>())
    }

    /// Unwrap an object of type `T`.
    pub fn into_object<T: Mappable>(self) -> BindResult<T> {
        let label = self.type_label();
        match self {
            Value::Object(obj) => obj
                .into_any()
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| {
                    BindError::type_error(format!(
                        "expected '{}' but found '{}'",
                        ObjectType::of::<T>().name(),
                        label
                    ))
                }),
            other => Err(BindError::type_error(format!(
                "expected '{}' but found '{}'",
                ObjectType::of::<T>().name(),
                other.type_label()
            ))),
        }
    }

    /// Unwrap an optional object of type `T`; `Null` becomes `None`.
    pub fn into_optional_object<T: Mappable>(self) -> BindResult<Option<T>> {
        if self.is_null() {
            return Ok(None);
        }
        self.into_object().map(Some)
    }

    /// Unwrap a list of objects of type `T`.
    pub fn into_objects<T: Mappable>(self) -> BindResult<Vec<T>> {
        match self {
            Value::List(items) => items.into_iter().map(Value::into_object).collect(),
            other => Err(BindError::type_error(format!(
                "expected a list of '{}' but found '{}'",
                ObjectType::of::<T>().name(),
                other.type_label()
            ))),
        }
    }

    pub fn into_bytes(self) -> BindResult<Vec<u8>> {
        match self {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(mismatch("bytes", &other)),
        }
    }

    /// Short name of the runtime type, used in error messages and logs.
    pub fn type_label(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Object(obj) => (**obj).object_type().name().to_string(),
            other => ValueType::of_value(other).to_string(),
        }
    }

    /// Convert into a JSON value for display.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Long(n) => serde_json::Value::from(*n),
            Value::Double(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => {
                serde_json::Value::Array(bytes.iter().map(|b| serde_json::Value::from(*b)).collect())
            }
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Params(params) => serde_json::Value::Object(
                params.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Object(obj) => serde_json::Value::String(format!("{:?}", obj)),
        }
    }

    /// Build a value from JSON: integers become `Int` when they fit, otherwise `Long`.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i32::try_from(i).map(Value::Int).unwrap_or(Value::Long(i))
                } else {
                    Value::Double(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Params(a), Value::Params(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => (**a).reflect_eq(&**b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(bytes) => {
                write!(f, "\\x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Params(params) => write!(f, "{}", params),
            Value::Object(obj) => write!(f, "{:?}", obj),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<ParamMap> for Value {
    fn from(v: ParamMap) -> Self {
        Value::Params(v)
    }
}

impl<T: Mappable> From<T> for Value {
    fn from(v: T) -> Self {
        Value::object(v)
    }
}

/// Conversion out of a [`Value`], used by setters and typed mapper wrappers.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> BindResult<Self>;
}

fn mismatch(expected: &str, found: &Value) -> BindError {
    BindError::type_error(format!(
        "expected {} but found {} ({})",
        expected,
        found.type_label(),
        found
    ))
}

impl FromValue for Value {
    fn from_value(value: Value) -> BindResult<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> BindResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> BindResult<Self> {
        match value {
            Value::Int(n) => Ok(n),
            Value::Long(n) => i32::try_from(n)
                .map_err(|_| BindError::type_error(format!("{} does not fit into an int", n))),
            other => Err(mismatch("int", &other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> BindResult<Self> {
        match value {
            Value::Int(n) => Ok(n as i64),
            Value::Long(n) => Ok(n),
            other => Err(mismatch("long", &other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> BindResult<Self> {
        match value {
            Value::Double(n) => Ok(n),
            Value::Int(n) => Ok(n as f64),
            Value::Long(n) => Ok(n as f64),
            other => Err(mismatch("double", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> BindResult<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl<T: Mappable> FromValue for T {
    fn from_value(value: Value) -> BindResult<Self> {
        value.into_object()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> BindResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> BindResult<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

/// Identity of a [`Mappable`] type, usable as a declared type.
#[derive(Clone, Copy)]
pub struct ObjectType {
    id: TypeId,
    name: &'static str,
    shape: fn() -> TypeShape,
}

impl ObjectType {
    pub fn of<T: Mappable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
            shape: T::type_shape,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build the type's declared shape.
    pub fn shape(&self) -> TypeShape {
        (self.shape)()
    }

    /// True when `self` is `other` or declares it (transitively) as a supertype.
    pub fn is_subtype_of(&self, other: &ObjectType) -> bool {
        if self == other {
            return true;
        }
        self.shape()
            .supertypes()
            .iter()
            .any(|parent| parent.is_subtype_of(other))
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectType {}

impl Hash for ObjectType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectType({})", self.name)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Declared type of a property, parameter or result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// The universal object type.
    Any,
    Bool,
    Int,
    Long,
    Double,
    String,
    Bytes,
    List(Box<ValueType>),
    Map,
    /// The named-bag type of multi-argument calls.
    Params,
    Object(ObjectType),
}

impl ValueType {
    pub fn object<T: Mappable>() -> Self {
        ValueType::Object(ObjectType::of::<T>())
    }

    pub fn list(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    /// Runtime type of a value; `Null` maps to `Any`.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Any,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Bytes(_) => ValueType::Bytes,
            Value::List(_) => ValueType::list(ValueType::Any),
            Value::Map(_) => ValueType::Map,
            Value::Params(_) => ValueType::Params,
            Value::Object(obj) => ValueType::Object((**obj).object_type()),
        }
    }

    /// Element type of a list type; any other type is its own element type.
    pub fn element_type(&self) -> &ValueType {
        match self {
            ValueType::List(element) => element,
            other => other,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ValueType::List(_))
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            ValueType::Object(ty) => Some(ty),
            _ => None,
        }
    }

    /// True when a value of type `other` may be used where `self` is declared.
    pub fn is_assignable_from(&self, other: &ValueType) -> bool {
        match (self, other) {
            (a, b) if a == b => true,
            (ValueType::Any, _) => true,
            (ValueType::List(a), ValueType::List(b)) => a.is_assignable_from(b),
            (ValueType::Object(a), ValueType::Object(b)) => b.is_subtype_of(a),
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Any => write!(f, "Object"),
            ValueType::Bool => write!(f, "boolean"),
            ValueType::Int => write!(f, "int"),
            ValueType::Long => write!(f, "long"),
            ValueType::Double => write!(f, "double"),
            ValueType::String => write!(f, "String"),
            ValueType::Bytes => write!(f, "byte[]"),
            ValueType::List(element) => write!(f, "List<{}>", element),
            ValueType::Map => write!(f, "Map"),
            ValueType::Params => write!(f, "ParamMap"),
            ValueType::Object(ty) => write!(f, "{}", ty.name()),
        }
    }
}
