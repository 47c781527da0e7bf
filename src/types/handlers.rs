//! Built-in type handlers.

use crate::error::{BindError, BindResult};
use crate::types::{SqlType, TypeHandler};
use crate::value::Value;

fn cannot_convert(handler: &str, value: &Value) -> BindError {
    BindError::type_error(format!(
        "{} cannot convert {} ({})",
        handler,
        value.type_label(),
        value
    ))
}

#[derive(Debug, Default)]
pub struct BoolTypeHandler;

impl TypeHandler for BoolTypeHandler {
    fn name(&self) -> &str {
        "BooleanTypeHandler"
    }

    fn to_sql(&self, value: &Value, _sql_type: Option<SqlType>) -> BindResult<Value> {
        match value {
            Value::Null | Value::Bool(_) => Ok(value.clone()),
            other => Err(cannot_convert(self.name(), other)),
        }
    }

    fn from_sql(&self, value: Value) -> BindResult<Value> {
        match value {
            Value::Null | Value::Bool(_) => Ok(value),
            Value::Int(n) => Ok(Value::Bool(n != 0)),
            Value::Long(n) => Ok(Value::Bool(n != 0)),
            other => Err(cannot_convert(self.name(), &other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct IntTypeHandler;

impl TypeHandler for IntTypeHandler {
    fn name(&self) -> &str {
        "IntegerTypeHandler"
    }

    fn to_sql(&self, value: &Value, _sql_type: Option<SqlType>) -> BindResult<Value> {
        match value {
            Value::Null | Value::Int(_) => Ok(value.clone()),
            Value::Long(n) => i32::try_from(*n)
                .map(Value::Int)
                .map_err(|_| cannot_convert(self.name(), value)),
            other => Err(cannot_convert(self.name(), other)),
        }
    }

    fn from_sql(&self, value: Value) -> BindResult<Value> {
        match value {
            Value::Null | Value::Int(_) => Ok(value),
            Value::Long(n) => i32::try_from(n)
                .map(Value::Int)
                .map_err(|_| cannot_convert(self.name(), &Value::Long(n))),
            Value::Bool(b) => Ok(Value::Int(b as i32)),
            other => Err(cannot_convert(self.name(), &other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct LongTypeHandler;

impl TypeHandler for LongTypeHandler {
    fn name(&self) -> &str {
        "LongTypeHandler"
    }

    fn to_sql(&self, value: &Value, _sql_type: Option<SqlType>) -> BindResult<Value> {
        match value {
            Value::Null | Value::Long(_) => Ok(value.clone()),
            Value::Int(n) => Ok(Value::Long(*n as i64)),
            other => Err(cannot_convert(self.name(), other)),
        }
    }

    fn from_sql(&self, value: Value) -> BindResult<Value> {
        match value {
            Value::Null | Value::Long(_) => Ok(value),
            Value::Int(n) => Ok(Value::Long(n as i64)),
            other => Err(cannot_convert(self.name(), &other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct DoubleTypeHandler;

impl TypeHandler for DoubleTypeHandler {
    fn name(&self) -> &str {
        "DoubleTypeHandler"
    }

    fn to_sql(&self, value: &Value, _sql_type: Option<SqlType>) -> BindResult<Value> {
        self.from_sql(value.clone())
    }

    fn from_sql(&self, value: Value) -> BindResult<Value> {
        match value {
            Value::Null | Value::Double(_) => Ok(value),
            Value::Int(n) => Ok(Value::Double(n as f64)),
            Value::Long(n) => Ok(Value::Double(n as f64)),
            other => Err(cannot_convert(self.name(), &other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct StringTypeHandler;

impl TypeHandler for StringTypeHandler {
    fn name(&self) -> &str {
        "StringTypeHandler"
    }

    fn to_sql(&self, value: &Value, _sql_type: Option<SqlType>) -> BindResult<Value> {
        match value {
            Value::Null | Value::String(_) => Ok(value.clone()),
            other => Err(cannot_convert(self.name(), other)),
        }
    }

    /// Columns of any simple type read as their text form.
    fn from_sql(&self, value: Value) -> BindResult<Value> {
        match value {
            Value::Null | Value::String(_) => Ok(value),
            Value::Bool(_) | Value::Int(_) | Value::Long(_) | Value::Double(_) => {
                Ok(Value::String(value.to_string()))
            }
            other => Err(cannot_convert(self.name(), &other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct BytesTypeHandler;

impl TypeHandler for BytesTypeHandler {
    fn name(&self) -> &str {
        "ByteArrayTypeHandler"
    }

    fn to_sql(&self, value: &Value, _sql_type: Option<SqlType>) -> BindResult<Value> {
        match value {
            Value::Null | Value::Bytes(_) => Ok(value.clone()),
            other => Err(cannot_convert(self.name(), other)),
        }
    }

    fn from_sql(&self, value: Value) -> BindResult<Value> {
        match value {
            Value::Null | Value::Bytes(_) => Ok(value),
            Value::String(s) => Ok(Value::Bytes(s.into_bytes())),
            other => Err(cannot_convert(self.name(), &other)),
        }
    }
}

/// Handler for parameters whose type is only known at runtime.
///
/// Simple values pass through as they are; structured values have no wire
/// form and are rejected.
#[derive(Debug, Default)]
pub struct UnknownTypeHandler;

impl TypeHandler for UnknownTypeHandler {
    fn name(&self) -> &str {
        "UnknownTypeHandler"
    }

    fn to_sql(&self, value: &Value, sql_type: Option<SqlType>) -> BindResult<Value> {
        match value {
            Value::Null
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Long(_)
            | Value::Double(_)
            | Value::String(_)
            | Value::Bytes(_) => Ok(value.clone()),
            other => Err(BindError::type_error(format!(
                "No type handler can bind a {} parameter (jdbcType={})",
                other.type_label(),
                sql_type.map(|t| t.as_str()).unwrap_or("null")
            ))),
        }
    }

    fn from_sql(&self, value: Value) -> BindResult<Value> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_handler_narrows_long() {
        let handler = IntTypeHandler;
        assert_eq!(handler.to_sql(&Value::Long(5), None).unwrap(), Value::Int(5));
        assert!(handler.to_sql(&Value::Long(i64::MAX), None).is_err());
        assert_eq!(handler.to_sql(&Value::Null, None).unwrap(), Value::Null);
    }

    #[test]
    fn test_string_handler_reads_numbers() {
        let handler = StringTypeHandler;
        assert_eq!(handler.from_sql(Value::Int(3)).unwrap(), Value::from("3"));
        assert!(handler.to_sql(&Value::Int(3), None).is_err());
    }

    #[test]
    fn test_unknown_handler_rejects_structures() {
        let handler = UnknownTypeHandler;
        assert_eq!(handler.to_sql(&Value::Int(1), None).unwrap(), Value::Int(1));
        assert!(handler.to_sql(&Value::List(vec![]), None).is_err());
    }
}
