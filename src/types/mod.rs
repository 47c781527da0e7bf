//! Marshalling between values and their wire form.

pub mod alias;
pub mod handlers;
pub mod registry;

use std::fmt;
use std::str::FromStr;

pub use alias::TypeAliasRegistry;
pub use handlers::{
    BoolTypeHandler, BytesTypeHandler, DoubleTypeHandler, IntTypeHandler, LongTypeHandler,
    StringTypeHandler, UnknownTypeHandler,
};
pub use registry::TypeHandlerRegistry;

use crate::error::{BindError, BindResult};
use crate::value::Value;

/// Marshalling strategy for one value type.
pub trait TypeHandler: Send + Sync + fmt::Debug {
    /// Name used by `typeHandler=` references.
    fn name(&self) -> &str;

    /// Convert a parameter into the value handed to the transaction.
    fn to_sql(&self, value: &Value, sql_type: Option<SqlType>) -> BindResult<Value>;

    /// Convert a column value into the handler's value type.
    fn from_sql(&self, value: Value) -> BindResult<Value>;
}

/// Declared wire type of a parameter or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Array,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    NChar,
    NVarchar,
    Clob,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Boolean,
    Date,
    Time,
    Timestamp,
    Null,
    Other,
    Undefined,
}

impl SqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::Array => "ARRAY",
            SqlType::Bit => "BIT",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Char => "CHAR",
            SqlType::Varchar => "VARCHAR",
            SqlType::LongVarchar => "LONGVARCHAR",
            SqlType::NChar => "NCHAR",
            SqlType::NVarchar => "NVARCHAR",
            SqlType::Clob => "CLOB",
            SqlType::Binary => "BINARY",
            SqlType::VarBinary => "VARBINARY",
            SqlType::LongVarBinary => "LONGVARBINARY",
            SqlType::Blob => "BLOB",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Null => "NULL",
            SqlType::Other => "OTHER",
            SqlType::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SqlType {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim().to_ascii_uppercase().as_str() {
            "ARRAY" => SqlType::Array,
            "BIT" => SqlType::Bit,
            "TINYINT" => SqlType::TinyInt,
            "SMALLINT" => SqlType::SmallInt,
            "INTEGER" | "INT" => SqlType::Integer,
            "BIGINT" => SqlType::BigInt,
            "FLOAT" => SqlType::Float,
            "REAL" => SqlType::Real,
            "DOUBLE" => SqlType::Double,
            "NUMERIC" => SqlType::Numeric,
            "DECIMAL" => SqlType::Decimal,
            "CHAR" => SqlType::Char,
            "VARCHAR" => SqlType::Varchar,
            "LONGVARCHAR" => SqlType::LongVarchar,
            "NCHAR" => SqlType::NChar,
            "NVARCHAR" => SqlType::NVarchar,
            "CLOB" => SqlType::Clob,
            "BINARY" => SqlType::Binary,
            "VARBINARY" => SqlType::VarBinary,
            "LONGVARBINARY" => SqlType::LongVarBinary,
            "BLOB" => SqlType::Blob,
            "BOOLEAN" => SqlType::Boolean,
            "DATE" => SqlType::Date,
            "TIME" => SqlType::Time,
            "TIMESTAMP" => SqlType::Timestamp,
            "NULL" => SqlType::Null,
            "OTHER" => SqlType::Other,
            "UNDEFINED" => SqlType::Undefined,
            other => {
                return Err(BindError::builder(format!(
                    "Error resolving JdbcType. Cause: no constant named '{}'",
                    other
                )));
            }
        };
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_type_parse() {
        assert_eq!("varchar".parse::<SqlType>().unwrap(), SqlType::Varchar);
        assert_eq!(" INTEGER ".parse::<SqlType>().unwrap(), SqlType::Integer);
        assert_eq!(SqlType::BigInt.to_string(), "BIGINT");
        assert!("TEXTY".parse::<SqlType>().is_err());
    }
}
