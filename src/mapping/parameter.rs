//! Resolved parameter descriptors.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{BindError, BindResult};
use crate::types::{SqlType, TypeHandler, TypeHandlerRegistry};
use crate::value::ValueType;

/// Direction of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterMode {
    #[default]
    In,
    Out,
    InOut,
}

impl FromStr for ParameterMode {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(ParameterMode::In),
            "OUT" => Ok(ParameterMode::Out),
            "INOUT" => Ok(ParameterMode::InOut),
            other => Err(BindError::builder(format!(
                "Error resolving ParameterMode. Cause: no constant named '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ParameterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterMode::In => write!(f, "IN"),
            ParameterMode::Out => write!(f, "OUT"),
            ParameterMode::InOut => write!(f, "INOUT"),
        }
    }
}

/// One positional parameter of a compiled statement.
#[derive(Debug, Clone)]
pub struct ParameterMapping {
    property: String,
    mode: ParameterMode,
    value_type: ValueType,
    sql_type: Option<SqlType>,
    numeric_scale: Option<u32>,
    result_map_id: Option<String>,
    sql_type_name: Option<String>,
    type_handler: Arc<dyn TypeHandler>,
}

impl ParameterMapping {
    pub fn builder(property: impl Into<String>, value_type: ValueType) -> ParameterMappingBuilder {
        ParameterMappingBuilder::new(property, value_type)
    }

    /// Property path read from the parameter object.
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn mode(&self) -> ParameterMode {
        self.mode
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn sql_type(&self) -> Option<SqlType> {
        self.sql_type
    }

    pub fn numeric_scale(&self) -> Option<u32> {
        self.numeric_scale
    }

    pub fn result_map_id(&self) -> Option<&str> {
        self.result_map_id.as_deref()
    }

    pub fn sql_type_name(&self) -> Option<&str> {
        self.sql_type_name.as_deref()
    }

    pub fn type_handler(&self) -> &Arc<dyn TypeHandler> {
        &self.type_handler
    }
}

/// Two-phase builder; `build` binds the type handler.
#[derive(Debug, Clone)]
pub struct ParameterMappingBuilder {
    property: String,
    mode: ParameterMode,
    value_type: ValueType,
    sql_type: Option<SqlType>,
    numeric_scale: Option<u32>,
    result_map_id: Option<String>,
    sql_type_name: Option<String>,
    type_handler: Option<Arc<dyn TypeHandler>>,
    type_handler_alias: Option<String>,
}

impl ParameterMappingBuilder {
    pub fn new(property: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            property: property.into(),
            mode: ParameterMode::In,
            value_type,
            sql_type: None,
            numeric_scale: None,
            result_map_id: None,
            sql_type_name: None,
            type_handler: None,
            type_handler_alias: None,
        }
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn mode(mut self, mode: ParameterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn sql_type(mut self, sql_type: SqlType) -> Self {
        self.sql_type = Some(sql_type);
        self
    }

    pub fn numeric_scale(mut self, scale: u32) -> Self {
        self.numeric_scale = Some(scale);
        self
    }

    pub fn result_map_id(mut self, id: impl Into<String>) -> Self {
        self.result_map_id = Some(id.into());
        self
    }

    pub fn sql_type_name(mut self, name: impl Into<String>) -> Self {
        self.sql_type_name = Some(name.into());
        self
    }

    pub fn type_handler(mut self, handler: Arc<dyn TypeHandler>) -> Self {
        self.type_handler = Some(handler);
        self
    }

    /// Use the handler registered under `name`.
    pub fn type_handler_alias(mut self, name: impl Into<String>) -> Self {
        self.type_handler_alias = Some(name.into());
        self
    }

    pub fn build(self, registry: &TypeHandlerRegistry) -> BindResult<ParameterMapping> {
        let type_handler = match (self.type_handler.clone(), self.type_handler_alias.as_deref()) {
            (Some(handler), _) => handler,
            (None, Some(alias)) => registry.get_named(alias).ok_or_else(|| {
                BindError::builder(format!(
                    "Unknown type handler '{}' for property '{}'",
                    alias, self.property
                ))
            })?,
            (None, None) => self.resolve_type_handler(registry)?,
        };

        Ok(ParameterMapping {
            property: self.property,
            mode: self.mode,
            value_type: self.value_type,
            sql_type: self.sql_type,
            numeric_scale: self.numeric_scale,
            result_map_id: self.result_map_id,
            sql_type_name: self.sql_type_name,
            type_handler,
        })
    }

    fn resolve_type_handler(&self, registry: &TypeHandlerRegistry) -> BindResult<Arc<dyn TypeHandler>> {
        if self.value_type == ValueType::Params {
            return Err(BindError::builder(format!(
                "Type handler was null on parameter mapping for property '{}'. It was either not specified and/or could not be found for the javaType ({}) : jdbcType ({}) combination.",
                self.property,
                self.value_type,
                self.sql_type.map(|t| t.as_str()).unwrap_or("null")
            )));
        }
        Ok(registry
            .get_type_handler(&self.value_type, self.sql_type)
            .or_else(|| self.sql_type.and_then(|t| registry.get_sql_type_handler(t)))
            .unwrap_or_else(|| registry.unknown()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_handler_by_type() {
        let registry = TypeHandlerRegistry::new();
        let mapping = ParameterMapping::builder("id", ValueType::Int)
            .build(&registry)
            .unwrap();
        assert_eq!(mapping.type_handler().name(), "IntegerTypeHandler");
        assert_eq!(mapping.mode(), ParameterMode::In);
    }

    #[test]
    fn test_falls_back_to_sql_type_then_unknown() {
        let registry = TypeHandlerRegistry::new();
        let mapping = ParameterMapping::builder("blob", ValueType::Map)
            .sql_type(SqlType::Blob)
            .build(&registry)
            .unwrap();
        assert_eq!(mapping.type_handler().name(), "ByteArrayTypeHandler");

        let mapping = ParameterMapping::builder("anything", ValueType::Map)
            .build(&registry)
            .unwrap();
        assert_eq!(mapping.type_handler().name(), "UnknownTypeHandler");
    }

    #[test]
    fn test_params_type_is_rejected() {
        let registry = TypeHandlerRegistry::new();
        let err = ParameterMapping::builder("bag", ValueType::Params)
            .sql_type(SqlType::Other)
            .build(&registry)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'bag'"));
        assert!(message.contains("ParamMap"));
        assert!(message.contains("OTHER"));
    }

    #[test]
    fn test_unknown_alias() {
        let registry = TypeHandlerRegistry::new();
        let err = ParameterMapping::builder("id", ValueType::Int)
            .type_handler_alias("MissingHandler")
            .build(&registry)
            .unwrap_err();
        assert!(err.to_string().contains("MissingHandler"));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("inout".parse::<ParameterMode>().unwrap(), ParameterMode::InOut);
        assert!("sideways".parse::<ParameterMode>().is_err());
    }
}
