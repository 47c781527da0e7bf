//! Namespace handling and statement registration shared by all builders.

use std::sync::Arc;

use tracing::debug;

use crate::builder::SqlSourceBuilder;
use crate::error::{BindError, BindResult};
use crate::mapping::{MappedStatement, ResultMap, ResultMapping, SqlCommandType, StaticSql};
use crate::reflection::MetaClass;
use crate::session::Configuration;
use crate::types::{SqlType, TypeHandler};
use crate::value::ValueType;

/// Registers statements and result maps of one resource under one namespace.
pub struct MapperBuilderAssistant<'c> {
    config: &'c mut Configuration,
    resource: String,
    current_namespace: Option<String>,
}

impl<'c> MapperBuilderAssistant<'c> {
    pub fn new(config: &'c mut Configuration, resource: impl Into<String>) -> Self {
        Self {
            config,
            resource: resource.into(),
            current_namespace: None,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &*self.config
    }

    pub fn configuration_mut(&mut self) -> &mut Configuration {
        &mut *self.config
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn current_namespace(&self) -> Option<&str> {
        self.current_namespace.as_deref()
    }

    /// Bind this assistant to `namespace`. Rebinding to a different one fails.
    pub fn set_current_namespace(&mut self, namespace: &str) -> BindResult<()> {
        if namespace.trim().is_empty() {
            return Err(BindError::builder(
                "The mapper element requires a namespace attribute to be specified.",
            ));
        }
        if let Some(current) = &self.current_namespace
            && current != namespace
        {
            return Err(BindError::builder(format!(
                "Wrong namespace. Expected '{}' but found '{}'.",
                current, namespace
            )));
        }
        self.current_namespace = Some(namespace.to_string());
        Ok(())
    }

    /// Qualify `base` with the current namespace.
    ///
    /// References that already contain a `.` are taken as qualified. Ids must
    /// either carry the current namespace prefix or contain no `.` at all.
    pub fn apply_current_namespace(&self, base: &str, is_reference: bool) -> BindResult<String> {
        let namespace = self.current_namespace.as_deref().ok_or_else(|| {
            BindError::builder(format!(
                "No namespace set for '{}' in {}",
                base, self.resource
            ))
        })?;
        if is_reference {
            if base.contains('.') {
                return Ok(base.to_string());
            }
        } else {
            if base
                .strip_prefix(namespace)
                .is_some_and(|rest| rest.starts_with('.'))
            {
                return Ok(base.to_string());
            }
            if base.contains('.') {
                return Err(BindError::builder(format!(
                    "Dots are not allowed in element names, please remove it from {}",
                    base
                )));
            }
        }
        Ok(format!("{}.{}", namespace, base))
    }

    /// Compile a template against this configuration.
    pub fn compile_sql(&self, template: &str, parameter_type: Option<&ValueType>) -> BindResult<StaticSql> {
        SqlSourceBuilder::new(&*self.config).parse(template, parameter_type)
    }

    /// Build a column mapping for a result of type `result_type`.
    ///
    /// Without an explicit `java_type`, object results use the setter type of
    /// `property`.
    pub fn build_result_mapping(
        &self,
        result_type: &ValueType,
        property: &str,
        column: &str,
        java_type: Option<ValueType>,
        sql_type: Option<SqlType>,
        type_handler: Option<&str>,
    ) -> BindResult<ResultMapping> {
        let value_type = match java_type {
            Some(ty) => ty,
            None => match result_type.as_object() {
                Some(object) => MetaClass::for_type(self.config.reflector(), object)?.setter_type(property)?,
                None => ValueType::Any,
            },
        };
        let handler = self.resolve_handler(&value_type, sql_type, type_handler)?;
        Ok(ResultMapping::new(property, column, value_type, handler))
    }

    fn resolve_handler(
        &self,
        value_type: &ValueType,
        sql_type: Option<SqlType>,
        alias: Option<&str>,
    ) -> BindResult<Arc<dyn TypeHandler>> {
        let registry = self.config.type_handlers();
        if let Some(alias) = alias {
            return registry
                .get_named(alias)
                .ok_or_else(|| BindError::builder(format!("Unknown type handler '{}'", alias)));
        }
        Ok(registry
            .get_type_handler(value_type, sql_type)
            .or_else(|| sql_type.and_then(|t| registry.get_sql_type_handler(t)))
            .unwrap_or_else(|| registry.unknown()))
    }

    /// Register a named result map.
    pub fn add_result_map(
        &mut self,
        id: &str,
        ty: ValueType,
        mappings: Vec<ResultMapping>,
        auto_mapping: Option<bool>,
    ) -> BindResult<Arc<ResultMap>> {
        let id = self.apply_current_namespace(id, false)?;
        let result_map = Arc::new(ResultMap::new(id, ty, mappings).with_auto_mapping(auto_mapping));
        self.config.add_result_map(result_map.clone())?;
        Ok(result_map)
    }

    /// Register a statement.
    ///
    /// `result_map` names registered result maps (comma separated). Without
    /// one, a select with a `result_type` gets an inline map `<id>-Inline`
    /// typed by the element type of `result_type`.
    pub fn add_mapped_statement(
        &mut self,
        id: &str,
        sql: StaticSql,
        command_type: SqlCommandType,
        parameter_type: Option<ValueType>,
        result_map: Option<&str>,
        result_type: Option<ValueType>,
    ) -> BindResult<Arc<MappedStatement>> {
        let id = self.apply_current_namespace(id, false)?;
        let result_maps = self.statement_result_maps(&id, command_type, result_map, result_type)?;

        let statement = Arc::new(
            MappedStatement::builder(id, sql, command_type)
                .resource(self.resource.as_str())
                .parameter_type(parameter_type)
                .result_maps(result_maps)
                .build(),
        );
        self.config.add_mapped_statement(statement.clone())?;
        debug!(
            "Added {} {} with {} parameters",
            statement.command_type(),
            statement.id(),
            statement.sql().parameter_mappings().len()
        );
        Ok(statement)
    }

    fn statement_result_maps(
        &self,
        statement_id: &str,
        command_type: SqlCommandType,
        result_map: Option<&str>,
        result_type: Option<ValueType>,
    ) -> BindResult<Vec<Arc<ResultMap>>> {
        if let Some(names) = result_map {
            return names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    let id = self.apply_current_namespace(name, true)?;
                    self.config.result_map(&id).map_err(|_| {
                        BindError::builder(format!(
                            "Could not find result map '{}' referenced from '{}'",
                            id, statement_id
                        ))
                    })
                })
                .collect();
        }
        match result_type {
            Some(ty) if command_type.is_select() => {
                let inline = ResultMap::new(
                    format!("{}-Inline", statement_id),
                    ty.element_type().clone(),
                    Vec::new(),
                );
                Ok(vec![Arc::new(inline)])
            }
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_binding() {
        let mut config = Configuration::default();
        let mut assistant = MapperBuilderAssistant::new(&mut config, "test");
        assert!(assistant.set_current_namespace("").is_err());
        assistant.set_current_namespace("blog").unwrap();
        assistant.set_current_namespace("blog").unwrap();
        let err = assistant.set_current_namespace("post").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Builder error: Wrong namespace. Expected 'blog' but found 'post'."
        );
    }

    #[test]
    fn test_apply_current_namespace() {
        let mut config = Configuration::default();
        let mut assistant = MapperBuilderAssistant::new(&mut config, "test");
        assistant.set_current_namespace("blog").unwrap();

        assert_eq!(assistant.apply_current_namespace("find", false).unwrap(), "blog.find");
        assert_eq!(assistant.apply_current_namespace("blog.find", false).unwrap(), "blog.find");
        assert_eq!(assistant.apply_current_namespace("other.map", true).unwrap(), "other.map");
        assert_eq!(assistant.apply_current_namespace("map", true).unwrap(), "blog.map");

        let err = assistant.apply_current_namespace("a.find", false).unwrap_err();
        assert!(err.to_string().contains("Dots are not allowed in element names"));
        assert!(assistant.apply_current_namespace("blogger.find", false).is_err());
    }
}
