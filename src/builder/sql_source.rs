//! Compiles a `#{...}` template into positional SQL plus parameter mappings.

use tracing::debug;

use crate::error::{BindError, BindResult};
use crate::mapping::{ParameterMapping, ParameterMode, StaticSql};
use crate::parsing::{ParameterExpression, TokenParser};
use crate::reflection::{MetaClass, ReflectorCache};
use crate::session::{Configuration, Settings};
use crate::types::{SqlType, TypeAliasRegistry, TypeHandlerRegistry};
use crate::value::ValueType;

const PARAMETER_PROPERTIES: &str = "javaType,jdbcType,mode,numericScale,resultMap,typeHandler,jdbcTypeName";

/// Template compiler over the registries of one configuration.
#[derive(Clone, Copy)]
pub struct SqlSourceBuilder<'a> {
    reflector: &'a ReflectorCache,
    type_handlers: &'a TypeHandlerRegistry,
    type_aliases: &'a TypeAliasRegistry,
    settings: &'a Settings,
}

impl<'a> SqlSourceBuilder<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self {
            reflector: config.reflector(),
            type_handlers: config.type_handlers(),
            type_aliases: config.type_aliases(),
            settings: config.settings(),
        }
    }

    /// Compile `template` for a statement whose parameter has type
    /// `parameter_type` (`None` meaning no parameter).
    pub fn parse(&self, template: &str, parameter_type: Option<&ValueType>) -> BindResult<StaticSql> {
        let any = ValueType::Any;
        let parameter_type = parameter_type.unwrap_or(&any);
        let parser = TokenParser::new(
            self.settings.open_token.as_str(),
            self.settings.close_token.as_str(),
        );

        let mut mappings: Vec<ParameterMapping> = Vec::new();
        let mut handler = |content: &str| -> BindResult<String> {
            mappings.push(self.build_parameter_mapping(content, parameter_type)?);
            Ok(self.settings.placeholder.render(mappings.len()))
        };
        let sql = parser.parse(template, &mut handler)?;
        let sql = if self.settings.shrink_whitespaces_in_sql {
            sql.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            sql
        };

        debug!("Compiled SQL with {} parameters: {}", mappings.len(), sql);
        Ok(StaticSql::new(sql, mappings))
    }

    /// Build the mapping for one `#{...}` reference.
    pub fn build_parameter_mapping(&self, content: &str, parameter_type: &ValueType) -> BindResult<ParameterMapping> {
        let expression = ParameterExpression::parse(content)?;
        if expression.expression.is_some() {
            return Err(BindError::builder(
                "Expression based parameters are not supported yet",
            ));
        }
        let property = expression.property.clone().unwrap_or_default();
        let property_type = self.property_type(&property, parameter_type);

        let mut builder = ParameterMapping::builder(property, property_type);
        if let Some(jdbc_type) = &expression.jdbc_type {
            builder = builder.sql_type(jdbc_type.parse::<SqlType>()?);
        }
        for (name, value) in &expression.options {
            builder = match name.as_str() {
                "javaType" => builder.value_type(self.type_aliases.resolve(value)?),
                "jdbcType" => builder.sql_type(value.parse::<SqlType>()?),
                "mode" => builder.mode(value.parse::<ParameterMode>()?),
                "numericScale" => builder.numeric_scale(value.parse::<u32>().map_err(|_| {
                    BindError::builder(format!(
                        "Invalid numericScale '{}' in mapping #{{{}}}",
                        value, content
                    ))
                })?),
                "resultMap" => builder.result_map_id(value.as_str()),
                "typeHandler" => builder.type_handler_alias(value.as_str()),
                "jdbcTypeName" => builder.sql_type_name(value.as_str()),
                "property" => builder,
                "expression" => {
                    return Err(BindError::builder(
                        "Expression based parameters are not supported yet",
                    ));
                }
                _ => {
                    return Err(BindError::builder(format!(
                        "An invalid property '{}' was found in mapping #{{{}}}.  Valid properties are {}",
                        name, content, PARAMETER_PROPERTIES
                    )));
                }
            };
        }
        builder.build(self.type_handlers)
    }

    /// Declared type of `property` on a parameter of type `parameter_type`.
    fn property_type(&self, property: &str, parameter_type: &ValueType) -> ValueType {
        if self.type_handlers.has_type_handler(parameter_type, None) {
            return parameter_type.clone();
        }
        parameter_type
            .as_object()
            .and_then(|object| MetaClass::for_type(self.reflector, object).ok())
            .filter(|meta| meta.has_getter(property))
            .and_then(|meta| meta.getter_type(property).ok())
            .unwrap_or(ValueType::Any)
    }
}
