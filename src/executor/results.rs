//! Materialization of result rows.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{BindError, BindResult};
use crate::mapping::{MappedStatement, ResultMap};
use crate::reflection::{MetaClass, PropertyNavigator};
use crate::session::Configuration;
use crate::types::TypeHandler;
use crate::value::{ObjectType, Row, Value, ValueType};

/// Turns the rows of one statement into values of its result type.
pub struct ResultSetHandler<'a> {
    config: &'a Configuration,
    statement: &'a MappedStatement,
}

impl<'a> ResultSetHandler<'a> {
    pub fn new(config: &'a Configuration, statement: &'a MappedStatement) -> Self {
        Self { config, statement }
    }

    /// One value per row. Statements without a result map yield each row as
    /// a map of column names to raw values.
    pub fn handle_rows(&self, rows: Vec<Row>) -> BindResult<Vec<Value>> {
        let Some(result_map) = self.statement.result_maps().first() else {
            return Ok(rows.into_iter().map(raw_row).collect());
        };
        rows.into_iter()
            .map(|row| self.row_value(result_map, row))
            .collect()
    }

    fn row_value(&self, result_map: &ResultMap, row: Row) -> BindResult<Value> {
        let ty = result_map.value_type();
        match ty {
            ValueType::Any | ValueType::Map => self.map_value(result_map, row),
            ValueType::Object(object) if !self.has_handler(ty) => {
                self.object_value(result_map, object, row)
            }
            _ => self.simple_value(result_map, row),
        }
    }

    fn has_handler(&self, ty: &ValueType) -> bool {
        self.config.type_handlers().has_type_handler(ty, None)
    }

    fn auto_mapping(&self, result_map: &ResultMap) -> bool {
        result_map
            .auto_mapping()
            .unwrap_or(self.config.settings().auto_mapping)
    }

    /// First column through the handler of the result type.
    fn simple_value(&self, result_map: &ResultMap, row: Row) -> BindResult<Value> {
        if let Some(mapping) = result_map.mappings().first() {
            let value = column(&row, mapping.column());
            return mapping.type_handler().from_sql(value);
        }
        let ty = result_map.value_type();
        let handler = self.config.type_handlers().get_type_handler(ty, None).ok_or_else(|| {
            BindError::type_error(format!(
                "No type handler found for result type {} of result map '{}'",
                ty,
                result_map.id()
            ))
        })?;
        let value = row.into_iter().next().map(|(_, v)| v).unwrap_or_default();
        handler.from_sql(value)
    }

    fn map_value(&self, result_map: &ResultMap, row: Row) -> BindResult<Value> {
        let mut map = BTreeMap::new();
        for mapping in result_map.mappings() {
            let value = mapping.type_handler().from_sql(column(&row, mapping.column()))?;
            map.insert(mapping.property().to_string(), value);
        }
        if self.auto_mapping(result_map) {
            for (name, value) in row {
                if !result_map.is_mapped_column(&name) {
                    map.insert(name, value);
                }
            }
        }
        Ok(Value::Map(map))
    }

    /// Instantiate the result type, apply explicit mappings, then auto-map
    /// the remaining columns. A row without a single non-null mapped value
    /// yields `Null`.
    fn object_value(&self, result_map: &ResultMap, object: &ObjectType, row: Row) -> BindResult<Value> {
        let settings = self.config.settings();
        let navigator = self.config.navigator();
        let descriptor = self.config.reflector().describe(object)?;
        let mut instance = Value::Object(descriptor.instantiate()?);
        let mut found = false;

        for mapping in result_map.mappings() {
            let value = mapping.type_handler().from_sql(column(&row, mapping.column()))?;
            let target = Target {
                property: mapping.property(),
                ty: mapping.value_type(),
            };
            found |= apply(&navigator, &mut instance, target, value, settings.call_setters_on_nulls)?;
        }

        if self.auto_mapping(result_map) {
            let meta = MetaClass::for_type(self.config.reflector(), object)?;
            for (name, value) in row {
                if result_map.is_mapped_column(&name) {
                    continue;
                }
                let Some(property) = meta.find_property(&name, settings.map_underscore_to_camel_case) else {
                    continue;
                };
                if !meta.has_setter(&property) {
                    continue;
                }
                let ty = meta.setter_type(&property)?;
                let value = self.auto_mapping_handler(&ty).from_sql(value)?;
                let target = Target {
                    property: &property,
                    ty: &ty,
                };
                found |= apply(&navigator, &mut instance, target, value, settings.call_setters_on_nulls)?;
            }
        }

        Ok(if found { instance } else { Value::Null })
    }

    fn auto_mapping_handler(&self, ty: &ValueType) -> Arc<dyn TypeHandler> {
        let registry = self.config.type_handlers();
        registry
            .get_type_handler(ty, None)
            .unwrap_or_else(|| registry.unknown())
    }
}

struct Target<'t> {
    property: &'t str,
    ty: &'t ValueType,
}

/// Set the target property unless `value` is null and nulls are skipped.
/// Primitive properties never receive nulls. Returns whether a non-null
/// value was found.
fn apply(
    navigator: &PropertyNavigator<'_>,
    instance: &mut Value,
    target: Target<'_>,
    value: Value,
    call_setters_on_nulls: bool,
) -> BindResult<bool> {
    let found = !value.is_null();
    let primitive = matches!(
        target.ty,
        ValueType::Bool | ValueType::Int | ValueType::Long | ValueType::Double
    );
    if found || (call_setters_on_nulls && !primitive) {
        navigator.set(instance, target.property, value)?;
    }
    Ok(found)
}

fn column(row: &Row, name: &str) -> Value {
    row.get(name)
        .or_else(|| {
            row.iter()
                .find(|(column, _)| column.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .cloned()
        .unwrap_or_default()
}

fn raw_row(row: Row) -> Value {
    Value::Map(row.into_iter().collect())
}
