//! Type handler lookup by value type, wire type and name.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::types::handlers::*;
use crate::types::{SqlType, TypeHandler};
use crate::value::ValueType;

/// All known [`TypeHandler`]s.
#[derive(Debug)]
pub struct TypeHandlerRegistry {
    by_type: HashMap<ValueType, IndexMap<Option<SqlType>, Arc<dyn TypeHandler>>>,
    by_sql_type: HashMap<SqlType, Arc<dyn TypeHandler>>,
    by_name: HashMap<String, Arc<dyn TypeHandler>>,
    unknown: Arc<dyn TypeHandler>,
}

impl Default for TypeHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeHandlerRegistry {
    /// Registry with the built-in handlers.
    pub fn new() -> Self {
        let unknown: Arc<dyn TypeHandler> = Arc::new(UnknownTypeHandler);
        let mut registry = Self {
            by_type: HashMap::new(),
            by_sql_type: HashMap::new(),
            by_name: HashMap::new(),
            unknown: unknown.clone(),
        };

        let builtins: [(ValueType, Arc<dyn TypeHandler>, &[SqlType]); 6] = [
            (
                ValueType::Bool,
                Arc::new(BoolTypeHandler),
                &[SqlType::Boolean, SqlType::Bit],
            ),
            (
                ValueType::Int,
                Arc::new(IntTypeHandler),
                &[SqlType::Integer, SqlType::SmallInt, SqlType::TinyInt],
            ),
            (ValueType::Long, Arc::new(LongTypeHandler), &[SqlType::BigInt]),
            (
                ValueType::Double,
                Arc::new(DoubleTypeHandler),
                &[SqlType::Double, SqlType::Float, SqlType::Real],
            ),
            (
                ValueType::String,
                Arc::new(StringTypeHandler),
                &[
                    SqlType::Varchar,
                    SqlType::Char,
                    SqlType::LongVarchar,
                    SqlType::NVarchar,
                    SqlType::NChar,
                    SqlType::Clob,
                ],
            ),
            (
                ValueType::Bytes,
                Arc::new(BytesTypeHandler),
                &[
                    SqlType::Blob,
                    SqlType::Binary,
                    SqlType::VarBinary,
                    SqlType::LongVarBinary,
                ],
            ),
        ];

        for (ty, handler, sql_types) in builtins {
            registry.register(ty.clone(), None, handler.clone());
            for sql_type in sql_types {
                registry.register(ty.clone(), Some(*sql_type), handler.clone());
                registry.register_sql_type(*sql_type, handler.clone());
            }
            registry.register_named(handler.name().to_string(), handler);
        }

        registry.register(ValueType::Any, None, unknown.clone());
        registry.register_sql_type(SqlType::Other, unknown.clone());
        registry.register_named(unknown.name().to_string(), unknown);
        registry
    }

    /// Register `handler` for `ty`, optionally restricted to one wire type.
    pub fn register(&mut self, ty: ValueType, sql_type: Option<SqlType>, handler: Arc<dyn TypeHandler>) {
        self.by_type.entry(ty).or_default().insert(sql_type, handler);
    }

    /// Register `handler` for a wire type regardless of value type.
    pub fn register_sql_type(&mut self, sql_type: SqlType, handler: Arc<dyn TypeHandler>) {
        self.by_sql_type.insert(sql_type, handler);
    }

    /// Make `handler` available to `typeHandler=` references.
    pub fn register_named(&mut self, name: impl Into<String>, handler: Arc<dyn TypeHandler>) {
        self.by_name.insert(name.into(), handler);
    }

    pub fn has_type_handler(&self, ty: &ValueType, sql_type: Option<SqlType>) -> bool {
        self.get_type_handler(ty, sql_type).is_some()
    }

    /// Handler for `ty`: the exact wire type first, then the untyped entry,
    /// then the only handler registered for `ty`. Object types fall back to
    /// their declared supertypes. The parameter bag type never has one.
    pub fn get_type_handler(&self, ty: &ValueType, sql_type: Option<SqlType>) -> Option<Arc<dyn TypeHandler>> {
        if *ty == ValueType::Params {
            return None;
        }
        if let Some(handlers) = self.by_type.get(ty) {
            let found = handlers
                .get(&sql_type)
                .or_else(|| handlers.get(&None))
                .or_else(|| sole_handler(handlers));
            if found.is_some() {
                return found.cloned();
            }
        }
        let object = ty.as_object()?;
        object
            .shape()
            .supertypes()
            .iter()
            .find_map(|parent| self.get_type_handler(&ValueType::Object(*parent), sql_type))
    }

    pub fn get_sql_type_handler(&self, sql_type: SqlType) -> Option<Arc<dyn TypeHandler>> {
        self.by_sql_type.get(&sql_type).cloned()
    }

    pub fn get_named(&self, name: &str) -> Option<Arc<dyn TypeHandler>> {
        self.by_name.get(name).cloned()
    }

    pub fn unknown(&self) -> Arc<dyn TypeHandler> {
        self.unknown.clone()
    }
}

/// The single handler behind all wire types of one value type, if they agree.
fn sole_handler(handlers: &IndexMap<Option<SqlType>, Arc<dyn TypeHandler>>) -> Option<&Arc<dyn TypeHandler>> {
    let mut values = handlers.values();
    let first = values.next()?;
    values.all(|h| Arc::ptr_eq(h, first)).then_some(first)
}
