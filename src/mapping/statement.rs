//! Compiled SQL and immutable statement definitions.

use std::fmt;
use std::sync::Arc;

use crate::mapping::{ParameterMapping, ResultMap};
use crate::value::{Value, ValueType};

/// Kind of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SqlCommandType {
    #[default]
    Unknown,
    Select,
    Insert,
    Update,
    Delete,
}

impl SqlCommandType {
    /// Parse a kind name, case-insensitively; anything else is `Unknown`.
    pub fn parse(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "select" => SqlCommandType::Select,
            "insert" => SqlCommandType::Insert,
            "update" => SqlCommandType::Update,
            "delete" => SqlCommandType::Delete,
            _ => SqlCommandType::Unknown,
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(self, SqlCommandType::Select)
    }
}

impl fmt::Display for SqlCommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlCommandType::Unknown => "UNKNOWN",
            SqlCommandType::Select => "SELECT",
            SqlCommandType::Insert => "INSERT",
            SqlCommandType::Update => "UPDATE",
            SqlCommandType::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

/// SQL with positional placeholders and one mapping per placeholder.
#[derive(Debug, Clone)]
pub struct StaticSql {
    sql: String,
    parameter_mappings: Vec<ParameterMapping>,
}

impl StaticSql {
    pub fn new(sql: impl Into<String>, parameter_mappings: Vec<ParameterMapping>) -> Self {
        Self {
            sql: sql.into(),
            parameter_mappings,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameter_mappings(&self) -> &[ParameterMapping] {
        &self.parameter_mappings
    }

    /// Pair the compiled SQL with the parameter value of one call.
    pub fn bind(&self, parameter: Value) -> BoundSql<'_> {
        BoundSql {
            sql: &self.sql,
            parameter_mappings: &self.parameter_mappings,
            parameter,
        }
    }
}

/// Compiled SQL plus the parameter value of one call.
#[derive(Debug)]
pub struct BoundSql<'s> {
    sql: &'s str,
    parameter_mappings: &'s [ParameterMapping],
    parameter: Value,
}

impl<'s> BoundSql<'s> {
    pub fn sql(&self) -> &'s str {
        self.sql
    }

    pub fn parameter_mappings(&self) -> &'s [ParameterMapping] {
        self.parameter_mappings
    }

    pub fn parameter(&self) -> &Value {
        &self.parameter
    }
}

/// A registered statement. Created once by the builders, never mutated.
#[derive(Debug, Clone)]
pub struct MappedStatement {
    id: String,
    resource: String,
    command_type: SqlCommandType,
    sql: StaticSql,
    parameter_type: Option<ValueType>,
    result_maps: Vec<Arc<ResultMap>>,
}

impl MappedStatement {
    pub fn builder(id: impl Into<String>, sql: StaticSql, command_type: SqlCommandType) -> MappedStatementBuilder {
        MappedStatementBuilder::new(id, sql, command_type)
    }

    /// Fully qualified id, `namespace.member`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the statement was declared.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn command_type(&self) -> SqlCommandType {
        self.command_type
    }

    pub fn sql(&self) -> &StaticSql {
        &self.sql
    }

    /// Declared parameter type; `None` for statements without arguments.
    pub fn parameter_type(&self) -> Option<&ValueType> {
        self.parameter_type.as_ref()
    }

    pub fn result_maps(&self) -> &[Arc<ResultMap>] {
        &self.result_maps
    }

    pub fn bound_sql(&self, parameter: Value) -> BoundSql<'_> {
        self.sql.bind(parameter)
    }
}

/// Builder for [`MappedStatement`].
#[derive(Debug)]
pub struct MappedStatementBuilder {
    statement: MappedStatement,
}

impl MappedStatementBuilder {
    pub fn new(id: impl Into<String>, sql: StaticSql, command_type: SqlCommandType) -> Self {
        Self {
            statement: MappedStatement {
                id: id.into(),
                resource: String::new(),
                command_type,
                sql,
                parameter_type: None,
                result_maps: Vec::new(),
            },
        }
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.statement.resource = resource.into();
        self
    }

    pub fn parameter_type(mut self, ty: Option<ValueType>) -> Self {
        self.statement.parameter_type = ty;
        self
    }

    pub fn result_maps(mut self, result_maps: Vec<Arc<ResultMap>>) -> Self {
        self.statement.result_maps = result_maps;
        self
    }

    pub fn build(self) -> MappedStatement {
        self.statement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_type_parse() {
        assert_eq!(SqlCommandType::parse("SELECT"), SqlCommandType::Select);
        assert_eq!(SqlCommandType::parse(" delete "), SqlCommandType::Delete);
        assert_eq!(SqlCommandType::parse("merge"), SqlCommandType::Unknown);
    }

    #[test]
    fn test_builder_defaults() {
        let statement = MappedStatement::builder(
            "ns.count",
            StaticSql::new("select count(*) from t", Vec::new()),
            SqlCommandType::Select,
        )
        .resource("ns (test)")
        .build();
        assert_eq!(statement.id(), "ns.count");
        assert_eq!(statement.parameter_type(), None);
        assert!(statement.result_maps().is_empty());
        assert_eq!(statement.bound_sql(Value::Null).sql(), "select count(*) from t");
    }
}
