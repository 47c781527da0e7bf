//! Immutable statement definitions: parameter mappings, compiled SQL,
//! statements and result maps.

pub mod parameter;
pub mod result;
pub mod statement;

pub use parameter::{ParameterMapping, ParameterMappingBuilder, ParameterMode};
pub use result::{ResultMap, ResultMapping};
pub use statement::{BoundSql, MappedStatement, MappedStatementBuilder, SqlCommandType, StaticSql};
