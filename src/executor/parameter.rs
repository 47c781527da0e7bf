//! Turns a bound statement's parameter into positional wire values.

use crate::error::BindResult;
use crate::mapping::{BoundSql, ParameterMode};
use crate::session::Configuration;
use crate::value::{Value, ValueType};

/// Resolves every placeholder of a [`BoundSql`] to its wire value.
pub struct ParameterBinder<'a> {
    config: &'a Configuration,
}

impl<'a> ParameterBinder<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// One value per placeholder, in placeholder order. `OUT` placeholders
    /// are bound as `Null`.
    ///
    /// A parameter of a type with its own handler (a plain `int`, a string)
    /// is used as the value of every placeholder. Otherwise each placeholder
    /// reads its property path from the parameter.
    pub fn bind(&self, bound: &BoundSql<'_>) -> BindResult<Vec<Value>> {
        let parameter = bound.parameter();
        let simple = !parameter.is_null()
            && self
                .config
                .type_handlers()
                .has_type_handler(&ValueType::of_value(parameter), None);
        let navigator = self.config.navigator();

        let mut values = Vec::with_capacity(bound.parameter_mappings().len());
        for mapping in bound.parameter_mappings() {
            if mapping.mode() == ParameterMode::Out {
                values.push(Value::Null);
                continue;
            }
            let value = if parameter.is_null() {
                Value::Null
            } else if simple {
                parameter.clone()
            } else {
                navigator.get(parameter, mapping.property())?
            };
            values.push(mapping.type_handler().to_sql(&value, mapping.sql_type())?);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ParamMap;
    use crate::builder::SqlSourceBuilder;
    use crate::mapping::{MappedStatement, SqlCommandType};
    use crate::session::{Placeholder, Settings};

    #[test]
    fn test_out_parameters_keep_their_slot() {
        let settings = Settings::builder().placeholder(Placeholder::Dollar).build();
        let config = Configuration::new(settings);
        let sql = SqlSourceBuilder::new(&config)
            .parse("call p(#{a, mode=OUT}, #{b})", None)
            .unwrap();
        assert_eq!(sql.sql(), "call p($1, $2)");
        let statement = MappedStatement::builder("ns.call", sql, SqlCommandType::Update).build();

        let params: ParamMap = [("a", 1), ("b", 2)].into_iter().collect();
        let bound = statement.bound_sql(Value::Params(params));
        let values = ParameterBinder::new(&config).bind(&bound).unwrap();
        assert_eq!(values.len(), bound.parameter_mappings().len());
        assert_eq!(values, vec![Value::Null, Value::Int(2)]);
    }
}
