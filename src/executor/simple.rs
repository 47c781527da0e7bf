//! The default executor: one round trip per statement.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{BindError, BindResult};
use crate::executor::{Executor, ParameterBinder, ResultSetHandler, Transaction};
use crate::mapping::MappedStatement;
use crate::session::Configuration;
use crate::value::Value;

pub struct SimpleExecutor {
    config: Arc<Configuration>,
    transaction: Box<dyn Transaction>,
    closed: bool,
}

impl SimpleExecutor {
    pub fn new(config: Arc<Configuration>, transaction: Box<dyn Transaction>) -> Self {
        Self {
            config,
            transaction,
            closed: false,
        }
    }

    fn ensure_open(&self) -> BindResult<()> {
        if self.closed {
            return Err(BindError::Executor("Executor was closed.".to_string()));
        }
        Ok(())
    }

    fn prepare<'s>(&self, statement: &'s MappedStatement, parameter: Value) -> BindResult<(&'s str, Vec<Value>)> {
        let bound = statement.bound_sql(parameter);
        let params = ParameterBinder::new(&self.config).bind(&bound)?;
        debug!("==>  Preparing: {}", bound.sql());
        debug!("==> Parameters: {}", format_params(&params));
        Ok((bound.sql(), params))
    }
}

impl Executor for SimpleExecutor {
    fn query(&mut self, statement: &MappedStatement, parameter: Value) -> BindResult<Vec<Value>> {
        self.ensure_open()?;
        let (sql, params) = self.prepare(statement, parameter)?;
        let rows = self.transaction.query(sql, &params)?;
        debug!("<==      Total: {}", rows.len());
        ResultSetHandler::new(&self.config, statement).handle_rows(rows)
    }

    fn update(&mut self, statement: &MappedStatement, parameter: Value) -> BindResult<u64> {
        self.ensure_open()?;
        let (sql, params) = self.prepare(statement, parameter)?;
        let count = self.transaction.execute(sql, &params)?;
        debug!("<==    Updates: {}", count);
        Ok(count)
    }

    fn commit(&mut self, required: bool) -> BindResult<()> {
        self.ensure_open()?;
        if required {
            self.transaction.commit()?;
        }
        Ok(())
    }

    fn rollback(&mut self, required: bool) -> BindResult<()> {
        if self.closed {
            return Ok(());
        }
        if required {
            self.transaction.rollback()?;
        }
        Ok(())
    }

    fn close(&mut self, force_rollback: bool) {
        if self.closed {
            return;
        }
        if let Err(e) = self.rollback(force_rollback) {
            warn!("Unexpected exception on rolling back transaction: {}", e);
        }
        if let Err(e) = self.transaction.close() {
            warn!("Unexpected exception on closing transaction: {}", e);
        }
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

fn format_params(params: &[Value]) -> String {
    params
        .iter()
        .map(|value| format!("{}({})", value, value.type_label()))
        .collect::<Vec<_>>()
        .join(", ")
}
