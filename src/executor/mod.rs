//! Statement execution.
//!
//! An [`Executor`] binds a statement's parameters, hands the SQL to its
//! [`Transaction`] and materializes the returned rows. Transactions are the
//! only place that talks to a database; they receive SQL with positional
//! placeholders and the bound wire values in placeholder order.

pub mod parameter;
pub mod results;
pub mod simple;
#[cfg(feature = "sqlx")]
pub mod sqlx;

pub use parameter::ParameterBinder;
pub use results::ResultSetHandler;
pub use simple::SimpleExecutor;
#[cfg(feature = "sqlx")]
pub use self::sqlx::{SqlxTransaction, SqlxTransactionFactory};

use crate::error::BindResult;
use crate::mapping::MappedStatement;
use crate::value::{Row, Value};

/// A unit of work against one connection.
pub trait Transaction: Send {
    /// Run a query and return its rows.
    fn query(&mut self, sql: &str, params: &[Value]) -> BindResult<Vec<Row>>;

    /// Run a statement and return the affected row count.
    fn execute(&mut self, sql: &str, params: &[Value]) -> BindResult<u64>;

    fn commit(&mut self) -> BindResult<()>;

    fn rollback(&mut self) -> BindResult<()>;

    /// Release the connection. Uncommitted work is discarded.
    fn close(&mut self) -> BindResult<()>;
}

/// Opens transactions for new sessions.
pub trait TransactionFactory: Send + Sync {
    fn new_transaction(&self, autocommit: bool) -> BindResult<Box<dyn Transaction>>;
}

/// Runs mapped statements.
pub trait Executor: Send {
    fn query(&mut self, statement: &MappedStatement, parameter: Value) -> BindResult<Vec<Value>>;

    fn update(&mut self, statement: &MappedStatement, parameter: Value) -> BindResult<u64>;

    /// Commit when `required`; otherwise only flush pending work.
    fn commit(&mut self, required: bool) -> BindResult<()>;

    fn rollback(&mut self, required: bool) -> BindResult<()>;

    /// Close the executor, rolling back first when `force_rollback` is set.
    fn close(&mut self, force_rollback: bool);

    fn is_closed(&self) -> bool;
}
