//! Sessions: the entry point for executing statements.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::binding::{Mapper, MapperProxy};
use crate::error::{BindError, BindResult};
use crate::executor::Executor;
use crate::session::Configuration;
use crate::value::Value;

/// Executes statements by id over one executor.
///
/// Work done outside autocommit mode is kept until [`Session::commit`];
/// closing or dropping a session with uncommitted changes rolls them back.
pub struct Session {
    config: Arc<Configuration>,
    executor: Mutex<Box<dyn Executor>>,
    autocommit: bool,
    dirty: AtomicBool,
}

impl Session {
    pub fn new(config: Arc<Configuration>, executor: Box<dyn Executor>, autocommit: bool) -> Self {
        Self {
            config,
            executor: Mutex::new(executor),
            autocommit,
            dirty: AtomicBool::new(false),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn is_autocommit(&self) -> bool {
        self.autocommit
    }

    /// True when changes were made since the last commit or rollback.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn executor(&self) -> BindResult<MutexGuard<'_, Box<dyn Executor>>> {
        self.executor
            .lock()
            .map_err(|_| BindError::Executor("Executor lock poisoned".to_string()))
    }

    /// At most one row; `Null` when nothing matched.
    pub fn select_one(&self, statement: &str, parameter: impl Into<Value>) -> BindResult<Value> {
        let mut results = self.select_list(statement, parameter)?;
        match results.len() {
            0 => Ok(Value::Null),
            1 => Ok(results.pop().unwrap_or_default()),
            n => Err(BindError::TooManyResults(n)),
        }
    }

    pub fn select_list(&self, statement: &str, parameter: impl Into<Value>) -> BindResult<Vec<Value>> {
        let ms = self.config.mapped_statement(statement)?;
        self.executor()?.query(&ms, parameter.into())
    }

    pub fn insert(&self, statement: &str, parameter: impl Into<Value>) -> BindResult<u64> {
        self.update(statement, parameter)
    }

    pub fn update(&self, statement: &str, parameter: impl Into<Value>) -> BindResult<u64> {
        let ms = self.config.mapped_statement(statement)?;
        self.dirty.store(true, Ordering::SeqCst);
        self.executor()?.update(&ms, parameter.into())
    }

    pub fn delete(&self, statement: &str, parameter: impl Into<Value>) -> BindResult<u64> {
        self.update(statement, parameter)
    }

    /// Commit pending changes. Nothing is sent when the session is clean or
    /// in autocommit mode.
    pub fn commit(&self) -> BindResult<()> {
        self.commit_with(false)
    }

    /// Commit even if no change was recorded.
    pub fn commit_with(&self, force: bool) -> BindResult<()> {
        self.executor()?.commit(self.commit_or_rollback_required(force))?;
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    pub fn rollback(&self) -> BindResult<()> {
        self.rollback_with(false)
    }

    pub fn rollback_with(&self, force: bool) -> BindResult<()> {
        self.executor()?.rollback(self.commit_or_rollback_required(force))?;
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Close the executor; uncommitted changes are rolled back.
    pub fn close(&self) {
        let force_rollback = self.commit_or_rollback_required(false);
        match self.executor.lock() {
            Ok(mut executor) => executor.close(force_rollback),
            Err(poisoned) => poisoned.into_inner().close(force_rollback),
        }
        self.dirty.store(false, Ordering::SeqCst);
        debug!("Session closed");
    }

    /// A proxy for mapper `M`, bound to this session.
    pub fn get_mapper<M: Mapper>(&self) -> BindResult<MapperProxy<'_, M>> {
        let factory = self.config.mapper_registry().get::<M>()?;
        Ok(factory.new_instance(self))
    }

    fn commit_or_rollback_required(&self, force: bool) -> bool {
        (!self.autocommit && self.is_dirty()) || force
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
