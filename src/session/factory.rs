//! Opens sessions over a shared configuration.

use std::sync::Arc;

use tracing::debug;

use crate::error::BindResult;
use crate::executor::{SimpleExecutor, TransactionFactory};
use crate::session::{Configuration, Session};

pub struct SessionFactory {
    config: Arc<Configuration>,
    transactions: Arc<dyn TransactionFactory>,
}

impl SessionFactory {
    pub fn new(config: Arc<Configuration>, transactions: Arc<dyn TransactionFactory>) -> Self {
        Self { config, transactions }
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.config
    }

    /// A session that commits explicitly.
    pub fn open_session(&self) -> BindResult<Session> {
        self.open_session_with(false)
    }

    pub fn open_session_with(&self, autocommit: bool) -> BindResult<Session> {
        let transaction = self.transactions.new_transaction(autocommit)?;
        let executor = SimpleExecutor::new(Arc::clone(&self.config), transaction);
        debug!("Opened session (autocommit={})", autocommit);
        Ok(Session::new(Arc::clone(&self.config), Box::new(executor), autocommit))
    }
}
