//! Use-case layer the UI talks to.
//!
//! [`TodoStore`] validates input, delegates to one repository call and
//! broadcasts an [`UpdateMessage`] after every successful mutation.

mod groups;
mod subtodos;
mod todos;
mod validation;

#[cfg(test)]
mod store_test;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::config::{Limits, StoreConfig};
use crate::db::{Database, DbError, DbResult, SqliteDatabase};
use crate::notifier::{ChangeNotifier, UpdateMessage};

/// Handle to the todo store.
///
/// Generic over `D: Database` so tests and embedders can inject the backing
/// store; cloning shares the same database and notifier.
pub struct TodoStore<D: Database> {
    db: Arc<D>,
    limits: Limits,
    notifier: ChangeNotifier,
}

// Manual Clone impl - only the Arc needs to be cloned, not D
impl<D: Database> Clone for TodoStore<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            limits: self.limits,
            notifier: self.notifier.clone(),
        }
    }
}

impl<D: Database> TodoStore<D> {
    pub fn new(db: D, limits: Limits, notifier: ChangeNotifier) -> Self {
        Self {
            db: Arc::new(db),
            limits,
            notifier,
        }
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &D {
        &self.db
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Get a reference to the change notifier.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateMessage> {
        self.notifier.subscribe()
    }

    /// Create or migrate the schema. Safe to call on every start.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> DbResult<()> {
        self.db.initialize().await?;
        info!("Store initialized");
        Ok(())
    }

    /// Delete every group, todo and subtodo, then announce it.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> DbResult<()> {
        self.db.reset().await?;
        info!("Store cleared");
        self.notifier.notify(UpdateMessage::StoreCleared);
        Ok(())
    }
}

impl TodoStore<SqliteDatabase> {
    /// Open (creating if needed) and initialize the database at
    /// `config.db_path`.
    ///
    /// # Errors
    ///
    /// Fails when the parent directory cannot be created, the file cannot be
    /// opened or the schema cannot be brought up to date.
    #[instrument(skip(config), fields(db_path = %config.db_path.display()))]
    pub async fn open(config: &StoreConfig) -> DbResult<Self> {
        if let Some(parent) = config.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DbError::Connection {
                    message: format!(
                        "Failed to create data directory {}: {}",
                        parent.display(),
                        e
                    ),
                })?;
        }

        let db = SqliteDatabase::open(&config.db_path).await?;
        let store = Self::new(db, config.limits, ChangeNotifier::new());
        store.initialize().await?;
        Ok(store)
    }
}
