//! Local SQLite persistence for groups, todos and subtodos.
//!
//! Open a [`TodoStore`] with [`TodoStore::open`] (or inject any
//! [`db::Database`] through [`TodoStore::new`]) and call its use-case
//! methods; subscribe to [`notifier::UpdateMessage`]s to follow changes.

pub mod config;
pub mod db;
pub mod notifier;
pub mod usecases;

#[cfg(test)]
mod config_test;

pub use config::{Limits, StoreConfig};
pub use db::{DbError, DbResult};
pub use notifier::{ChangeNotifier, UpdateMessage};
pub use usecases::TodoStore;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize a tracing subscriber with an env filter.
///
/// `RUST_LOG` overrides the default `todo_store=info`. Does nothing when a
/// global subscriber is already installed.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
